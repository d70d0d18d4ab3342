//! Bounded record of what was asked and answered during a session.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub service: String,
    pub query: String,
    pub response: Value,
    pub recorded_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(service: &str, query: impl Into<String>, response: Value) -> Self {
        Self {
            service: service.to_string(),
            query: query.into(),
            response,
            recorded_at: Utc::now(),
        }
    }
}

/// Storage abstraction for the interaction history.
pub trait InteractionLog: Send + Sync {
    fn record(&self, interaction: Interaction);
    /// Entries newest first.
    fn entries(&self) -> Vec<Interaction>;
}

pub const DEFAULT_HISTORY_LIMIT: usize = 1_000;

/// Bounded in-process history; once `limit` entries are held the oldest is
/// evicted on every new record.
#[derive(Debug)]
pub struct InMemoryInteractionLog {
    limit: usize,
    entries: Mutex<VecDeque<Interaction>>,
}

impl InMemoryInteractionLog {
    /// A `limit` of zero is treated as one.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for InMemoryInteractionLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl InteractionLog for InMemoryInteractionLog {
    fn record(&self, interaction: Interaction) {
        // A poisoned log only loses history; keep serving.
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while guard.len() >= self.limit {
            guard.pop_front();
        }
        guard.push_back(interaction);
    }

    fn entries(&self) -> Vec<Interaction> {
        let guard = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.iter().rev().cloned().collect()
    }
}
