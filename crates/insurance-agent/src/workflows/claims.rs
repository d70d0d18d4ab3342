//! Static claims status table.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

const BUILT_IN_CLAIMS: &str = include_str!("../../data/claims.csv");

/// Status row for a single claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub status: String,
    pub resolution: String,
}

/// Key-value lookup over claim records.
pub trait ClaimsStore: Send + Sync {
    fn fetch(&self, claim_id: &str) -> Option<ClaimRecord>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimsTableError {
    #[error("unable to open claims table {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed claims table: {0}")]
    Csv(#[from] csv::Error),
    #[error("claims table row {row} has an empty claim id")]
    EmptyClaimId { row: usize },
}

/// In-memory table loaded from a `claim_id,status,resolution` CSV.
#[derive(Debug, Clone, Default)]
pub struct ClaimsTable {
    records: HashMap<String, ClaimRecord>,
}

impl ClaimsTable {
    /// The demo records shipped with the crate.
    pub fn built_in() -> Result<Self, ClaimsTableError> {
        Self::from_reader(BUILT_IN_CLAIMS.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClaimsTableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ClaimsTableError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ClaimsTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = HashMap::new();

        for (index, row) in csv_reader.deserialize::<ClaimRecord>().enumerate() {
            let record = row?;
            if record.claim_id.is_empty() {
                return Err(ClaimsTableError::EmptyClaimId { row: index + 1 });
            }
            records.insert(record.claim_id.clone(), record);
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ClaimsStore for ClaimsTable {
    fn fetch(&self, claim_id: &str) -> Option<ClaimRecord> {
        self.records.get(claim_id).cloned()
    }
}

/// Lookup result; a miss is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimLookup {
    Found {
        claim_id: String,
        status: String,
        resolution: String,
        message: String,
    },
    NotFound {
        claim_id: String,
        message: String,
    },
}

impl ClaimLookup {
    pub fn message(&self) -> &str {
        match self {
            ClaimLookup::Found { message, .. } | ClaimLookup::NotFound { message, .. } => message,
        }
    }
}

pub fn lookup_claim<S: ClaimsStore + ?Sized>(store: &S, claim_id: &str) -> ClaimLookup {
    let claim_id = claim_id.trim();
    match store.fetch(claim_id) {
        Some(record) => ClaimLookup::Found {
            message: format!(
                "Claim ID {}:\nStatus: {}\nResolution Info: {}",
                record.claim_id, record.status, record.resolution
            ),
            claim_id: record.claim_id,
            status: record.status,
            resolution: record.resolution,
        },
        None => ClaimLookup::NotFound {
            message: format!(
                "Claim ID {claim_id} not found. Please check your ID or contact support."
            ),
            claim_id: claim_id.to_string(),
        },
    }
}
