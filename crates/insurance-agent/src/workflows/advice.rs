//! Quote narration through a two-step text-generation chain.
//!
//! The generator is an injected collaborator; the advisor only owns the
//! prompts and the order in which they run.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::premium::validator::{parse_age, parse_coverage, text_of, ValidationError};
use crate::config::LlmConfig;

/// Opaque text generation: one prompt in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, AdviceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("text generation is not configured (set LLM_API_KEY)")]
    Unconfigured,
    #[error("text generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text generation returned no content")]
    EmptyCompletion,
}

/// Raw advice form; only the fields the prompts need.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdviceForm {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub vehicle_type: Option<Value>,
    #[serde(default)]
    pub coverage_amount: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub age: u8,
    pub vehicle_type: String,
    pub coverage_amount: f64,
}

impl AdviceRequest {
    pub fn from_form(form: &AdviceForm) -> Result<Self, ValidationError> {
        let age = parse_age(form.age.as_ref().filter(|value| !value.is_null()))?;
        let coverage_amount =
            parse_coverage(form.coverage_amount.as_ref().filter(|value| !value.is_null()))?;
        let vehicle_type = form
            .vehicle_type
            .as_ref()
            .filter(|value| !value.is_null())
            .map(|value| text_of(value).trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::Missing {
                field: "vehicle_type",
            })?;

        Ok(Self {
            age,
            vehicle_type,
            coverage_amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteAdvice {
    pub quote: String,
    pub advice: String,
}

pub fn quote_prompt(request: &AdviceRequest) -> String {
    format!(
        "Estimate a premium based on the following: Age={}, Vehicle={}, Coverage={}. Include reasoning for risk factors.",
        request.age, request.vehicle_type, request.coverage_amount
    )
}

pub fn advice_prompt(quote: &str) -> String {
    format!(
        "You got a quote of ${quote}. Is this reasonable for the user? Explain and suggest whether they should reduce or increase coverage."
    )
}

pub struct QuoteAdvisor {
    generator: Arc<dyn TextGenerator>,
}

impl QuoteAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Runs the quote prompt, then feeds its answer into the advice prompt.
    pub async fn advise(&self, request: &AdviceRequest) -> Result<QuoteAdvice, AdviceError> {
        let quote = self.generator.generate_text(&quote_prompt(request)).await?;
        let quote = quote.trim().to_string();
        debug!(chars = quote.len(), "quote narration generated");

        let advice = self.generator.generate_text(&advice_prompt(&quote)).await?;

        Ok(QuoteAdvice {
            quote,
            advice: advice.trim().to_string(),
        })
    }
}

/// Generator used when no credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String, AdviceError> {
        Err(AdviceError::Unconfigured)
    }
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionGenerator {
    pub fn from_config(config: &LlmConfig) -> Result<Self, AdviceError> {
        let api_key = config.api_key.clone().ok_or(AdviceError::Unconfigured)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatCompletionGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, AdviceError> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response: ChatCompletionResponse = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AdviceError::EmptyCompletion)
    }
}
