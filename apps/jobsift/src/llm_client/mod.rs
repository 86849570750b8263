//! LLM Client: the single point of entry for all reasoning-service calls in jobsift.
//!
//! ARCHITECTURAL RULE: callers never talk to a provider directly. Every question goes through
//! [`gateway::ReasoningGateway`], which owns retries, backoff and timeouts. Providers make
//! exactly one HTTP request per call.
//!
//! Two model slots per provider: a fast model for free-form questions and a structured model
//! for schema-constrained assessments.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;

pub mod anthropic;
pub mod gateway;
pub mod openrouter;
pub mod prompts;
#[cfg(test)]
pub mod scripted;

pub use gateway::{ReasoningGateway, RetryPolicy, Structured};

pub(crate) const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Failures worth another attempt. A response that arrived but could not be parsed is a
    /// completed call and is not retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Parse(_))
    }
}

/// JSON schema handed to the provider for structured output.
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

/// A type the reasoning service can be asked to produce directly.
///
/// Deserialisation must be strict: every required field present with its declared type.
/// Anything else resolves to [`StructuredOutput::fallback`].
pub trait StructuredOutput: DeserializeOwned + Send {
    fn schema() -> StructuredSchema;

    fn fallback() -> Self;
}

/// A reasoning backend. One call, one request, no retries.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Free-form text completion on the fast model.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Schema-constrained completion on the structured model. Returns the raw JSON object.
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, LlmError>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

/// Pulls the provider's error message out of a JSON error body, falling back to the raw body.
pub(crate) fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Parses model text as JSON, tolerating Markdown code fences.
pub(crate) fn parse_json_text(text: &str) -> Result<Value, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
