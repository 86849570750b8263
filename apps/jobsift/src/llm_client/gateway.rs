//! Reasoning Gateway: the one retrying client every call site goes through.
//!
//! Failures never escape: a free-form question that exhausts its attempts yields `None`, a
//! structured one yields the type's fallback value.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::{LlmError, ReasoningProvider, StructuredOutput};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt. Doubles after every further failure.
    pub base_delay: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt` (1-based). Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(1u32.checked_shl(attempt - 2).unwrap_or(u32::MAX))
    }
}

/// Outcome of a structured question. Never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Structured<T> {
    Valid(T),
    Fallback(T),
}

impl<T> Structured<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Structured::Valid(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Structured::Valid(v) | Structured::Fallback(v) => v,
        }
    }
}

#[derive(Clone)]
pub struct ReasoningGateway {
    provider: Arc<dyn ReasoningProvider>,
    policy: RetryPolicy,
}

impl ReasoningGateway {
    pub fn new(provider: Arc<dyn ReasoningProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Asks a free-form question. `None` once every attempt has failed.
    pub async fn complete(&self, system: &str, user: &str) -> Option<String> {
        let provider = &self.provider;
        let result = self
            .with_retries("completion", move || provider.complete(system, user))
            .await;

        match result {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Free-form question abandoned: {e}");
                None
            }
        }
    }

    /// Asks for a value of type `T`. Transport failures are retried; a response that arrives
    /// but does not match the schema resolves to the fallback straight away.
    pub async fn structured<T: StructuredOutput>(&self, system: &str, user: &str) -> Structured<T> {
        let schema = T::schema();
        let provider = &self.provider;
        let schema_ref = &schema;
        let result = self
            .with_retries(schema.name, move || {
                provider.complete_structured(system, user, schema_ref)
            })
            .await;

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                warn!("Structured question '{}' abandoned: {e}", schema.name);
                return Structured::Fallback(T::fallback());
            }
        };

        match serde_json::from_value::<T>(value) {
            Ok(parsed) => Structured::Valid(parsed),
            Err(e) => {
                warn!(
                    "Structured response for '{}' failed schema validation: {e}",
                    schema.name
                );
                Structured::Fallback(T::fallback())
            }
        }
    }

    async fn with_retries<F, Fut, V>(&self, label: &str, mut call: F) -> Result<V, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, LlmError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = match tokio::time::timeout(self.policy.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout {
                    secs: self.policy.call_timeout.as_secs(),
                }),
            };

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        info!("LLM {label} succeeded after {attempt} attempts");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let delay = self.policy.delay_before(attempt);
                    warn!(
                        "LLM {} attempt {} failed ({}), retrying after {}ms...",
                        label,
                        attempt - 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
