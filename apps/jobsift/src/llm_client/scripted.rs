//! Scripted reasoning provider for tests. Replies are queued up front; every call is counted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{LlmError, ReasoningProvider, StructuredSchema};

struct KeyedReply {
    needle: String,
    delay: Duration,
    reply: Value,
}

#[derive(Default)]
pub struct ScriptedProvider {
    texts: Mutex<VecDeque<Result<String, LlmError>>>,
    structured: Mutex<VecDeque<Result<Value, LlmError>>>,
    keyed: Mutex<Vec<KeyedReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_text(&self, reply: Result<String, LlmError>) {
        self.texts.lock().unwrap().push_back(reply);
    }

    pub fn push_structured(&self, reply: Result<Value, LlmError>) {
        self.structured.lock().unwrap().push_back(reply);
    }

    /// Structured reply used whenever the user prompt contains `needle`. Checked before the
    /// queue and never consumed.
    pub fn answer_when(&self, needle: &str, delay: Duration, reply: Value) {
        self.keyed.lock().unwrap().push(KeyedReply {
            needle: needle.to_string(),
            delay,
            reply,
        });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, user: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _system: &str, user: &str) -> Result<String, LlmError> {
        self.record(user);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.texts.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyContent))
    }

    async fn complete_structured(
        &self,
        _system: &str,
        user: &str,
        _schema: &StructuredSchema,
    ) -> Result<Value, LlmError> {
        self.record(user);

        let keyed = self
            .keyed
            .lock()
            .unwrap()
            .iter()
            .find(|k| user.contains(&k.needle))
            .map(|k| (k.delay, k.reply.clone()));
        if let Some((delay, reply)) = keyed {
            tokio::time::sleep(delay).await;
            return Ok(reply);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.structured.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyContent))
    }
}
