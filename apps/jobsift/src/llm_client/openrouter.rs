//! OpenRouter provider (OpenAI-compatible chat completions).
//!
//! Structured output uses `response_format: json_schema` with `strict: true`; the answer comes
//! back as JSON text in the message content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::llm_client::{
    error_message, parse_json_text, LlmError, ReasoningProvider, StructuredSchema, MAX_TOKENS,
};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_FAST_MODEL: &str = "openai/gpt-4.1-nano";
pub const DEFAULT_STRUCTURED_MODEL: &str = "openai/gpt-5-mini";
const REFERER: &str = "http://localhost";
const APP_TITLE: &str = "jobsift";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

fn response_format(schema: &StructuredSchema) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": schema.name,
            "strict": true,
            "schema": schema.schema,
        }
    })
}

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    fast_model: String,
    structured_model: String,
    /// Per-request HTTP timeout. Kept in step with the gateway's per-attempt timeout.
    request_timeout: Duration,
}

impl OpenRouterProvider {
    pub fn new(
        api_key: String,
        fast_model: String,
        structured_model: String,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: OPENROUTER_BASE_URL.to_string(),
            fast_model,
            structured_model,
            request_timeout,
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OpenRouter API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "OpenRouter call succeeded ({}): prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        match parsed.text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::EmptyContent),
        }
    }
}

#[async_trait]
impl ReasoningProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.fast_model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: None,
        };
        self.send(&request).await
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, LlmError> {
        let request = ChatRequest {
            model: &self.structured_model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: Some(response_format(schema)),
        };
        let text = self.send(&request).await?;
        parse_json_text(&text)
    }
}
