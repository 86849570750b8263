//! Anthropic Messages API provider.
//!
//! Structured output forces a single tool whose `input_schema` is the requested schema and
//! reads the tool input back as the answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{
    error_message, LlmError, ReasoningProvider, StructuredSchema, MAX_TOKENS,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_FAST_MODEL: &str = "claude-haiku-4-5";
pub const DEFAULT_STRUCTURED_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl MessagesResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Extracts the input of the first tool_use block.
    pub fn tool_input(&self) -> Option<&Value> {
        self.content
            .iter()
            .find(|b| b.block_type == "tool_use")
            .and_then(|b| b.input.as_ref())
    }
}

#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    fast_model: String,
    structured_model: String,
    /// Per-request HTTP timeout. Kept in step with the gateway's per-attempt timeout.
    request_timeout: Duration,
}

impl AnthropicProvider {
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
            fast_model,
            structured_model,
            request_timeout,
        }
    }

    async fn send(&self, request: &AnthropicRequest<'_>) -> Result<MessagesResponse, LlmError> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Anthropic API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        debug!(
            "Anthropic call succeeded ({}): input_tokens={}, output_tokens={}",
            request.model, parsed.usage.input_tokens, parsed.usage.output_tokens
        );
        Ok(parsed)
    }
}

#[async_trait]
impl ReasoningProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = AnthropicRequest {
            model: &self.fast_model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user,
            }],
            tools: Vec::new(),
            tool_choice: None,
        };

        let response = self.send(&request).await?;
        match response.text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(LlmError::EmptyContent),
        }
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, LlmError> {
        let request = AnthropicRequest {
            model: &self.structured_model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user,
            }],
            tools: vec![AnthropicTool {
                name: schema.name,
                description: schema.description,
                input_schema: &schema.schema,
            }],
            tool_choice: Some(ToolChoice {
                choice_type: "tool",
                name: schema.name,
            }),
        };

        let response = self.send(&request).await?;
        response.tool_input().cloned().ok_or(LlmError::EmptyContent)
    }
}
