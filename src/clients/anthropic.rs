//! Anthropic client implementation
//!
//! Structured output via the messages endpoint with a forced tool call; the
//! requested shape becomes the tool's input schema and the payload is the
//! first tool_use block's input

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{AiClient, OutputShape};
use crate::models::NeutralPrompt;
use crate::resolver::ProviderServiceConfig;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 1024;

/// Anthropic provider client
pub struct AnthropicClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    api_key: String,
}

impl AnthropicClient {
    /// Create a client from a resolved service configuration
    pub fn new(config: &ProviderServiceConfig) -> Result<Self> {
        Self::with_base_url(config, ANTHROPIC_BASE_URL)
    }

    /// Create a client pointed at a non-default base URL
    pub fn with_base_url(config: &ProviderServiceConfig, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("aimgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }

    fn build_request(&self, shape: &OutputShape, prompt: &NeutralPrompt) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            system: prompt.system.clone(),
            messages: vec![UserMessage {
                role: "user",
                content: prompt.user.clone(),
            }],
            tools: vec![ToolDefinition {
                name: shape.name,
                description: shape.description,
                input_schema: shape.schema.clone(),
            }],
            tool_choice: json!({"type": "tool", "name": shape.name}),
        }
    }

    /// Pull the first tool_use block's input out of the response
    fn extract_payload(&self, response: MessagesResponse) -> Option<Value> {
        response.content.into_iter().find_map(|block| match block {
            ContentBlock::ToolUse { input, .. } => Some(input),
            _ => None,
        })
    }
}

#[async_trait]
impl AiClient for AnthropicClient {
    fn provider_key(&self) -> &'static str {
        "anthropic"
    }

    async fn invoke_raw(
        &self,
        shape: &OutputShape,
        prompt: &NeutralPrompt,
        _retry: bool,
    ) -> Option<Value> {
        debug!("Sending Anthropic tool-use request");

        let url = format!("{}/v1/messages", self.base_url);
        let request = self.build_request(shape, prompt);

        let response = match self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Anthropic request failed to send: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Anthropic API request failed: {} - {}", status, error_text);
            return None;
        }

        let messages: MessagesResponse = match response.json().await {
            Ok(messages) => messages,
            Err(e) => {
                error!("Failed to parse Anthropic response: {}", e);
                return None;
            }
        };

        let payload = self.extract_payload(messages);
        if payload.is_none() {
            error!("No valid tool_use content in the Anthropic response");
        }
        payload
    }
}

// ====== Messages API structures ======

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    system: String,
    messages: Vec<UserMessage>,
    tools: Vec<ToolDefinition>,
    tool_choice: Value,
}

#[derive(Debug, Serialize)]
struct UserMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse {
        #[allow(dead_code)]
        name: String,
        input: Value,
    },
    Text {
        #[allow(dead_code)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AnthropicClient {
        let config = ProviderServiceConfig {
            provider: "anthropic".to_string(),
            model: "claude-3-5-sonnet-20240620".to_string(),
            temperature: Some(0.7),
            api_key: "sk-ant-test".to_string(),
        };
        AnthropicClient::new(&config).unwrap()
    }

    fn test_shape() -> OutputShape {
        OutputShape {
            name: "record_creatives",
            description: "Record generated creatives",
            schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_provider_key() {
        assert_eq!(test_client().provider_key(), "anthropic");
    }

    #[test]
    fn test_request_declares_forced_tool() {
        let client = test_client();
        let prompt = NeutralPrompt {
            system: "You are a copywriter".to_string(),
            user: "Write an ad".to_string(),
        };

        let request = client.build_request(&test_shape(), &prompt);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["max_tokens"], 1024);
        assert_eq!(value["system"], "You are a copywriter");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["tools"][0]["name"], "record_creatives");
        assert_eq!(value["tool_choice"]["type"], "tool");
        assert_eq!(value["tool_choice"]["name"], "record_creatives");
    }

    #[test]
    fn test_extract_payload_finds_tool_use() {
        let client = test_client();
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "Here are your creatives."},
                {"type": "tool_use", "id": "toolu_1", "name": "record_creatives",
                 "input": {"creatives": []}}
            ]
        }))
        .unwrap();

        let payload = client.extract_payload(response).unwrap();
        assert_eq!(payload, json!({"creatives": []}));
    }

    #[test]
    fn test_extract_payload_without_tool_use() {
        let client = test_client();
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "Sorry, I cannot do that."}]
        }))
        .unwrap();

        assert!(client.extract_payload(response).is_none());
    }
}
