//! OpenAI client implementation
//!
//! Structured output via the chat completions endpoint with a strict
//! JSON-schema response format

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{AiClient, OutputShape};
use crate::models::NeutralPrompt;
use crate::resolver::ProviderServiceConfig;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// OpenAI provider client
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client from a resolved service configuration
    pub fn new(config: &ProviderServiceConfig) -> Result<Self> {
        Self::with_base_url(config, OPENAI_BASE_URL)
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

    fn build_request(&self, shape: &OutputShape, prompt: &NeutralPrompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: shape.name,
                    schema: shape.schema.clone(),
                    strict: true,
                },
            },
        }
    }

    /// Pull the structured payload out of the first choice, if any
    fn extract_payload(&self, response: ChatCompletionResponse) -> Option<Value> {
        let Some(first_choice) = response.choices.into_iter().next() else {
            warn!("No choices in completion");
            return None;
        };

        let Some(content) = first_choice.message.content else {
            warn!("No message content in first choice");
            return None;
        };

        match serde_json::from_str(&content) {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!("OpenAI message content is not valid JSON: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    fn provider_key(&self) -> &'static str {
        "openAI"
    }

    async fn invoke_raw(
        &self,
        shape: &OutputShape,
        prompt: &NeutralPrompt,
        _retry: bool,
    ) -> Option<Value> {
        debug!("Sending OpenAI structured completion request");

        let url = format!("{}/chat/completions", self.base_url);
        let request = self.build_request(shape, prompt);

        let response = match self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("OpenAI request failed to send: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API request failed: {} - {}", status, error_text);
            return None;
        }

        let completion: ChatCompletionResponse = match response.json().await {
            Ok(completion) => completion,
            Err(e) => {
                error!("Failed to parse OpenAI response: {}", e);
                return None;
            }
        };

        let payload = self.extract_payload(completion);
        if payload.is_none() {
            error!("OpenAI call was successful but no results were obtained");
        }
        payload
    }
}

// ====== Chat Completions API structures ======

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
