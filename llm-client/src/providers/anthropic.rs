//! Anthropic API provider
//!
//! Direct HTTP implementation for the Anthropic Messages API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::send_json;
use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Bilingual documents for long inputs are large; the API requires a cap.
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Provider for direct Anthropic API calls
pub struct AnthropicProvider {
    model: String,
    api_key: String,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(model: &str, api_key: String) -> Self {
        Self {
            model: model.to_string(),
            api_key,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: ResponseUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// JSON answers are forced by prefilling the assistant turn with `{`.
const JSON_PREFILL: &str = "{";

fn build_request(model: &str, request: &LlmRequest) -> MessagesRequest {
    let mut messages = vec![Message {
        role: "user",
        content: request.prompt.clone(),
    }];
    if request.json_output {
        messages.push(Message {
            role: "assistant",
            content: JSON_PREFILL.to_string(),
        });
    }

    MessagesRequest {
        model: model.to_string(),
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: request.system_prompt.clone(),
        temperature: request.temperature,
        messages,
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_request = build_request(&self.model, &request);
        debug!("Anthropic request to model {}", self.model);

        let api_response: MessagesResponse = send_json(
            self.client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&api_request),
        )
        .await?;

        let text: String = api_response
            .content
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                reason: api_response.stop_reason,
            });
        }

        let content = if request.json_output {
            format!("{}{}", JSON_PREFILL, text)
        } else {
            text
        };

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage: Some(TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            }),
        })
    }

    fn name(&self) -> &'static str {
        "Anthropic API"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_prefills_assistant_turn() {
        let request = LlmRequest::new("text").with_json_output();
        let body = serde_json::to_value(build_request("claude", &request)).unwrap();

        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"], "{");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_plain_request() {
        let request = LlmRequest::new("text")
            .with_system_prompt("be brief")
            .with_temperature(0.0);
        let body = serde_json::to_value(build_request("claude", &request)).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["temperature"], 0.0);
    }
}
