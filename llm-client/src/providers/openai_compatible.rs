//! OpenAI-compatible API provider
//!
//! Used for providers that implement the OpenAI chat completions API:
//! - OpenAI
//! - OpenRouter

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::send_json;
use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

/// Provider for OpenAI-compatible APIs
pub struct OpenAICompatibleProvider {
    model: String,
    base_url: String,
    api_key: String,
    name: &'static str,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Create a new OpenAI-compatible provider
    pub fn new(model: &str, base_url: &str, api_key: String, name: &'static str) -> Self {
        Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            name,
            client: Client::new(),
        }
    }

    /// Create an OpenAI provider
    pub fn openai(model: &str, api_key: String) -> Self {
        Self::new(model, "https://api.openai.com/v1", api_key, "OpenAI")
    }

    /// Create an OpenRouter provider
    pub fn openrouter(model: &str, api_key: String) -> Self {
        Self::new(model, "https://openrouter.ai/api/v1", api_key, "OpenRouter")
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn build_request(model: &str, request: &LlmRequest) -> ChatCompletionRequest {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(Message {
            role: "system",
            content: system.clone(),
        });
    }

    messages.push(Message {
        role: "user",
        content: request.prompt.clone(),
    });

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: request.json_output.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

#[async_trait]
impl LlmProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let chat_request = build_request(&self.model, &request);
        let url = format!("{}/chat/completions", self.base_url);
        debug!("{} request to model {}", self.name, self.model);

        let chat_response: ChatCompletionResponse = send_json(
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&chat_request),
        )
        .await?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse { reason: None })?;
        let content = match choice.message.content {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(LlmError::EmptyResponse {
                    reason: choice.finish_reason,
                });
            }
        };

        let usage = chat_response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = OpenAICompatibleProvider::new("m", "http://localhost:1234/v1/", "k".into(), "Local");
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
        assert_eq!(provider.name(), "Local");
    }

    #[test]
    fn test_json_mode_request() {
        let request = LlmRequest::new("hello")
            .with_system_prompt("sys")
            .with_json_output();
        let body = serde_json::to_value(build_request("gpt-4o-mini", &request)).unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("temperature").is_none());
    }
}
