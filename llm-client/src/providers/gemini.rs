//! Google Gemini provider
//!
//! Direct HTTP implementation of the `generateContent` endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::send_json;
use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider for the Gemini API
pub struct GeminiProvider {
    model: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider, optionally against a custom base URL
    pub fn new(model: &str, api_key: String, base_url: Option<&str>) -> Self {
        Self {
            model: model.to_string(),
            api_key,
            base_url: base_url
                .unwrap_or(GEMINI_API_URL)
                .trim_end_matches('/')
                .to_string(),
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn build_request(request: &LlmRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: request.system_prompt.as_ref().map(|system| Content {
            role: None,
            parts: vec![Part {
                text: system.clone(),
            }],
        }),
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            response_mime_type: request.json_output.then_some("application/json"),
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or(LlmError::EmptyResponse { reason: None })?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .map(|p| p.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse {
            reason: candidate.finish_reason.clone(),
        });
    }
    Ok(text)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_request = build_request(&request);
        debug!("Gemini request to model {}", self.model);

        let api_response: GenerateContentResponse = send_json(
            self.client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&api_request),
        )
        .await?;

        let content = extract_text(&api_response)?;
        let usage = api_response.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
