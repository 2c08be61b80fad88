//! LLM provider implementations

mod anthropic;
mod gemini;
mod http;
pub mod mock;
mod openai_compatible;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;

use std::str::FromStr;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    OpenAi,
    OpenRouter,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

impl ProviderKind {
    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Human readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
            Self::OpenAi => "OpenAI",
            Self::OpenRouter => "OpenRouter",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind: ProviderKind = preset.provider.parse()?;
    let api_key = get_api_key(provider_config, kind)?;
    let base_url = provider_config.and_then(|c| c.base_url.as_deref());

    match kind {
        ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(
            &preset.model,
            api_key,
            base_url,
        ))),
        ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(&preset.model, api_key))),
        ProviderKind::OpenAi => Ok(Box::new(match base_url {
            Some(url) => OpenAICompatibleProvider::new(&preset.model, url, api_key, "OpenAI"),
            None => OpenAICompatibleProvider::openai(&preset.model, api_key),
        })),
        ProviderKind::OpenRouter => Ok(Box::new(OpenAICompatibleProvider::openrouter(
            &preset.model,
            api_key,
        ))),
    }
}

/// Get API key from config or environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    std::env::var(kind.env_var()).map_err(|_| LlmError::MissingApiKey {
        provider: kind.display_name().to_string(),
        env_var: kind.env_var().to_string(),
    })
}
