//! LLM client library for the bilingo workspace
//!
//! Provides a unified interface for the providers bilingo can translate with:
//! - Gemini (default)
//! - Anthropic API
//! - OpenAI and OpenRouter (chat completions)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, ProviderKind, get_provider};
