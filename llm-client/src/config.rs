use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{LlmError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset used when neither the caller nor a program default names one
    #[serde(default = "default_preset")]
    pub default_preset: String,

    /// Per-program default presets (program name -> preset name)
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Named model presets for quick access
    #[serde(default)]
    pub presets: HashMap<String, ModelPreset>,

    /// Provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_preset() -> String {
    "gemini".to_string()
}

/// A named model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (gemini, anthropic, openai, openrouter)
    pub provider: String,

    /// Model name/identifier for the provider
    pub model: String,

    /// Sampling temperature; translation wants deterministic output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL (for API providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path: ~/.config/bilingo/llm.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LlmError::ConfigError("home directory not found".into()))?;
        Ok(home.join(".config").join("bilingo").join("llm.toml"))
    }

    /// Get a preset by name
    pub fn get_preset(&self, name: &str) -> Result<&ModelPreset> {
        self.presets
            .get(name)
            .ok_or_else(|| LlmError::InvalidPreset(name.to_string()))
    }

    /// Get the default preset name for a specific program
    ///
    /// Falls back to `default_preset` if no program-specific default is set.
    pub fn get_default_for_program(&self, program: &str) -> &str {
        self.defaults
            .get(program)
            .map(String::as_str)
            .unwrap_or(&self.default_preset)
    }

    /// Get provider config by provider name
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut presets = HashMap::new();

        presets.insert(
            "gemini".to_string(),
            ModelPreset {
                provider: "gemini".to_string(),
                model: "gemini-2.0-flash".to_string(),
                temperature: Some(0.0),
            },
        );
        presets.insert(
            "anthropic-sonnet".to_string(),
            ModelPreset {
                provider: "anthropic".to_string(),
                model: "claude-sonnet-4-5".to_string(),
                temperature: Some(0.0),
            },
        );

        Self {
            default_preset: default_preset(),
            defaults: HashMap::new(),
            presets,
            providers: HashMap::new(),
        }
    }
}
