//! bilingo configuration management.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ssml::VoiceCatalog;
use crate::text::SplitterKind;
use crate::tts::AudioEncoding;

/// Environment variable that overrides `speech_key`.
pub const SPEECH_KEY_ENV: &str = "SPEECH_KEY";

const DEFAULT_MAX_PARAGRAPH_LENGTH: usize = 1000;
const DEFAULT_MAX_VOICE_TURNS: usize = 45;
const DEFAULT_BREAK_TIME_MS: u32 = 750;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilingoConfig {
    /// Paragraphs longer than this (in chars) are repartitioned along
    /// sentence boundaries. 0 disables repartitioning.
    #[serde(default = "default_max_paragraph_length")]
    pub max_paragraph_length: usize,

    /// Voice turns per synthesis request
    #[serde(default = "default_max_voice_turns")]
    pub max_voice_turns: usize,

    /// Pause after each spoken syntagma
    #[serde(default = "default_break_time_ms")]
    pub break_time_ms: u32,

    #[serde(default)]
    pub audio_encoding: AudioEncoding,

    /// Azure speech region
    #[serde(default = "default_speech_region")]
    pub speech_region: String,

    /// Azure speech key. `SPEECH_KEY` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_key: Option<String>,

    /// LLM preset for translation. None means the llm.toml default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_preset: Option<String>,

    #[serde(default)]
    pub sentence_splitter: SplitterKind,

    /// Per-locale voice overrides, merged over the built-in catalog
    #[serde(default = "VoiceCatalog::empty", skip_serializing_if = "VoiceCatalog::is_empty")]
    pub voices: VoiceCatalog,
}

fn default_max_paragraph_length() -> usize {
    DEFAULT_MAX_PARAGRAPH_LENGTH
}

fn default_max_voice_turns() -> usize {
    DEFAULT_MAX_VOICE_TURNS
}

fn default_break_time_ms() -> u32 {
    DEFAULT_BREAK_TIME_MS
}

fn default_speech_region() -> String {
    "westeurope".to_string()
}

impl Default for BilingoConfig {
    fn default() -> Self {
        Self {
            max_paragraph_length: default_max_paragraph_length(),
            max_voice_turns: default_max_voice_turns(),
            break_time_ms: default_break_time_ms(),
            audio_encoding: AudioEncoding::default(),
            speech_region: default_speech_region(),
            speech_key: None,
            llm_preset: None,
            sentence_splitter: SplitterKind::default(),
            voices: VoiceCatalog::empty(),
        }
    }
}

impl BilingoConfig {
    /// Get the config file path: ~/.config/bilingo/bilingo.toml
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| Error::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("bilingo").join("bilingo.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: BilingoConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_voice_turns == 0 {
            return Err(Error::Config("max_voice_turns must be at least 1".into()));
        }
        if self.speech_region.trim().is_empty() {
            return Err(Error::Config("speech_region is empty".into()));
        }
        Ok(())
    }

    /// Speech key from the environment, else from the config file.
    pub fn speech_key(&self) -> Option<String> {
        std::env::var(SPEECH_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.speech_key.clone())
    }

    /// Built-in voices with this config's overrides applied.
    pub fn voice_catalog(&self) -> VoiceCatalog {
        let mut catalog = VoiceCatalog::default();
        catalog.merge(&self.voices);
        catalog
    }
}
