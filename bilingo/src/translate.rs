//! Turn segmented source text into a `BilingualText` with an LLM.

use std::sync::Arc;

use llm_client::{Config, LlmProvider, LlmRequest, get_provider};
use log::{debug, info};

use crate::bilingual::BilingualText;
use crate::error::{Error, Result};
use crate::text::Segmenter;

const SYSTEM_PROMPT: &str = include_str!("../prompts/make_text_bilingual.md");

/// Name under which bilingo's default preset is looked up in the LLM config.
pub const PROGRAM_NAME: &str = "bilingo";

pub struct Translator {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Translator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// Build a translator from the LLM configuration, using `preset_name` or
    /// the configured default for bilingo.
    pub fn from_config(config: &Config, preset_name: Option<&str>) -> Result<Self> {
        let preset_name =
            preset_name.unwrap_or_else(|| config.get_default_for_program(PROGRAM_NAME));
        let preset = config.get_preset(preset_name)?;
        let provider = get_provider(preset, config.get_provider_config(&preset.provider))?;
        debug!(
            "Using LLM provider {} (model: {}) from preset '{}'",
            provider.name(),
            provider.model(),
            preset_name
        );

        let translator = Self::new(Arc::from(provider));
        Ok(match preset.temperature {
            Some(t) => translator.with_temperature(t),
            None => translator,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Translate `chunks` (as produced by the segmenter) into
    /// `target_language`. A failed call or an unparsable answer is an
    /// error; nothing is retried.
    pub async fn translate(&self, chunks: &[String], target_language: &str) -> Result<BilingualText> {
        let target_language = target_language.trim();
        if target_language.is_empty() {
            return Err(Error::InvalidInput("target language is empty".into()));
        }
        let source_text = chunks
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if source_text.is_empty() {
            return Err(Error::InvalidInput("nothing to translate".into()));
        }

        let mut request = LlmRequest::new(source_text)
            .with_system_prompt(system_prompt(target_language))
            .with_temperature(self.temperature)
            .with_json_output();
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        debug!(
            "Sending {} chunks to {} ({})",
            chunks.len(),
            self.provider.name(),
            self.provider.model()
        );
        let response = self.provider.complete(request).await?;
        if let Some(usage) = response.usage {
            info!(
                "{} tokens: {} in, {} out",
                response.model, usage.input_tokens, usage.output_tokens
            );
        }

        let mut text: BilingualText = serde_json::from_str(extract_json(&response.content))
            .map_err(|e| Error::MalformedModelOutput(e.to_string()))?;
        if text.target_language.trim().is_empty() {
            text.target_language = target_language.to_string();
        }
        text.validate()
            .map_err(|e| Error::MalformedModelOutput(e.to_string()))?;
        Ok(text)
    }

    /// Segment `text` and translate the resulting chunks.
    pub async fn translate_text(
        &self,
        segmenter: &Segmenter,
        text: &str,
        target_language: &str,
    ) -> Result<BilingualText> {
        let chunks = segmenter.segment(text)?;
        debug!(
            "Segmented {} chars into {} chunks (max {})",
            text.chars().count(),
            chunks.len(),
            segmenter.max_length()
        );
        self.translate(&chunks, target_language).await
    }
}

pub fn system_prompt(target_language: &str) -> String {
    SYSTEM_PROMPT.replace("{target_language}", target_language)
}

/// The JSON document inside a model answer, without surrounding code
/// fences or chatter.
fn extract_json(answer: &str) -> &str {
    let mut body = answer.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.trim_start();
        if let Some(end) = body.rfind("```") {
            body = &body[..end];
        }
        body = body.trim();
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}
