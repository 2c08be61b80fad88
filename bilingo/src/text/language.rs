//! Language identification for paragraphs that need sentence repartitioning.

use std::str::FromStr;
use std::sync::OnceLock;

use lingua::{IsoCode639_1, Language, LanguageDetectorBuilder};

use crate::error::{Error, Result};

/// Number of characters quoted back in detection errors.
const EXCERPT_CHARS: usize = 40;

/// Identifies the language a paragraph is written in.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<Language>;
}

/// Shared detector over every language lingua ships.
///
/// Language models are loaded on first use of each language and kept for the
/// life of the process.
static LINGUA: OnceLock<lingua::LanguageDetector> = OnceLock::new();

fn lingua() -> &'static lingua::LanguageDetector {
    LINGUA.get_or_init(|| LanguageDetectorBuilder::from_all_languages().build())
}

/// Statistical detection backed by lingua.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinguaDetector;

impl LanguageDetector for LinguaDetector {
    fn detect(&self, text: &str) -> Result<Language> {
        lingua()
            .detect_language_of(text)
            .ok_or_else(|| Error::LanguageUndetected {
                excerpt: excerpt(text),
            })
    }
}

/// Parse a language tag such as `tr`, `en-US` or `pt_BR` by its primary subtag.
pub fn parse_language_tag(tag: &str) -> Result<Language> {
    let primary = tag
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    IsoCode639_1::from_str(&primary)
        .map(|iso| Language::from_iso_code_639_1(&iso))
        .map_err(|_| Error::UnsupportedLanguage(tag.to_string()))
}

/// Two-letter ISO 639-1 code of a language.
pub fn language_code(language: Language) -> String {
    language.iso_code_639_1().to_string()
}

fn excerpt(text: &str) -> String {
    text.trim().chars().take(EXCERPT_CHARS).collect()
}
