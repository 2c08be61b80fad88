//! Bilingual documents: source sentences paired with their translations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// A minimal memorisable unit of text and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Syntagma {
    /// Text in the original language
    pub source_text: String,
    /// Translation into the target language
    #[serde(default)]
    pub target_text: Option<String>,
}

impl Syntagma {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_text: Some(target_text.into()),
        }
    }
}

/// One paragraph of the source text, as an ordered list of syntagmas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BilingualParagraph {
    #[serde(rename = "Sintagmas", alias = "syntagmas")]
    pub syntagmas: Vec<Syntagma>,
}

/// A translated document ready for rendering or speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BilingualText {
    pub paragraphs: Vec<BilingualParagraph>,
    /// Language tag of the source text, e.g. `tr` or `tr-TR`
    pub source_language: String,
    /// Language tag of the translation
    pub target_language: String,
    /// Questions about the text, asked in the target language
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comprehension_questions: Vec<String>,
}

impl BilingualText {
    /// Parse from JSON and check the document is usable.
    pub fn from_json(json: &str) -> Result<Self> {
        let text: BilingualText = serde_json::from_str(json)?;
        text.validate()?;
        Ok(text)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of syntagmas across all paragraphs.
    pub fn syntagma_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.syntagmas.len()).sum()
    }

    /// Reject documents with nothing to say or without language tags.
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(Error::InvalidInput("source_language is empty".into()));
        }
        if self.target_language.trim().is_empty() {
            return Err(Error::InvalidInput("target_language is empty".into()));
        }
        if self.syntagma_count() == 0 {
            return Err(Error::InvalidInput("bilingual text has no syntagmas".into()));
        }
        if let Some(pos) = self
            .paragraphs
            .iter()
            .flat_map(|p| &p.syntagmas)
            .position(|s| s.source_text.trim().is_empty())
        {
            return Err(Error::InvalidInput(format!(
                "syntagma {} has empty source text",
                pos + 1
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BilingualText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BilingualText({} -> {}, {} paragraphs, {} syntagmas)",
            self.source_language,
            self.target_language,
            self.paragraphs.len(),
            self.syntagma_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BilingualText {
        BilingualText {
            paragraphs: vec![
                BilingualParagraph {
                    syntagmas: vec![
                        Syntagma::new("Merhaba.", "Hello."),
                        Syntagma::new("Nasılsın?", "How are you?"),
                    ],
                },
                BilingualParagraph {
                    syntagmas: vec![Syntagma::new("İyiyim.", "I am fine.")],
                },
            ],
            source_language: "tr".to_string(),
            target_language: "en".to_string(),
            comprehension_questions: vec![],
        }
    }

    #[test]
    fn test_parse_original_wire_format() {
        let json = r#"{
            "paragraphs": [
                {"Sintagmas": [{"source_text": "Merhaba.", "target_text": "Hello."}]}
            ],
            "source_language": "tr",
            "target_language": "en"
        }"#;
        let text = BilingualText::from_json(json).unwrap();
        assert_eq!(text.syntagma_count(), 1);
        assert_eq!(text.paragraphs[0].syntagmas[0].target_text.as_deref(), Some("Hello."));
        assert!(text.comprehension_questions.is_empty());
    }

    #[test]
    fn test_parse_lowercase_alias_and_questions() {
        let json = r#"{
            "paragraphs": [{"syntagmas": [{"source_text": "Hallo."}]}],
            "source_language": "de",
            "target_language": "en",
            "comprehension_questions": ["Who says hello?"]
        }"#;
        let text = BilingualText::from_json(json).unwrap();
        assert!(text.paragraphs[0].syntagmas[0].target_text.is_none());
        assert_eq!(text.comprehension_questions, vec!["Who says hello?"]);
    }

    #[test]
    fn test_json_uses_sintagmas_key() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"Sintagmas\""));
        assert!(!json.contains("comprehension_questions"));
        assert_eq!(BilingualText::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_validate_rejects_empty_documents() {
        let mut text = sample();
        text.paragraphs.clear();
        assert!(matches!(text.validate(), Err(Error::InvalidInput(_))));

        let mut text = sample();
        text.target_language = " ".into();
        assert!(text.validate().is_err());

        let mut text = sample();
        text.paragraphs[1].syntagmas[0].source_text.clear();
        let err = text.validate().unwrap_err();
        assert!(err.to_string().contains("syntagma 3"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "BilingualText(tr -> en, 2 paragraphs, 3 syntagmas)"
        );
    }
}
