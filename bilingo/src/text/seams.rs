//! Dialog-aware sentence splitting for English using the seams library.

use lingua::Language;
use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;
use std::sync::OnceLock;

use super::sentences::SentenceSplitter;
use crate::error::{Error, Result};

/// Global detector instance, built on first use. A failed build is cached too.
static DETECTOR: OnceLock<std::result::Result<SentenceDetectorDialog, String>> = OnceLock::new();

fn get_detector() -> Result<&'static SentenceDetectorDialog> {
    DETECTOR
        .get_or_init(|| SentenceDetectorDialog::new().map_err(|e| format!("{:?}", e)))
        .as_ref()
        .map_err(|e| Error::SentenceDetection(e.clone()))
}

/// Splitter that understands dialog quotes and English abbreviations.
///
/// Only English is supported; other languages are rejected rather than split
/// with English rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogSplitter;

impl SentenceSplitter for DialogSplitter {
    fn split(&self, paragraph: &str, language: Language) -> Result<Vec<String>> {
        if language != Language::English {
            return Err(Error::UnsupportedLanguage(format!(
                "{:?} (dialog splitter handles English only)",
                language
            )));
        }

        let sentences = get_detector()?
            .detect_sentences_borrowed(paragraph)
            .map_err(|e| Error::SentenceDetection(format!("{:?}", e)))?;

        Ok(sentences
            .iter()
            .map(|s| s.normalize().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seams_detector_available() {
        assert!(get_detector().is_ok());
    }

    #[test]
    fn test_split_english() {
        let sentences = DialogSplitter
            .split("First sentence. Second sentence.", Language::English)
            .unwrap();
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("First"));
        assert!(sentences[1].contains("Second"));
    }

    #[test]
    fn test_rejects_other_languages() {
        let err = DialogSplitter
            .split("Привет. Как дела?", Language::Russian)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(_)));
    }
}
