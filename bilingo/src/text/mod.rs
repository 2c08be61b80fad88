//! Text segmentation: paragraphs, sentences and length-bounded chunks.

pub mod language;
mod seams;
pub mod segmenter;
pub mod sentences;

pub use language::{LanguageDetector, LinguaDetector, language_code, parse_language_tag};
pub use self::seams::DialogSplitter;
pub use segmenter::{Segmenter, char_len, segment, split_paragraphs};
pub use sentences::{PunctuationSplitter, SentenceSplitter};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which sentence splitter to repartition long paragraphs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitterKind {
    /// Punctuation rules for any script
    #[default]
    Punctuation,
    /// seams dialog-aware detector, English only
    Dialog,
}

impl SplitterKind {
    pub fn build(self) -> Box<dyn SentenceSplitter> {
        match self {
            Self::Punctuation => Box::new(PunctuationSplitter),
            Self::Dialog => Box::new(DialogSplitter),
        }
    }
}

impl FromStr for SplitterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "punctuation" => Ok(Self::Punctuation),
            "dialog" => Ok(Self::Dialog),
            other => Err(Error::InvalidInput(format!("unknown sentence splitter: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua::Language;

    #[test]
    fn test_splitter_kind_serde() {
        let kind: SplitterKind = serde_json::from_str("\"dialog\"").unwrap();
        assert_eq!(kind, SplitterKind::Dialog);
        assert_eq!(SplitterKind::default(), SplitterKind::Punctuation);
        assert_eq!("Dialog".parse::<SplitterKind>().unwrap(), SplitterKind::Dialog);
        assert!("icu".parse::<SplitterKind>().is_err());
    }

    #[test]
    fn test_built_splitter_is_usable() {
        let splitter = SplitterKind::Punctuation.build();
        let sentences = splitter.split("One. Two.", Language::English).unwrap();
        assert_eq!(sentences, vec!["One.", "Two."]);
    }
}
