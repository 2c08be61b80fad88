//! Paragraph segmentation into length-bounded chunks.

use lingua::Language;
use once_cell::sync::Lazy;
use regex::Regex;

use super::language::{LanguageDetector, LinguaDetector};
use super::sentences::{PunctuationSplitter, SentenceSplitter};
use crate::error::Result;

/// A run of whitespace holding at least one blank line.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*\n\s*").expect("paragraph break pattern should compile"));

/// Length of text as counted by chunk limits: Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text on blank lines into trimmed, non-empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Splits text into chunks of at most `max_length` characters without ever
/// breaking a sentence.
///
/// A `max_length` of zero disables the limit: every paragraph becomes one
/// chunk. Paragraphs that already fit are passed through untouched; longer
/// ones are split into sentences, which are packed greedily. A sentence longer
/// than the limit becomes a chunk of its own.
pub struct Segmenter {
    max_length: usize,
    language: Option<Language>,
    detector: Box<dyn LanguageDetector>,
    splitter: Box<dyn SentenceSplitter>,
}

impl Segmenter {
    /// Segmenter with lingua language detection and punctuation splitting.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            language: None,
            detector: Box::new(LinguaDetector),
            splitter: Box::new(PunctuationSplitter),
        }
    }

    /// Use this language for every paragraph instead of detecting it.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Segment `text` into ordered chunks.
    pub fn segment(&self, text: &str) -> Result<Vec<String>> {
        let mut chunks = Vec::new();

        for paragraph in split_paragraphs(text) {
            if self.max_length == 0 || char_len(paragraph) <= self.max_length {
                chunks.push(paragraph.to_string());
            } else {
                let sentences = self.sentences(paragraph)?;
                chunks.extend(pack_sentences(sentences, self.max_length));
            }
        }

        Ok(chunks)
    }

    /// Sentences of one paragraph, in its configured or detected language.
    pub fn sentences(&self, paragraph: &str) -> Result<Vec<String>> {
        let language = match self.language {
            Some(language) => language,
            None => self.detector.detect(paragraph)?,
        };
        self.splitter.split(paragraph, language)
    }
}

/// Segment `text` with language detection and the default splitter.
pub fn segment(text: &str, max_length: usize) -> Result<Vec<String>> {
    Segmenter::new(max_length).segment(text)
}

/// Greedily join sentences with single spaces while the result fits.
fn pack_sentences(sentences: Vec<String>, max_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let len = char_len(&sentence);

        if len > max_length {
            // Oversized sentences go out whole, after whatever was pending
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.push(sentence);
        } else if current.is_empty() {
            current = sentence;
            current_len = len;
        } else if current_len + 1 + len <= max_length {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + len;
        } else {
            chunks.push(std::mem::replace(&mut current, sentence));
            current_len = len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Detector that counts calls and always answers with one language.
    struct CountingDetector {
        language: Language,
        calls: Arc<AtomicUsize>,
    }

    impl LanguageDetector for CountingDetector {
        fn detect(&self, _text: &str) -> Result<Language> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.language)
        }
    }

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn detect(&self, text: &str) -> Result<Language> {
            Err(Error::LanguageUndetected {
                excerpt: text.to_string(),
            })
        }
    }

    fn english(max_length: usize) -> Segmenter {
        Segmenter::new(max_length).with_language(Language::English)
    }

    #[test]
    fn test_two_paragraphs_split_by_sentence() {
        let text = "First para sentence one. First para sentence two!\n\n\
                    Second para sentence one? Second para sentence two.";
        let chunks = segment(text, 30).unwrap();
        assert_eq!(
            chunks,
            vec![
                "First para sentence one.",
                "First para sentence two!",
                "Second para sentence one?",
                "Second para sentence two.",
            ]
        );
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let text = "Short. This sentence is definitely longer than ten characters.";
        let chunks = segment(text, 10).unwrap();
        assert_eq!(
            chunks,
            vec![
                "Short.",
                "This sentence is definitely longer than ten characters."
            ]
        );
    }

    #[test]
    fn test_blank_input() {
        assert!(english(10).segment("").unwrap().is_empty());
        assert!(english(10).segment("   \n\n  ").unwrap().is_empty());
        assert!(english(0).segment("\n\n   \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_basic_paragraphs() {
        let text = "This is the first paragraph.\n\nThis is the second paragraph.";
        assert_eq!(
            english(0).segment(text).unwrap(),
            vec!["This is the first paragraph.", "This is the second paragraph."]
        );
    }

    #[test]
    fn test_greedy_packing() {
        let text = "Sentence one. Sent two. Sentence three.";
        assert_eq!(
            english(25).segment(text).unwrap(),
            vec!["Sentence one. Sent two.", "Sentence three."]
        );
    }

    #[test]
    fn test_unbounded_keeps_paragraph() {
        assert_eq!(english(0).segment("A. B. C.").unwrap(), vec!["A. B. C."]);
    }

    #[test]
    fn test_paragraph_exactly_max_length() {
        assert_eq!(english(5).segment("12345").unwrap(), vec!["12345"]);
    }

    #[test]
    fn test_sentence_without_punctuation() {
        let text = "This is a sentence without punctuation\n\nAnother one";
        assert_eq!(
            english(10).segment(text).unwrap(),
            vec!["This is a sentence without punctuation", "Another one"]
        );
    }

    #[test]
    fn test_paragraph_whitespace_and_blank_runs() {
        assert_eq!(
            english(0).segment("   Para1.   \n \n\n\t\n   Para2.   ").unwrap(),
            vec!["Para1.", "Para2."]
        );
    }

    #[test]
    fn test_single_newline_is_not_a_paragraph_break() {
        assert_eq!(
            english(0).segment("Line one.\nLine two.").unwrap(),
            vec!["Line one.\nLine two."]
        );
    }

    #[test]
    fn test_oversized_sentence_flushes_pending_chunk() {
        let text = "One. Two. This sentence is far too long to fit. Three. Four.";
        assert_eq!(
            english(10).segment(text).unwrap(),
            vec![
                "One. Two.",
                "This sentence is far too long to fit.",
                "Three.",
                "Four."
            ]
        );
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let segmenter = Segmenter::new(17).with_language(Language::Russian);
        assert_eq!(
            segmenter.segment("Привет. Как дела? Всё хорошо!").unwrap(),
            vec!["Привет. Как дела?", "Всё хорошо!"]
        );
    }

    #[test]
    fn test_unicode_detected_language() {
        assert_eq!(
            segment("Привет. Как дела? Всё хорошо!", 15).unwrap(),
            vec!["Привет.", "Как дела?", "Всё хорошо!"]
        );
    }

    #[test]
    fn test_detection_only_for_long_paragraphs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let segmenter = Segmenter::new(20).with_detector(Box::new(CountingDetector {
            language: Language::English,
            calls: Arc::clone(&calls),
        }));

        let chunks = segmenter
            .segment("Fits.\n\nThis one is long. It needs splitting.")
            .unwrap();
        assert_eq!(chunks, vec!["Fits.", "This one is long.", "It needs splitting."]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detection_failure_propagates() {
        let segmenter = Segmenter::new(5).with_detector(Box::new(FailingDetector));
        let err = segmenter.segment("Far too long for five.").unwrap_err();
        assert!(matches!(err, Error::LanguageUndetected { .. }));

        // Short paragraphs never reach the detector
        assert_eq!(segmenter.segment("Tiny.").unwrap(), vec!["Tiny."]);
    }

    #[test]
    fn test_split_paragraphs() {
        assert_eq!(
            split_paragraphs("a\n\nb\r\n\r\nc\n  \n  d"),
            vec!["a", "b", "c", "d"]
        );
        assert!(split_paragraphs(" \n\n ").is_empty());
    }

    fn sentence() -> impl Strategy<Value = String> {
        (
            "[A-Z][a-z]{0,6}( [a-z]{1,6}){0,5}",
            prop::sample::select(vec![".", "!", "?"]),
        )
            .prop_map(|(words, end)| format!("{}{}", words, end))
    }

    fn paragraphs() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(prop::collection::vec(sentence(), 1..6), 0..5)
    }

    proptest! {
        #[test]
        fn prop_chunks_reassemble_to_sentences(
            paragraphs in paragraphs(),
            max_length in 0usize..80,
        ) {
            let text = paragraphs
                .iter()
                .map(|p| p.join(" "))
                .collect::<Vec<_>>()
                .join("\n\n");
            let segmenter = english(max_length);
            let chunks = segmenter.segment(&text).unwrap();

            let expected: Vec<String> = paragraphs.into_iter().flatten().collect();
            let mut reassembled = Vec::new();
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());

                let sentences = segmenter.sentences(chunk).unwrap();
                if max_length > 0 && sentences.len() > 1 {
                    prop_assert!(char_len(chunk) <= max_length, "chunk too long: {:?}", chunk);
                }
                reassembled.extend(sentences);
            }
            prop_assert_eq!(reassembled, expected);
        }
    }
}
