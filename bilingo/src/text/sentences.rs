//! Punctuation-driven sentence boundary detection.
//!
//! A boundary follows a run of terminal punctuation plus any closing quotes or
//! brackets. Western terminators need whitespace (or the end of the paragraph)
//! after them, so `3.14` or `e.g.x` never split. Full-width CJK terminators end
//! a sentence on their own. Abbreviations are not recognised: `Dr. Smith`
//! splits after `Dr.`.

use lingua::Language;

use crate::error::Result;

/// Splits one paragraph into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Sentences in order, trimmed, never empty.
    fn split(&self, paragraph: &str, language: Language) -> Result<Vec<String>>;
}

/// Terminators that need trailing whitespace to end a sentence.
const SPACED_TERMINATORS: &[char] = &[
    '.', '!', '?', '…', '‼', '⁇', '⁈', '⁉', // Latin, Cyrillic and most scripts
    '؟', '۔', // Arabic, Urdu
    '।', '॥', // Devanagari, Bengali
    '։', // Armenian
    '።', '፧', // Ethiopic
    '\u{037E}', // Greek question mark
];

/// Terminators that end a sentence even without a following space.
const UNSPACED_TERMINATORS: &[char] = &['。', '！', '？', '｡', '．'];

/// Closing quotes and brackets that stay with the sentence they close.
const CLOSERS: &[char] = &[
    '"', '\'', '”', '’', '“', '»', '«', '›', '‹', ')', ']', '}', '）', '」', '』', '】', '〉', '》',
];

/// Rule-based splitter for any script that marks sentence ends with punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSplitter;

impl PunctuationSplitter {
    fn is_terminator(c: char, language: Language) -> bool {
        SPACED_TERMINATORS.contains(&c)
            || UNSPACED_TERMINATORS.contains(&c)
            // Greek writes its question mark with the ASCII semicolon
            || (c == ';' && language == Language::Greek)
    }

    /// Byte offsets where each sentence ends.
    fn boundaries(paragraph: &str, language: Language) -> Vec<usize> {
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        let offset_of = |i: usize| chars.get(i).map_or(paragraph.len(), |&(pos, _)| pos);

        let mut ends = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if !Self::is_terminator(chars[i].1, language) {
                i += 1;
                continue;
            }

            let mut j = i;
            let mut unspaced = false;
            while j < chars.len() && Self::is_terminator(chars[j].1, language) {
                unspaced |= UNSPACED_TERMINATORS.contains(&chars[j].1);
                j += 1;
            }
            let last_terminator = chars[j - 1].1;
            let run_len = j - i;

            let mut closed = false;
            while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                closed = true;
                j += 1;
            }

            let at_end = j == chars.len();
            let followed_by_space = at_end || chars[j].1.is_whitespace();
            let is_boundary = if unspaced {
                true
            } else if !followed_by_space {
                false
            } else if closed || last_terminator == '…' || (last_terminator == '.' && run_len > 1) {
                // Quoted speech and trailing ellipses only end the sentence
                // when the next word does not continue it in lower case.
                !continues_in_lowercase(&chars[j..])
            } else {
                true
            };

            if is_boundary {
                ends.push(offset_of(j));
            }
            i = j;
        }
        ends
    }
}

/// Whether the first non-whitespace character is a lowercase letter.
fn continues_in_lowercase(rest: &[(usize, char)]) -> bool {
    rest.iter()
        .map(|&(_, c)| c)
        .find(|c| !c.is_whitespace())
        .is_some_and(char::is_lowercase)
}

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, paragraph: &str, language: Language) -> Result<Vec<String>> {
        let mut sentences = Vec::new();
        let mut start = 0;

        let ends = Self::boundaries(paragraph, language);
        for end in ends.into_iter().chain(std::iter::once(paragraph.len())) {
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
        Ok(sentences)
    }
}
