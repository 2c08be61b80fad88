//! Index of the lemmas found in a text.
//!
//! Lemmatisation itself is done by an external tagger; this module only
//! holds its output.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordOccurrences {
    pub word: String,
    /// Char offsets into the indexed text
    pub positions: Vec<usize>,
}

/// A unique (lemma, part of speech) pair and the surface forms it takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaEntry {
    pub lemma: String,
    pub pos: String,
    pub occurrences: Vec<WordOccurrences>,
}

impl LemmaEntry {
    pub fn occurrence_count(&self) -> usize {
        self.occurrences.iter().map(|o| o.positions.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmasIndex {
    pub text: String,
    pub lemmas: Vec<LemmaEntry>,
}

impl LemmasIndex {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lemmas: Vec::new(),
        }
    }

    /// Record `word` at `position` under (`lemma`, `pos`), creating the
    /// entry or the word's occurrence list when missing.
    pub fn add_lemma(&mut self, lemma: &str, pos: &str, word: &str, position: usize) {
        let entry = match self
            .lemmas
            .iter()
            .position(|e| e.lemma == lemma && e.pos == pos)
        {
            Some(i) => &mut self.lemmas[i],
            None => {
                self.lemmas.push(LemmaEntry {
                    lemma: lemma.to_string(),
                    pos: pos.to_string(),
                    occurrences: Vec::new(),
                });
                let last = self.lemmas.len() - 1;
                &mut self.lemmas[last]
            }
        };

        match entry.occurrences.iter_mut().find(|o| o.word == word) {
            Some(occurrences) => occurrences.positions.push(position),
            None => entry.occurrences.push(WordOccurrences {
                word: word.to_string(),
                positions: vec![position],
            }),
        }
    }

    pub fn get(&self, lemma: &str, pos: &str) -> Option<&LemmaEntry> {
        self.lemmas.iter().find(|e| e.lemma == lemma && e.pos == pos)
    }

    /// Number of distinct surface forms across all lemmas.
    pub fn number_of_words(&self) -> usize {
        self.lemmas.iter().map(|e| e.occurrences.len()).sum()
    }

    /// Number of tokens indexed.
    pub fn number_of_occurrences(&self) -> usize {
        self.lemmas.iter().map(LemmaEntry::occurrence_count).sum()
    }

    /// Entries ordered by descending occurrence count, ties alphabetically.
    pub fn by_frequency(&self) -> Vec<&LemmaEntry> {
        let mut entries: Vec<&LemmaEntry> = self.lemmas.iter().collect();
        entries.sort_by(|a, b| {
            b.occurrence_count()
                .cmp(&a.occurrence_count())
                .then_with(|| a.lemma.cmp(&b.lemma))
                .then_with(|| a.pos.cmp(&b.pos))
        });
        entries
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
