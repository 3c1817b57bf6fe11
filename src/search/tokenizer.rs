//! Query tokenization into a deduplicated, lower-cased word set
use crate::search::counter::fold_case;
use std::collections::btree_set;
use std::collections::BTreeSet;

/// Characters that separate search words in a query.
pub const WORD_DELIMITERS: &[char] = &['.', '/', ';', ',', '\t', ' '];

/// The words of the active query, already case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    words: BTreeSet<String>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `query` on any run of [`WORD_DELIMITERS`].
    pub fn tokenize(query: &str) -> Self {
        let words = query
            .split(WORD_DELIMITERS)
            .filter(|token| !token.is_empty())
            .map(fold_case)
            .collect();

        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a WordSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|w| fold_case(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}
