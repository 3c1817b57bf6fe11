//! Per-cell match counting
use crate::search::matches::Matches;
use crate::search::tokenizer::WordSet;
use memchr::memmem;

/// Simple per-character lower-case folding, no locale rules.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Case-folded copy of a text that remembers where each folded byte came from.
pub struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    origins: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len());

        for (offset, ch) in original.char_indices() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origins.extend(std::iter::repeat(offset).take(lower.len_utf8()));
            }
        }

        Self {
            original,
            folded,
            origins,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Byte offsets in the folded text of every non-overlapping occurrence of `word`.
    pub fn occurrences<'w>(&'w self, word: &'w str) -> impl Iterator<Item = usize> + 'w {
        let needle = if word.is_empty() { None } else { Some(word) };
        needle
            .into_iter()
            .flat_map(move |needle| memmem::find_iter(self.folded.as_bytes(), needle.as_bytes()))
    }

    /// Maps a folded byte range back onto the original text.
    pub fn original_range(&self, start: usize, len: usize) -> (usize, usize) {
        let begin = self.origins[start];
        let last = self.origins[start + len - 1];
        let last_len = self.original[last..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        (begin, last + last_len - begin)
    }
}

/// Counts how much of `text` the query words cover.
pub fn count_matches(text: &str, words: &WordSet) -> Matches {
    if words.is_empty() || text.is_empty() {
        return Matches::NONE;
    }

    let folded = FoldedText::new(text);
    let mut matches = Matches::NONE;

    for word in words.iter() {
        let hits = folded.occurrences(word).count() as u32;
        if hits == 0 {
            continue;
        }
        let word_len = word.chars().count() as u32;
        matches.words += 1;
        matches.total = matches.total.saturating_add(hits.saturating_mul(word_len));
    }

    matches
}
