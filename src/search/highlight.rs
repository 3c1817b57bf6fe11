//! Matched-span discovery for highlighting displayed cell text
use crate::config::SearchColumns;
use crate::search::counter::FoldedText;
use crate::search::tokenizer::WordSet;

/// A matched region of displayed text, in byte offsets of the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Every non-overlapping occurrence of each word, grouped word by word.
///
/// Spans of different words are not merged and may overlap; resolving that
/// is up to the painter (see [`merge_spans`]).
pub fn find_spans(text: &str, words: &WordSet) -> Vec<Span> {
    if words.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let folded = FoldedText::new(text);
    let mut spans = Vec::new();

    for word in words.iter() {
        for start in folded.occurrences(word) {
            let (begin, len) = folded.original_range(start, word.len());
            spans.push(Span::new(begin, len));
        }
    }

    spans
}

/// Spans for one cell, empty when `column` is outside the searched columns.
pub fn cell_spans(text: &str, column: usize, words: &WordSet, columns: &SearchColumns) -> Vec<Span> {
    if !columns.includes(column) {
        return Vec::new();
    }
    find_spans(text, words)
}

/// Sorted, disjoint cover of `spans`, for painters that cannot overdraw.
pub fn merge_spans(spans: &[Span]) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sorted.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end() => {
                let end = last.end().max(span.end());
                last.len = end - last.start;
            }
            _ => merged.push(span),
        }
    }
    merged
}
