//! Match scores and the rules for combining them
use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

/// Match score of a cell, a row or a whole subtree.
///
/// `total` is the matched text weight (occurrences times word length) and
/// `words` the number of distinct query words found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Matches {
    pub total: u32,
    pub words: u32,
}

impl Matches {
    pub const NONE: Matches = Matches { total: 0, words: 0 };

    pub const fn new(total: u32, words: u32) -> Self {
        Self { total, words }
    }

    pub fn is_match(&self) -> bool {
        self.total > 0
    }

    /// Same-row combination across columns: both fields are summed.
    pub fn combine_columns(self, other: Matches) -> Matches {
        Matches {
            total: self.total.saturating_add(other.total),
            words: self.words.saturating_add(other.words),
        }
    }

    /// Subtree combination: totals are summed, distinct words take the max.
    pub fn combine_subtree(self, other: Matches) -> Matches {
        Matches {
            total: self.total.saturating_add(other.total),
            words: self.words.max(other.words),
        }
    }

    /// Relevance order: more distinct words wins, then more matched text.
    pub fn greater(&self, other: &Matches) -> bool {
        self.cmp(other) == Ordering::Greater
    }

    pub fn less(&self, other: &Matches) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

impl Ord for Matches {
    fn cmp(&self, other: &Self) -> Ordering {
        self.words
            .cmp(&other.words)
            .then_with(|| self.total.cmp(&other.total))
    }
}

impl PartialOrd for Matches {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Matches {
    type Output = Matches;

    fn add(self, rhs: Matches) -> Matches {
        self.combine_columns(rhs)
    }
}

impl AddAssign for Matches {
    fn add_assign(&mut self, rhs: Matches) {
        *self = self.combine_columns(rhs);
    }
}

impl std::iter::Sum for Matches {
    fn sum<I: Iterator<Item = Matches>>(iter: I) -> Matches {
        iter.fold(Matches::NONE, Matches::combine_columns)
    }
}
