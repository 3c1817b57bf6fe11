//! Incremental tree search over [`crate::tree::TreeCollaborator`] rows
pub mod counter;
pub mod engine;
pub mod highlight;
pub mod matches;
pub mod tokenizer;

pub use counter::{count_matches, fold_case};
pub use engine::{MatchTable, SearchEngine, SearchEngineBuilder, SearchSummary};
pub use highlight::{find_spans, merge_spans, Span};
pub use matches::Matches;
pub use tokenizer::WordSet;
