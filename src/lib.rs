pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod scheduler;
pub mod search;
pub mod tree;

pub use crate::config::{SearchColumns, SearchOption, SearchOptions, SearchSettings};
pub use crate::error::{LengthBound, Result, TreefindError};
pub use crate::input::{BufferedInput, InputCollaborator, Key, RequestLimits};
pub use crate::metrics::Metrics;
pub use crate::scheduler::{Clock, DebounceScheduler, ManualClock, SystemClock};
pub use crate::search::{
    count_matches, find_spans, merge_spans, MatchTable, Matches, SearchEngine,
    SearchEngineBuilder, SearchSummary, Span, WordSet,
};
pub use crate::tree::{
    BatchUpdate, MemoryTree, RowId, RowSpec, SortDirection, SortKey, SortState,
    TreeCollaborator, TreeSpec,
};
