//! The search cycle and the engine that drives it
use crate::config::{SearchColumns, SearchOption, SearchSettings};
use crate::error::{Result, TreefindError};
use crate::input::{InputCollaborator, Key, RequestLimits};
use crate::metrics::Metrics;
use crate::scheduler::{Clock, DebounceScheduler, SystemClock};
use crate::search::counter::count_matches;
use crate::search::highlight::{cell_spans, Span};
use crate::search::matches::Matches;
use crate::search::tokenizer::WordSet;
use crate::tree::{BatchUpdate, SortDirection, SortKey, SortState, TreeCollaborator};
use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Subtree-aggregate matches per row, rebuilt every cycle.
#[derive(Debug, Clone)]
pub struct MatchTable<R> {
    entries: HashMap<R, Matches>,
}

impl<R> Default for MatchTable<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<R: Copy + Eq + Hash> MatchTable<R> {
    /// Matches for `row`; rows without an entry count as no match.
    pub fn get(&self, row: R) -> Matches {
        self.entries.get(&row).copied().unwrap_or_default()
    }

    pub fn contains(&self, row: R) -> bool {
        self.entries.contains_key(&row)
    }

    pub fn insert(&mut self, row: R, matches: Matches) {
        self.entries.insert(row, matches);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, R, Matches> {
        self.entries.iter()
    }

    /// Most relevant first.
    pub fn compare_desc(&self, a: R, b: R) -> Ordering {
        self.get(b).cmp(&self.get(a))
    }
}

/// Outcome of a cycle: visible rows out of all rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub visible: usize,
    pub total: usize,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.visible, self.total)
    }
}

/// Matches of one row, summed over the searched columns.
pub fn count_matches_in_row<T: TreeCollaborator + ?Sized>(
    tree: &T,
    row: T::Row,
    words: &WordSet,
    columns: &SearchColumns,
) -> Result<Matches> {
    if columns.is_empty() {
        return Ok((0..tree.column_count())
            .map(|column| count_matches(&tree.cell_text(row, column), words))
            .sum());
    }

    let mut matches = Matches::NONE;
    for &column in columns {
        matches += count_matches_in_column(tree, row, column, words)?;
    }
    Ok(matches)
}

pub fn count_matches_in_column<T: TreeCollaborator + ?Sized>(
    tree: &T,
    row: T::Row,
    column: usize,
    words: &WordSet,
) -> Result<Matches> {
    let column_count = tree.column_count();
    if column >= column_count {
        return Err(TreefindError::InvalidColumnIndex {
            index: column,
            column_count,
        });
    }
    Ok(count_matches(&tree.cell_text(row, column), words))
}

/// One pass over a top-level row and everything below it.
struct SubtreeWalk<'a, R> {
    words: &'a WordSet,
    columns: &'a SearchColumns,
    auto_expand: bool,
    table: &'a mut MatchTable<R>,
    scanned: u64,
}

impl<R: Copy + Eq + Hash> SubtreeWalk<'_, R> {
    fn visit<T>(&mut self, tree: &mut T, row: R) -> Result<Matches>
    where
        T: TreeCollaborator<Row = R> + ?Sized,
    {
        let own = count_matches_in_row(&*tree, row, self.words, self.columns)?;
        self.scanned += 1;

        if self.auto_expand && tree.depth(row) > 0 {
            if own.is_match() {
                expand_ancestors(tree, row);
            } else if tree.is_expanded(row) {
                tree.set_expanded(row, false);
            }
        }

        let mut aggregate = own;
        let mut child = tree.first_child(row);
        while let Some(current) = child {
            aggregate = aggregate.combine_subtree(self.visit(tree, current)?);
            child = tree.next_sibling(current);
        }

        self.table.insert(row, aggregate);
        Ok(aggregate)
    }
}

fn expand_ancestors<T: TreeCollaborator + ?Sized>(tree: &mut T, row: T::Row) {
    let mut ancestor = tree.parent(row);
    while let Some(current) = ancestor {
        if !tree.is_expanded(current) {
            tree.set_expanded(current, true);
        }
        ancestor = tree.parent(current);
    }
}

/// Incremental search over one tree, fed by one input.
pub struct SearchEngine<T, I, C = SystemClock>
where
    T: TreeCollaborator,
    I: InputCollaborator,
    C: Clock,
{
    tree: T,
    input: I,
    settings: SearchSettings,
    scheduler: DebounceScheduler<C>,
    words: WordSet,
    table: MatchTable<T::Row>,
    natural_sort: SortState,
    metrics: Arc<Metrics>,
}

pub struct SearchEngineBuilder<T, I, C = SystemClock> {
    tree: Option<T>,
    input: Option<I>,
    settings: SearchSettings,
    clock: C,
    metrics: Option<Arc<Metrics>>,
}

impl<T, I> Default for SearchEngineBuilder<T, I, SystemClock> {
    fn default() -> Self {
        Self {
            tree: None,
            input: None,
            settings: SearchSettings::default(),
            clock: SystemClock,
            metrics: None,
        }
    }
}

impl<T, I, C> SearchEngineBuilder<T, I, C>
where
    T: TreeCollaborator,
    I: InputCollaborator,
    C: Clock,
{
    pub fn tree(mut self, tree: T) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn input(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> SearchEngineBuilder<T, I, C2> {
        SearchEngineBuilder {
            tree: self.tree,
            input: self.input,
            settings: self.settings,
            clock,
            metrics: self.metrics,
        }
    }

    pub fn build(self) -> Result<SearchEngine<T, I, C>> {
        let tree = self.tree.ok_or(TreefindError::MissingCollaborator("tree"))?;
        let input = self
            .input
            .ok_or(TreefindError::MissingCollaborator("input"))?;
        self.settings.validate()?;

        let natural_sort = tree.sort_state();
        Ok(SearchEngine {
            tree,
            input,
            settings: self.settings,
            scheduler: DebounceScheduler::new(self.clock),
            words: WordSet::new(),
            table: MatchTable::default(),
            natural_sort,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

impl<T, I> SearchEngine<T, I, SystemClock>
where
    T: TreeCollaborator,
    I: InputCollaborator,
{
    pub fn builder() -> SearchEngineBuilder<T, I> {
        SearchEngineBuilder::default()
    }

    pub fn new(tree: T, input: I, settings: SearchSettings) -> Result<Self> {
        Self::builder()
            .tree(tree)
            .input(input)
            .settings(settings)
            .build()
    }
}

impl<T, I, C> SearchEngine<T, I, C>
where
    T: TreeCollaborator,
    I: InputCollaborator,
    C: Clock,
{
    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SearchSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn words(&self) -> &WordSet {
        &self.words
    }

    pub fn match_table(&self) -> &MatchTable<T::Row> {
        &self.table
    }

    pub fn matches_for(&self, row: T::Row) -> Matches {
        self.table.get(row)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn scheduler(&self) -> &DebounceScheduler<C> {
        &self.scheduler
    }

    pub fn is_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Time until the pending search fires, if one is armed.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.scheduler.remaining()
    }

    pub fn natural_sort_state(&self) -> SortState {
        self.natural_sort
    }

    fn limits(&self) -> RequestLimits {
        RequestLimits::from(&self.settings)
    }

    /// The input text changed. An emptied input resets results right away.
    pub fn on_text_changed(&mut self) {
        if self.input.text().is_empty() {
            self.reset_search_results();
        }
    }

    /// A key was released in the input: validate the request and (re)arm the timer.
    pub fn on_key_up(&mut self, key: Key) -> Result<()> {
        if !key.edits_request() {
            return Ok(());
        }

        let request = self.input.text();
        if request.is_empty() {
            return Ok(());
        }
        self.check_request(&request)?;

        if self
            .settings
            .options
            .contains(SearchOption::StartSearchAfterButtonClick)
        {
            return Ok(());
        }

        let delay = self.settings.input_delay();
        if self.scheduler.start(delay) {
            self.metrics.timer_restarts.inc();
        }
        debug!("Search request armed, firing in {} ms", delay.as_millis());
        Ok(())
    }

    /// The input's clear button was pressed.
    pub fn on_clear_clicked(&mut self) {
        self.input.clear();
        self.reset_search_results();
    }

    /// The user picked a new natural sort column in the tree header.
    pub fn on_header_click(&mut self, column: Option<usize>, direction: SortDirection) {
        self.natural_sort = SortState::new(column, direction);
    }

    /// Explicit search trigger, bypassing the debounce timer.
    pub fn trigger(&mut self) -> Result<SearchSummary> {
        let request = self.input.text();
        if !request.is_empty() {
            self.check_request(&request)?;
        }
        self.scheduler.reset();
        self.process_request()
    }

    /// Runs the pending search if its quiet interval has elapsed.
    pub fn tick(&mut self) -> Result<Option<SearchSummary>> {
        if !self.scheduler.poll() {
            return Ok(None);
        }
        self.process_request().map(Some)
    }

    fn check_request(&mut self, request: &str) -> Result<()> {
        if let Err(err) = self.limits().validate(request) {
            warn!("Rejected search request: {err}");
            self.scheduler.reset();
            self.input.show_message(&err.to_string());
            return Err(err);
        }
        if self.input.is_message_shown() {
            self.input.hide_message();
        }
        Ok(())
    }

    /// One full search cycle over the current input text.
    pub fn process_request(&mut self) -> Result<SearchSummary> {
        let request = self.input.text();
        let words = WordSet::tokenize(&request);
        if words.is_empty() {
            return Ok(self.reset_search_results());
        }
        self.words = words;
        debug!("Searching for {} word(s): {:?}", self.words.len(), self.words);

        match self.run_cycle() {
            Ok(summary) => {
                self.metrics.cycles_completed.inc();
                info!("Search for '{request}' done: {summary}");
                self.input.set_summary(&summary.to_string());
                Ok(summary)
            }
            Err(err) => {
                self.metrics.cycles_aborted.inc();
                error!("Search cycle aborted: {err}");
                self.words.clear();
                self.table.clear();
                Err(err)
            }
        }
    }

    fn run_cycle(&mut self) -> Result<SearchSummary> {
        self.table.clear();

        let relevant_sort = self.settings.options.contains(SearchOption::RelevantSort);
        let mut walk = SubtreeWalk {
            words: &self.words,
            columns: &self.settings.search_columns,
            auto_expand: self.settings.options.contains(SearchOption::AutoExpandNodes),
            table: &mut self.table,
            scanned: 0,
        };

        {
            let mut batch = BatchUpdate::begin(&mut self.tree);

            let mut row = batch.first_top_level_row();
            while let Some(top) = row {
                let aggregate = walk.visit(&mut *batch, top)?;
                batch.set_visible(top, aggregate.is_match());
                row = batch.next_sibling(top);
            }

            let scanned = walk.scanned;
            self.metrics.rows_scanned.inc_by(scanned);
            debug!("Scanned {scanned} row(s)");

            if relevant_sort {
                let table = &self.table;
                batch.resort(SortKey::Relevance(&|a, b| table.compare_desc(a, b)));
            }
        }

        Ok(SearchSummary {
            visible: self.tree.visible_count(),
            total: self.tree.total_count(),
        })
    }

    /// Drops the query and restores the tree: all rows visible, collapsed, natural order.
    pub fn reset_search_results(&mut self) -> SearchSummary {
        self.scheduler.reset();

        {
            let mut batch = BatchUpdate::begin(&mut self.tree);
            batch.show_all();
            batch.full_collapse();
            batch.resort(SortKey::Natural(self.natural_sort));
        }

        if self.input.is_message_shown() {
            self.input.hide_message();
        }

        let total = self.tree.total_count();
        self.input.set_summary(&total.to_string());

        self.words.clear();
        self.table.clear();
        debug!("Search results reset");

        SearchSummary {
            visible: total,
            total,
        }
    }

    /// Ordering for the tree's compare hook: most relevant row first.
    pub fn compare_rows(&self, a: T::Row, b: T::Row) -> Ordering {
        self.table.compare_desc(a, b)
    }

    pub fn count_matches_in_row(&self, row: T::Row) -> Result<Matches> {
        count_matches_in_row(&self.tree, row, &self.words, &self.settings.search_columns)
    }

    pub fn count_matches_in_column(&self, row: T::Row, column: usize) -> Result<Matches> {
        count_matches_in_column(&self.tree, row, column, &self.words)
    }

    /// Spans to paint for `text` shown in `column`.
    pub fn spans(&self, text: &str, column: usize) -> Vec<Span> {
        cell_spans(text, column, &self.words, &self.settings.search_columns)
    }

    /// Spans to paint for the cell at `row`/`column`.
    pub fn highlight_cell(&self, row: T::Row, column: usize) -> Vec<Span> {
        let text = self.tree.cell_text(row, column);
        self.spans(&text, column)
    }
}
