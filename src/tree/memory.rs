//! Arena-backed tree for hosts without a tree widget of their own
use crate::error::{Result, TreefindError};
use crate::tree::{SortDirection, SortKey, SortState, TreeCollaborator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(usize);

impl RowId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Serialized form of a tree: optional column headers plus nested rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSpec {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<RowSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowSpec {
    pub cells: Vec<String>,
    #[serde(default)]
    pub children: Vec<RowSpec>,
}

#[derive(Debug, Clone)]
struct Node {
    cells: Vec<String>,
    parent: Option<usize>,
    children: Vec<usize>,
    // index within the parent's (or the root) sibling list
    position: usize,
    depth: usize,
    visible: bool,
    expanded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    columns: Vec<String>,
    column_count: usize,
    nodes: Vec<Node>,
    roots: Vec<usize>,
    sort: SortState,
    batch_depth: usize,
    batches_completed: usize,
}

impl MemoryTree {
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            ..Self::default()
        }
    }

    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self {
            column_count: columns.len(),
            columns,
            ..Self::default()
        }
    }

    pub fn from_spec(spec: TreeSpec) -> Self {
        let mut tree = if spec.columns.is_empty() {
            let widest = widest_row(&spec.rows);
            Self::new(widest)
        } else {
            Self::with_columns(spec.columns)
        };

        for row in spec.rows {
            tree.insert_spec(None, row);
        }
        tree
    }

    /// Reads a tree from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let spec: TreeSpec = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(TreefindError::Other(format!(
                    "Unsupported tree file extension: {}",
                    other.unwrap_or("<none>")
                )))
            }
        };
        Ok(Self::from_spec(spec))
    }

    fn insert_spec(&mut self, parent: Option<RowId>, spec: RowSpec) {
        let id = self.add_row(parent, spec.cells);
        for child in spec.children {
            self.insert_spec(Some(id), child);
        }
    }

    /// Appends a visible, collapsed row under `parent` (or at top level).
    pub fn add_row<S: Into<String>>(
        &mut self,
        parent: Option<RowId>,
        cells: impl IntoIterator<Item = S>,
    ) -> RowId {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.column_count = self.column_count.max(cells.len());
        }

        let index = self.nodes.len();
        let (depth, position) = match parent {
            Some(RowId(p)) => {
                let node = &mut self.nodes[p];
                node.children.push(index);
                (node.depth + 1, node.children.len() - 1)
            }
            None => {
                self.roots.push(index);
                (0, self.roots.len() - 1)
            }
        };

        self.nodes.push(Node {
            cells,
            parent: parent.map(RowId::index),
            children: Vec::new(),
            position,
            depth,
            visible: true,
            expanded: false,
        });
        RowId(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_updating(&self) -> bool {
        self.batch_depth > 0
    }

    /// Number of batch updates that have been closed.
    pub fn batches_completed(&self) -> usize {
        self.batches_completed
    }

    pub fn set_sort_state(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn cells(&self, row: RowId) -> &[String] {
        &self.nodes[row.0].cells
    }

    /// Top-level rows in their current order.
    pub fn roots(&self) -> Vec<RowId> {
        self.roots.iter().copied().map(RowId).collect()
    }

    pub fn child_rows(&self, row: RowId) -> Vec<RowId> {
        self.nodes[row.0].children.iter().copied().map(RowId).collect()
    }

    fn siblings_of(&self, index: usize) -> &[usize] {
        match self.nodes[index].parent {
            Some(p) => &self.nodes[p].children,
            None => &self.roots,
        }
    }

    fn sort_level(&mut self, level: Option<usize>, compare: &dyn Fn(usize, usize) -> Ordering) {
        let mut list = match level {
            Some(p) => std::mem::take(&mut self.nodes[p].children),
            None => std::mem::take(&mut self.roots),
        };
        list.sort_by(|&a, &b| compare(a, b));
        for (position, &index) in list.iter().enumerate() {
            self.nodes[index].position = position;
        }
        match level {
            Some(p) => self.nodes[p].children = list,
            None => self.roots = list,
        }
    }

    fn sort_all(&mut self, compare: &dyn Fn(usize, usize) -> Ordering) {
        self.sort_level(None, compare);
        for parent in 0..self.nodes.len() {
            if !self.nodes[parent].children.is_empty() {
                self.sort_level(Some(parent), compare);
            }
        }
    }

    fn sort_keys(&self, column: Option<usize>) -> Vec<String> {
        match column {
            Some(column) => self
                .nodes
                .iter()
                .map(|node| node.cells.get(column).cloned().unwrap_or_default())
                .collect(),
            None => Vec::new(),
        }
    }
}

fn natural_order(keys: &[String], direction: SortDirection, a: usize, b: usize) -> Ordering {
    let ordering = if keys.is_empty() {
        a.cmp(&b)
    } else {
        keys[a].cmp(&keys[b]).then(a.cmp(&b))
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn widest_row(rows: &[RowSpec]) -> usize {
    rows.iter()
        .map(|row| row.cells.len().max(widest_row(&row.children)))
        .max()
        .unwrap_or(0)
}

impl TreeCollaborator for MemoryTree {
    type Row = RowId;

    fn first_top_level_row(&self) -> Option<RowId> {
        self.roots.first().copied().map(RowId)
    }

    fn next_sibling(&self, row: RowId) -> Option<RowId> {
        let position = self.nodes[row.0].position;
        self.siblings_of(row.0).get(position + 1).copied().map(RowId)
    }

    fn first_child(&self, row: RowId) -> Option<RowId> {
        self.nodes[row.0].children.first().copied().map(RowId)
    }

    fn parent(&self, row: RowId) -> Option<RowId> {
        self.nodes[row.0].parent.map(RowId)
    }

    fn depth(&self, row: RowId) -> usize {
        self.nodes[row.0].depth
    }

    fn cell_text(&self, row: RowId, column: usize) -> Cow<'_, str> {
        self.nodes[row.0]
            .cells
            .get(column)
            .map_or(Cow::Borrowed(""), |text| Cow::Borrowed(text.as_str()))
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn is_visible(&self, row: RowId) -> bool {
        self.nodes[row.0].visible
    }

    fn set_visible(&mut self, row: RowId, visible: bool) {
        self.nodes[row.0].visible = visible;
    }

    fn is_expanded(&self, row: RowId) -> bool {
        self.nodes[row.0].expanded
    }

    fn set_expanded(&mut self, row: RowId, expanded: bool) {
        self.nodes[row.0].expanded = expanded;
    }

    fn begin_batch_update(&mut self) {
        self.batch_depth += 1;
    }

    fn end_batch_update(&mut self) {
        if self.batch_depth > 0 {
            self.batch_depth -= 1;
            self.batches_completed += 1;
        }
    }

    fn sort_state(&self) -> SortState {
        self.sort
    }

    fn resort(&mut self, key: SortKey<'_, RowId>) {
        match key {
            SortKey::Relevance(compare) => {
                self.sort_all(&|a, b| compare(RowId(a), RowId(b)).then(a.cmp(&b)));
            }
            SortKey::Natural(state) => {
                self.sort = state;
                let keys = self.sort_keys(state.column);
                self.sort_all(&|a, b| natural_order(&keys, state.direction, a, b));
            }
        }
    }
}
