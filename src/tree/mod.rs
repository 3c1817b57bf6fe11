//! The hierarchical row structure the engine searches over
pub mod memory;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

pub use memory::{MemoryTree, RowId, RowSpec, TreeSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// The tree's own sort column and direction. `column: None` is insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: Option<usize>, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// How [`TreeCollaborator::resort`] should order sibling rows.
pub enum SortKey<'a, R> {
    /// Order by the given comparator; rows it ranks first come first.
    Relevance(&'a dyn Fn(R, R) -> Ordering),
    /// Order by the tree's own sort column and direction.
    Natural(SortState),
}

impl<R> fmt::Debug for SortKey<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Relevance(_) => f.write_str("Relevance"),
            SortKey::Natural(state) => f.debug_tuple("Natural").field(state).finish(),
        }
    }
}

/// Row navigation, cell text and visibility/expansion state of a host tree.
///
/// Rows are opaque handles owned by the host; the engine never creates or
/// destroys them. `parent` returns `None` for top-level rows.
pub trait TreeCollaborator {
    type Row: Copy + Eq + Hash + fmt::Debug;

    fn first_top_level_row(&self) -> Option<Self::Row>;
    fn next_sibling(&self, row: Self::Row) -> Option<Self::Row>;
    fn first_child(&self, row: Self::Row) -> Option<Self::Row>;
    fn parent(&self, row: Self::Row) -> Option<Self::Row>;
    fn depth(&self, row: Self::Row) -> usize;

    fn cell_text(&self, row: Self::Row, column: usize) -> Cow<'_, str>;
    fn column_count(&self) -> usize;

    fn is_visible(&self, row: Self::Row) -> bool;
    fn set_visible(&mut self, row: Self::Row, visible: bool);
    fn is_expanded(&self, row: Self::Row) -> bool;
    fn set_expanded(&mut self, row: Self::Row, expanded: bool);

    fn begin_batch_update(&mut self);
    fn end_batch_update(&mut self);

    fn sort_state(&self) -> SortState;
    fn resort(&mut self, key: SortKey<'_, Self::Row>);

    fn top_level_rows(&self) -> Siblings<'_, Self> {
        Siblings {
            tree: self,
            next: self.first_top_level_row(),
        }
    }

    fn children(&self, row: Self::Row) -> Siblings<'_, Self> {
        Siblings {
            tree: self,
            next: self.first_child(row),
        }
    }

    /// Every row, depth first.
    fn all_rows(&self) -> Vec<Self::Row> {
        let mut rows = Vec::new();
        let mut stack: Vec<Self::Row> = self.top_level_rows().collect();
        stack.reverse();
        while let Some(row) = stack.pop() {
            rows.push(row);
            let first = stack.len();
            stack.extend(self.children(row));
            stack[first..].reverse();
        }
        rows
    }

    fn total_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<Self::Row> = self.top_level_rows().collect();
        while let Some(row) = stack.pop() {
            count += 1;
            stack.extend(self.children(row));
        }
        count
    }

    /// Rows that are visible themselves and have no hidden ancestor.
    fn visible_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<Self::Row> = self.top_level_rows().collect();
        while let Some(row) = stack.pop() {
            if self.is_visible(row) {
                count += 1;
                stack.extend(self.children(row));
            }
        }
        count
    }

    fn show_all(&mut self) {
        let mut stack: Vec<Self::Row> = self.top_level_rows().collect();
        while let Some(row) = stack.pop() {
            if !self.is_visible(row) {
                self.set_visible(row, true);
            }
            stack.extend(self.children(row));
        }
    }

    fn full_collapse(&mut self) {
        let mut stack: Vec<Self::Row> = self.top_level_rows().collect();
        while let Some(row) = stack.pop() {
            if self.is_expanded(row) {
                self.set_expanded(row, false);
            }
            stack.extend(self.children(row));
        }
    }
}

/// Iterator over a row and its following siblings.
pub struct Siblings<'t, T: TreeCollaborator + ?Sized> {
    tree: &'t T,
    next: Option<T::Row>,
}

impl<T: TreeCollaborator + ?Sized> Iterator for Siblings<'_, T> {
    type Item = T::Row;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.next?;
        self.next = self.tree.next_sibling(row);
        Some(row)
    }
}

/// Scoped batch update: begun on creation, ended on drop, whatever the exit path.
pub struct BatchUpdate<'t, T: TreeCollaborator + ?Sized> {
    tree: &'t mut T,
}

impl<'t, T: TreeCollaborator + ?Sized> BatchUpdate<'t, T> {
    pub fn begin(tree: &'t mut T) -> Self {
        tree.begin_batch_update();
        Self { tree }
    }
}

impl<T: TreeCollaborator + ?Sized> Deref for BatchUpdate<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.tree
    }
}

impl<T: TreeCollaborator + ?Sized> DerefMut for BatchUpdate<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.tree
    }
}

impl<T: TreeCollaborator + ?Sized> Drop for BatchUpdate<'_, T> {
    fn drop(&mut self) {
        self.tree.end_batch_update();
    }
}
