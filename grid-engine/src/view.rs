//! FILENAME: grid-engine/src/view.rs
//! PURPOSE: Output of one pipeline run.
//! CONTEXT: A `GridView` borrows the input rows. It keeps the processed
//! (filtered+sorted) sequence for selection, the group tree, and the window
//! of the flattened sequence the viewport should materialize.

use std::ops::Range;

use grid_model::Row;

use crate::grouping::{flatten_visible_rows, DisplayRow, GroupChildren, GroupNode};
use crate::pagination::PaginationState;

#[derive(Debug, Clone)]
pub struct GridView<'a> {
    /// Filtered and sorted rows, before grouping. Row ids are positions here.
    pub processed: Vec<&'a Row>,

    /// Grouped rows, or `GroupChildren::Rows` when grouping is inactive.
    pub tree: GroupChildren<'a>,

    /// Page position with `total_rows` set to the flattened length.
    /// `None` when pagination is disabled.
    pub pagination: Option<PaginationState>,

    /// Materialized index window when virtualization applied.
    pub virtual_range: Option<Range<usize>>,

    /// Length of the full flattened display sequence.
    pub flattened_len: usize,

    /// Range of the flattened sequence returned by `display_rows`.
    pub display_range: Range<usize>,
}

impl<'a> GridView<'a> {
    /// The rows to materialize, in display order.
    pub fn display_rows(&self) -> Vec<DisplayRow<'_>> {
        match &self.tree {
            GroupChildren::Rows(rows) => rows[self.display_range.clone()]
                .iter()
                .map(|row| DisplayRow::Row(*row))
                .collect(),
            GroupChildren::Groups(_) => {
                let mut flat = flatten_visible_rows(&self.tree);
                flat.truncate(self.display_range.end);
                flat.drain(..self.display_range.start);
                flat
            }
        }
    }

    /// The full flattened sequence, ignoring paging and virtualization.
    pub fn flattened_rows(&self) -> Vec<DisplayRow<'_>> {
        flatten_visible_rows(&self.tree)
    }

    pub fn is_grouped(&self) -> bool {
        self.tree.is_grouped()
    }

    pub fn groups(&self) -> &[GroupNode<'a>] {
        self.tree.groups()
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    pub fn total_pages(&self) -> Option<usize> {
        self.pagination.as_ref().map(PaginationState::total_pages)
    }
}
