//! FILENAME: grid-engine/src/selection.rs
//! Row selection over the filtered and sorted sequence.
//!
//! Selection is keyed by row id (see `grid_model::row_id`), with positional
//! ids taken from the filtered+sorted rows so they do not shift with paging,
//! scrolling or grouping. The id set sits behind an `Arc`: a snapshot handed
//! out by `snapshot()` never observes later changes.

use std::collections::BTreeSet;
use std::sync::Arc;

use grid_model::{row_id, Row};
use serde::Serialize;

use crate::definition::SelectionMode;

/// Header checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSummary {
    All,
    Some,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    mode: SelectionMode,
    ids: Arc<BTreeSet<String>>,
}

impl SelectionState {
    pub fn new(mode: SelectionMode) -> Self {
        SelectionState {
            mode,
            ids: Arc::default(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    /// Shared handle to the current id set.
    pub fn snapshot(&self) -> Arc<BTreeSet<String>> {
        Arc::clone(&self.ids)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row click. In single mode, or without the additive modifier, the
    /// clicked row becomes the only selected row; an additive click in
    /// multiple mode toggles it.
    pub fn click_row(&mut self, id: &str, additive: bool) {
        if self.mode == SelectionMode::Multiple && additive {
            self.toggle_row(id);
        } else {
            self.replace(std::iter::once(id.to_string()).collect());
        }
    }

    /// Checkbox toggle of a single row.
    pub fn toggle_row(&mut self, id: &str) {
        let ids = Arc::make_mut(&mut self.ids);
        if !ids.remove(id) {
            ids.insert(id.to_string());
        }
    }

    pub fn select_all(&mut self, processed: &[&Row]) {
        self.replace(processed.iter().enumerate().map(|(index, row)| row_id(row, index)).collect());
    }

    pub fn clear(&mut self) {
        self.replace(BTreeSet::new());
    }

    /// Header checkbox click: clears when every row is selected, otherwise
    /// selects all.
    pub fn toggle_all(&mut self, processed: &[&Row]) {
        if !processed.is_empty() && self.ids.len() == processed.len() {
            self.clear();
        } else {
            self.select_all(processed);
        }
    }

    fn replace(&mut self, ids: BTreeSet<String>) {
        self.ids = Arc::new(ids);
    }

    /// The selected rows, in processed order.
    pub fn selected_rows<'a>(&self, processed: &[&'a Row]) -> Vec<&'a Row> {
        processed
            .iter()
            .enumerate()
            .filter(|(index, row)| self.ids.contains(&row_id(row, *index)))
            .map(|(_, row)| *row)
            .collect()
    }

    pub fn summary(&self, processed: &[&Row]) -> SelectionSummary {
        let all = !processed.is_empty()
            && processed
                .iter()
                .enumerate()
                .all(|(index, row)| self.ids.contains(&row_id(row, index)));
        if all {
            SelectionSummary::All
        } else if !self.ids.is_empty() {
            SelectionSummary::Some
        } else {
            SelectionSummary::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("id", 7).with("name", "a"),
            Row::new().with("name", "b"),
            Row::new().with("id", "x").with("name", "c"),
        ]
    }

    #[test]
    fn test_single_mode_click_replaces() {
        let mut selection = SelectionState::new(SelectionMode::Single);
        selection.click_row("7", false);
        selection.click_row("x", true);
        assert_eq!(selection.ids().iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_multiple_mode_additive_click_toggles() {
        let mut selection = SelectionState::new(SelectionMode::Multiple);
        selection.click_row("7", false);
        selection.click_row("x", true);
        assert_eq!(selection.len(), 2);

        selection.click_row("7", true);
        assert!(!selection.is_selected("7"));

        selection.click_row("row-1", false);
        assert_eq!(selection.ids().iter().collect::<Vec<_>>(), vec!["row-1"]);
    }

    #[test]
    fn test_snapshot_is_not_mutated() {
        let mut selection = SelectionState::new(SelectionMode::Multiple);
        selection.toggle_row("7");
        let before = selection.snapshot();
        selection.toggle_row("x");
        assert_eq!(before.len(), 1);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_select_all_uses_positional_ids() {
        let data = rows();
        let processed: Vec<&Row> = data.iter().collect();
        let mut selection = SelectionState::new(SelectionMode::Multiple);
        selection.select_all(&processed);

        let ids: Vec<&String> = selection.ids().iter().collect();
        assert_eq!(ids, vec!["7", "row-1", "x"]);
        assert_eq!(selection.summary(&processed), SelectionSummary::All);
        assert_eq!(selection.selected_rows(&processed).len(), 3);
    }

    #[test]
    fn test_summary_and_selected_rows() {
        let data = rows();
        let processed: Vec<&Row> = data.iter().collect();
        let mut selection = SelectionState::new(SelectionMode::Multiple);
        assert_eq!(selection.summary(&processed), SelectionSummary::None);

        selection.toggle_row("x");
        assert_eq!(selection.summary(&processed), SelectionSummary::Some);
        let selected = selection.selected_rows(&processed);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value("name").to_display_string(), "c");
    }

    #[test]
    fn test_toggle_all() {
        let data = rows();
        let processed: Vec<&Row> = data.iter().collect();
        let mut selection = SelectionState::new(SelectionMode::Multiple);

        selection.toggle_all(&processed);
        assert_eq!(selection.len(), 3);
        selection.toggle_all(&processed);
        assert!(selection.is_empty());

        selection.clear();
        assert_eq!(selection.summary(&[]), SelectionSummary::None);
    }
}
