//! FILENAME: grid-engine/src/columns.rs
//! Column Layout - Runtime width, visibility and order of the columns.
//!
//! `ColumnState` is derived from the column specs and then owned by the host.
//! A resize drag is an explicit `ColumnResize` value: it is created on
//! drag start, produces new widths while moving, and is dropped on release.

use grid_model::{find_column, ColumnSpec};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMN_WIDTH: f64 = 150.0;

/// Narrowest width a drag can produce.
pub const MIN_COLUMN_WIDTH: f64 = 50.0;

/// Runtime layout of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub field: String,
    pub width: f64,
    pub visible: bool,
    pub order: usize,
}

/// Builds the initial layout: declared width or the default, visible unless
/// the column is hidden, ordered as declared.
pub fn initialize_column_state(columns: &[ColumnSpec]) -> Vec<ColumnState> {
    columns
        .iter()
        .enumerate()
        .map(|(order, column)| ColumnState {
            field: column.field.clone(),
            width: column
                .width
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(DEFAULT_COLUMN_WIDTH),
            visible: !column.hide,
            order,
        })
        .collect()
}

/// Visible columns in display order, paired with their spec. States whose
/// column no longer exists are skipped.
pub fn visible_columns<'c, 's>(
    state: &'s [ColumnState],
    columns: &'c [ColumnSpec],
) -> Vec<(&'c ColumnSpec, &'s ColumnState)> {
    let mut visible: Vec<&ColumnState> = state.iter().filter(|s| s.visible).collect();
    visible.sort_by_key(|s| s.order);
    visible
        .into_iter()
        .filter_map(|s| find_column(columns, &s.field).map(|column| (column, s)))
        .collect()
}

/// Returns a copy of `state` with one column's visibility changed.
pub fn set_column_visible(state: &[ColumnState], field: &str, visible: bool) -> Vec<ColumnState> {
    state
        .iter()
        .map(|s| {
            if s.field == field {
                ColumnState { visible, ..s.clone() }
            } else {
                s.clone()
            }
        })
        .collect()
}

/// An in-progress resize drag on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnResize {
    pub field: String,
    pub start_x: f64,
    pub start_width: f64,
    /// Lower bound for this column: `MIN_COLUMN_WIDTH` or the column's
    /// `minWidth`, whichever is larger.
    pub min_width: f64,
}

impl ColumnResize {
    /// Starts a drag at pointer position `x`. `None` when the column has no
    /// layout state.
    pub fn begin(
        state: &[ColumnState],
        columns: &[ColumnSpec],
        field: &str,
        x: f64,
    ) -> Option<ColumnResize> {
        let Some(current) = state.iter().find(|s| s.field == field) else {
            debug!(target: "grid::grid", "no layout state for column '{}'; resize ignored", field);
            return None;
        };
        let declared_min = find_column(columns, field)
            .and_then(|c| c.min_width)
            .filter(|w| w.is_finite())
            .unwrap_or(0.0);
        Some(ColumnResize {
            field: field.to_string(),
            start_x: x,
            start_width: current.width,
            min_width: declared_min.max(MIN_COLUMN_WIDTH),
        })
    }

    /// Width for pointer position `x`.
    pub fn width_at(&self, x: f64) -> f64 {
        let width = self.start_width + (x - self.start_x);
        if width.is_nan() {
            return self.start_width.max(self.min_width);
        }
        width.max(self.min_width)
    }

    /// Layout after moving the pointer to `x`.
    pub fn apply(&self, state: &[ColumnState], x: f64) -> Vec<ColumnState> {
        let width = self.width_at(x);
        state
            .iter()
            .map(|s| {
                if s.field == self.field {
                    ColumnState { width, ..s.clone() }
                } else {
                    s.clone()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("id").with_width(60.0),
            ColumnSpec::new("name"),
            ColumnSpec::new("secret").hidden(true),
            ColumnSpec::new("notes").with_min_width(120.0),
        ]
    }

    #[test]
    fn test_initial_state_defaults() {
        let state = initialize_column_state(&specs());
        assert_eq!(state.len(), 4);
        assert_eq!(state[0].width, 60.0);
        assert_eq!(state[1].width, DEFAULT_COLUMN_WIDTH);
        assert!(!state[2].visible);
        assert_eq!(state.iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_visible_columns_skip_hidden_and_missing() {
        let mut state = initialize_column_state(&specs());
        state[0].order = 9;
        let remaining: Vec<ColumnSpec> =
            specs().into_iter().filter(|c| c.field != "name").collect();

        let fields: Vec<&str> = visible_columns(&state, &remaining)
            .iter()
            .map(|(column, _)| column.field.as_str())
            .collect();
        assert_eq!(fields, vec!["notes", "id"]);
    }

    #[test]
    fn test_toggle_visibility() {
        let state = initialize_column_state(&specs());
        let shown = set_column_visible(&state, "secret", true);
        assert!(shown[2].visible);
        assert!(!state[2].visible);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let columns = specs();
        let state = initialize_column_state(&columns);
        let drag = ColumnResize::begin(&state, &columns, "name", 300.0).unwrap();

        assert_eq!(drag.width_at(340.0), 190.0);
        assert_eq!(drag.width_at(100.0), MIN_COLUMN_WIDTH);

        let resized = drag.apply(&state, 250.0);
        assert_eq!(resized[1].width, 100.0);
        assert_eq!(resized[0], state[0]);
    }

    #[test]
    fn test_resize_honors_declared_min_width() {
        let columns = specs();
        let state = initialize_column_state(&columns);
        let drag = ColumnResize::begin(&state, &columns, "notes", 0.0).unwrap();
        assert_eq!(drag.width_at(-1000.0), 120.0);
        assert!(ColumnResize::begin(&state, &columns, "missing", 0.0).is_none());
    }
}
