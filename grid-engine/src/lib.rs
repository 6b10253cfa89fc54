//! FILENAME: grid-engine/src/lib.rs
//! Presentation pipeline for tabular data.
//!
//! Given rows, column metadata and view directives, computes the exact
//! ordered sequence a viewport must show, plus page bounds, the virtual
//! index window, group aggregates and expand/collapse state.
//!
//! Layers:
//! - `definition`: Serializable directives and options (what the view IS)
//! - `filter`, `sort`, `grouping`, `pagination`, `virtual_scroll`: the stages
//! - `engine`: Orchestrator composing the stages (HOW we calculate)
//! - `view`: Output of one run (WHAT we display)
//! - `columns`: Column widths, visibility and resize drags
//! - `grid`: Host facade owning state, turning intents into events

pub mod columns;
pub mod definition;
pub mod engine;
pub mod error;
pub mod events;
pub mod filter;
pub mod grid;
pub mod grouping;
pub mod pagination;
pub mod selection;
pub mod sort;
pub mod view;
pub mod virtual_scroll;


pub use columns::{
    initialize_column_state, set_column_visible, visible_columns, ColumnResize, ColumnState,
};
pub use definition::*;
pub use engine::{compute_view, process_rows, PipelineCalculator, PipelineInput};
pub use error::GridError;
pub use events::{EventBus, GridEvent, GridListener, ListenerId};
pub use filter::{
    apply_filters, clear_column_filter, clear_filters, create_quick_filter, has_active_filters,
    test_filter,
};
pub use grid::Grid;
pub use grouping::{
    apply_grouping, collapse_all, compute_aggregates, expand_all, flatten_visible_rows, group_key,
    is_group_expanded, toggle_group, visible_row_count, DisplayRow, ExpansionState, GroupChildren,
    GroupNode,
};
pub use pagination::{paginate, PaginationState};
pub use selection::{SelectionState, SelectionSummary};
pub use sort::{
    apply_sort, default_compare, merge_sort_by, sort_direction, sort_priority, toggle_sort,
};
pub use view::GridView;
pub use virtual_scroll::VirtualWindow;

pub use grid_model::{column_value, find_column, row_id, ColumnSpec, Row, Value};
