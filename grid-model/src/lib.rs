//! FILENAME: grid-model/src/lib.rs
//! PURPOSE: Shared data model for the grid presentation pipeline.
//! CONTEXT: Re-exports the row, value and column types used by `grid-engine`
//! and by hosts that feed rows into it.

pub mod column;
pub mod row;
pub mod value;

pub use column::{column_value, find_column, ColumnSpec, Comparator, ValueGetter};
pub use row::{row_id, Row, ROW_ID_FIELD};
pub use value::{OrderedFloat, Value, ValueKey};
