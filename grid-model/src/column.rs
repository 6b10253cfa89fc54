//! FILENAME: grid-model/src/column.rs
//! PURPOSE: Column metadata governing how a field is read and compared.
//! CONTEXT: Hosts may inject a value getter and a comparator per column.
//! Both are strategy callbacks and must be pure for the pipeline to stay
//! deterministic. They are not serialized.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::row::Row;
use crate::value::Value;

/// Computes a field value from a whole row (for derived or nested data).
pub type ValueGetter = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

/// Orders two field values. Panics inside a comparator propagate to the caller.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Describes one column of the grid.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Field name that maps to the row property.
    pub field: String,

    /// Display name for the column header.
    #[serde(default)]
    pub header_name: Option<String>,

    /// Custom value accessor. When absent the raw row field is read.
    #[serde(skip)]
    pub value_getter: Option<ValueGetter>,

    /// Custom comparator used by the sort engine.
    #[serde(skip)]
    pub comparator: Option<Comparator>,

    /// `Some(false)` disables sorting; absent means sortable.
    #[serde(default)]
    pub sortable: Option<bool>,

    /// `Some(false)` excludes the column from quick filters.
    #[serde(default)]
    pub filterable: Option<bool>,

    /// Initial width in pixels.
    #[serde(default)]
    pub width: Option<f64>,

    #[serde(default)]
    pub min_width: Option<f64>,

    /// Hidden columns start out invisible.
    #[serde(default)]
    pub hide: bool,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>) -> Self {
        ColumnSpec {
            field: field.into(),
            header_name: None,
            value_getter: None,
            comparator: None,
            sortable: None,
            filterable: None,
            width: None,
            min_width: None,
            hide: false,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header_name = Some(header.into());
        self
    }

    pub fn with_value_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        self.value_getter = Some(Arc::new(getter));
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = Some(filterable);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn hidden(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable != Some(false)
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable != Some(false)
    }

    /// Reads this column's value from a row.
    pub fn value_of(&self, row: &Row) -> Value {
        match &self.value_getter {
            Some(getter) => getter(row),
            None => row.value(&self.field).clone(),
        }
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("field", &self.field)
            .field("header_name", &self.header_name)
            .field("value_getter", &self.value_getter.is_some())
            .field("comparator", &self.comparator.is_some())
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("hide", &self.hide)
            .finish()
    }
}

/// Finds the column describing `field`.
pub fn find_column<'c>(columns: &'c [ColumnSpec], field: &str) -> Option<&'c ColumnSpec> {
    columns.iter().find(|c| c.field == field)
}

/// Reads `field` from a row through its column's accessor, falling back to
/// the raw row field when no column metadata exists.
pub fn column_value(row: &Row, field: &str, columns: &[ColumnSpec]) -> Value {
    match find_column(columns, field) {
        Some(column) => column.value_of(row),
        None => row.value(field).clone(),
    }
}
