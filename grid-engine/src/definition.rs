//! FILENAME: grid-engine/src/definition.rs
//! Grid Definition - The serializable view directives.
//!
//! This module contains all the types needed to DESCRIBE a view over a
//! dataset. These structures are designed to be:
//! - Serializable (so hosts can exchange them as JSON)
//! - Immutable snapshots of user intent
//! - Threaded explicitly through the pipeline, never hidden in it

use std::collections::BTreeMap;
use std::fmt;

use grid_model::{Comparator, Value};
use serde::{Deserialize, Serialize};

use crate::error::GridError;

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One key of a (possibly multi-key) sort.
/// Priorities of an active sort set are contiguous from 0; 0 is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
    pub priority: usize,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection, priority: usize) -> Self {
        SortSpec {
            field: field.into(),
            direction,
            priority,
        }
    }

    pub fn asc(field: impl Into<String>, priority: usize) -> Self {
        SortSpec::new(field, SortDirection::Asc, priority)
    }

    pub fn desc(field: impl Into<String>, priority: usize) -> Self {
        SortSpec::new(field, SortDirection::Desc, priority)
    }
}

// ============================================================================
// FILTER DEFINITIONS
// ============================================================================

/// Per-column predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    InRange,
    Blank,
    NotBlank,
    /// Any operator name this engine does not know. Always passes.
    #[serde(other)]
    Unrecognized,
}

/// A filter applied to one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub operator: FilterOperator,

    #[serde(default)]
    pub value: Value,

    /// Upper bound for `inRange`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

impl FilterSpec {
    pub fn new(operator: FilterOperator, value: impl Into<Value>) -> Self {
        FilterSpec {
            operator,
            value: value.into(),
            value2: None,
        }
    }

    pub fn in_range(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        FilterSpec {
            operator: FilterOperator::InRange,
            value: min.into(),
            value2: Some(max.into()),
        }
    }

    /// Operators that take no operand.
    pub fn unary(operator: FilterOperator) -> Self {
        FilterSpec {
            operator,
            value: Value::Null,
            value2: None,
        }
    }
}

/// The set of active filters, keyed by field and combined with logical AND.
pub type FilterModel = BTreeMap<String, FilterSpec>;

// ============================================================================
// GROUPING & AGGREGATION
// ============================================================================

/// One grouping level. List order defines nesting (index 0 = outermost).
#[derive(Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    pub field: String,

    /// Orders the group values of this level. Defaults to a null-last
    /// natural ordering.
    #[serde(skip)]
    pub comparator: Option<Comparator>,
}

impl GroupSpec {
    pub fn new(field: impl Into<String>) -> Self {
        GroupSpec {
            field: field.into(),
            comparator: None,
        }
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(std::sync::Arc::new(comparator));
        self
    }
}

impl fmt::Debug for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSpec")
            .field("field", &self.field)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

/// Supported aggregation functions for group summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    First,
    Last,
}

/// Aggregate a field over each group's rows. The result is stored in the
/// group's aggregates under the field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub field: String,

    #[serde(alias = "func")]
    pub function: AggregationFunction,
}

impl AggregationSpec {
    pub fn new(field: impl Into<String>, function: AggregationFunction) -> Self {
        AggregationSpec {
            field: field.into(),
            function,
        }
    }
}

// ============================================================================
// GRID OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

/// Host-level configuration of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    #[serde(default = "default_true")]
    pub enable_sorting: bool,

    #[serde(default)]
    pub enable_filtering: bool,

    #[serde(default)]
    pub enable_pagination: bool,

    #[serde(default = "default_true")]
    pub enable_selection: bool,

    #[serde(default = "default_true")]
    pub enable_virtual_scroll: bool,

    /// Grouping only applies when enabled; enabling it also turns off
    /// virtualization.
    #[serde(default)]
    pub enable_grouping: bool,

    #[serde(default = "default_true")]
    pub enable_column_resize: bool,

    #[serde(default)]
    pub selection_mode: SelectionMode,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    /// Fixed row height in pixels, used by virtual scrolling.
    #[serde(default = "default_row_height")]
    pub row_height: f64,

    /// Extra rows materialized on each side of the visible band.
    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: usize,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    25
}

fn default_page_size_options() -> Vec<usize> {
    vec![10, 25, 50, 100]
}

fn default_row_height() -> f64 {
    40.0
}

fn default_buffer_rows() -> usize {
    5
}

fn default_viewport_height() -> f64 {
    600.0
}

fn default_viewport_width() -> f64 {
    800.0
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            enable_sorting: true,
            enable_filtering: false,
            enable_pagination: false,
            enable_selection: true,
            enable_virtual_scroll: true,
            enable_grouping: false,
            enable_column_resize: true,
            selection_mode: SelectionMode::Single,
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            row_height: default_row_height(),
            buffer_rows: default_buffer_rows(),
            viewport_height: default_viewport_height(),
            viewport_width: default_viewport_width(),
        }
    }
}

impl GridOptions {
    /// Parses options from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let options: GridOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.page_size == 0 {
            return Err(GridError::InvalidPageSize(self.page_size));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(GridError::InvalidRowHeight(self.row_height));
        }
        if !(self.viewport_height >= 0.0 && self.viewport_width >= 0.0) {
            return Err(GridError::InvalidViewport {
                height: self.viewport_height,
                width: self.viewport_width,
            });
        }
        Ok(())
    }

    pub fn pagination_config(&self) -> PaginationConfig {
        PaginationConfig {
            page_size: self.page_size,
            page_size_options: self.page_size_options.clone(),
            enabled: self.enable_pagination,
        }
    }

    pub fn virtual_scroll_config(&self) -> VirtualScrollConfig {
        VirtualScrollConfig {
            row_height: self.row_height,
            enabled: self.enable_virtual_scroll,
        }
    }
}

impl PaginationConfig {
    /// Whether `page_size` may be chosen. An empty option list allows any
    /// positive size.
    pub fn offers(&self, page_size: usize) -> bool {
        page_size > 0
            && (self.page_size_options.is_empty() || self.page_size_options.contains(&page_size))
    }
}

/// Pagination inputs as seen by the pagination collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub enabled: bool,
}

/// Virtual scrolling inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualScrollConfig {
    pub row_height: f64,
    pub enabled: bool,
}
