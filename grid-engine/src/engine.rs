//! FILENAME: grid-engine/src/engine.rs
//! Pipeline Orchestrator - Composes the stages in fixed order.
//!
//! filter -> sort -> group+aggregate -> flatten -> paginate -> virtualize
//!
//! Every run starts from the raw rows. The result depends only on the
//! `PipelineInput`, so identical inputs give identical views.

use grid_model::{ColumnSpec, Row};
use log::debug;

use crate::definition::{AggregationSpec, FilterModel, GroupSpec, SortSpec};
use crate::filter::apply_filters;
use crate::grouping::{apply_grouping, visible_row_count, ExpansionState, GroupChildren};
use crate::pagination::PaginationState;
use crate::sort::apply_sort;
use crate::view::GridView;
use crate::virtual_scroll::VirtualWindow;

/// Everything a pipeline run reads.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub rows: &'a [Row],
    pub columns: &'a [ColumnSpec],
    pub filter_model: &'a FilterModel,
    pub sort_model: &'a [SortSpec],
    pub group_by: &'a [GroupSpec],
    pub aggregations: &'a [AggregationSpec],
    pub expansion: &'a ExpansionState,
    /// `None` when pagination is disabled.
    pub pagination: Option<PaginationState>,
    /// `None` when virtual scrolling is disabled.
    pub virtual_window: Option<VirtualWindow>,
}

impl<'a> PipelineInput<'a> {
    pub fn is_grouping_active(&self) -> bool {
        !self.group_by.is_empty()
    }

    /// Virtualization only applies to plain, unpaged row lists.
    pub fn is_virtualization_active(&self) -> bool {
        self.virtual_window.is_some() && self.pagination.is_none() && !self.is_grouping_active()
    }
}

// ============================================================================
// PIPELINE CALCULATOR
// ============================================================================

pub struct PipelineCalculator<'i, 'a> {
    input: &'i PipelineInput<'a>,
}

impl<'i, 'a> PipelineCalculator<'i, 'a> {
    pub fn new(input: &'i PipelineInput<'a>) -> Self {
        PipelineCalculator { input }
    }

    /// Runs every stage and returns the view.
    pub fn calculate(&self) -> GridView<'a> {
        // Step 1 + 2: Filter, then sort
        let processed = self.process_rows();

        // Step 3: Group and aggregate
        let tree = self.build_tree(&processed);

        // Step 4: Length of the flattened sequence (rows when ungrouped)
        let flattened_len = visible_row_count(&tree);

        // Step 5: Paginate
        let pagination = self
            .input
            .pagination
            .map(|state| state.with_total_rows(flattened_len));

        // Step 6: Virtualize
        let virtual_range = if self.input.is_virtualization_active() {
            self.input
                .virtual_window
                .map(|window| window.visible_range(flattened_len))
        } else {
            None
        };

        let display_range = match (&pagination, &virtual_range) {
            (Some(state), _) => state.page_bounds(),
            (None, Some(range)) => range.clone(),
            (None, None) => 0..flattened_len,
        };

        debug!(
            target: "grid::pipeline",
            "pipeline: {} rows -> {} processed -> {} flattened -> showing {:?}",
            self.input.rows.len(),
            processed.len(),
            flattened_len,
            display_range
        );

        GridView {
            processed,
            tree,
            pagination,
            virtual_range,
            flattened_len,
            display_range,
        }
    }

    fn process_rows(&self) -> Vec<&'a Row> {
        process_rows(
            self.input.rows,
            self.input.columns,
            self.input.filter_model,
            self.input.sort_model,
        )
    }

    fn build_tree(&self, processed: &[&'a Row]) -> GroupChildren<'a> {
        apply_grouping(
            processed.to_vec(),
            self.input.group_by,
            self.input.columns,
            self.input.aggregations,
            self.input.expansion,
        )
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Runs the full pipeline. This is the main entry point for hosts that keep
/// their own state.
pub fn compute_view<'a>(input: &PipelineInput<'a>) -> GridView<'a> {
    PipelineCalculator::new(input).calculate()
}

/// Filter and sort only: the sequence selection ids are derived from.
pub fn process_rows<'a>(
    rows: &'a [Row],
    columns: &[ColumnSpec],
    filter_model: &FilterModel,
    sort_model: &[SortSpec],
) -> Vec<&'a Row> {
    let filtered = apply_filters(rows, filter_model, columns);
    apply_sort(filtered, sort_model, columns)
}
