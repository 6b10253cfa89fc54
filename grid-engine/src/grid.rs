//! FILENAME: grid-engine/src/grid.rs
//! Grid host facade.
//!
//! Owns the dataset and every piece of user-intent state, turns intents into
//! new state values, and emits a `GridEvent` after each accepted change.
//! Rendering hosts call `view()` to get what to draw.

use grid_model::{find_column, ColumnSpec, Row};
use log::{debug, trace};

use crate::columns::{
    initialize_column_state, set_column_visible, visible_columns, ColumnResize, ColumnState,
};
use crate::definition::{
    AggregationSpec, FilterModel, GridOptions, GroupSpec, SortDirection, SortSpec,
};
use crate::engine::{compute_view, process_rows, PipelineInput};
use crate::error::GridError;
use crate::events::{EventBus, GridEvent, GridListener, ListenerId};
use crate::filter::{clear_column_filter, clear_filters, create_quick_filter, has_active_filters};
use crate::grouping::{self, ExpansionState};
use crate::pagination::PaginationState;
use crate::selection::{SelectionState, SelectionSummary};
use crate::sort::{sort_direction, sort_priority, toggle_sort};
use crate::view::GridView;
use crate::virtual_scroll::VirtualWindow;

#[derive(Debug)]
pub struct Grid {
    rows: Vec<Row>,
    columns: Vec<ColumnSpec>,
    options: GridOptions,

    sort_model: Vec<SortSpec>,
    filter_model: FilterModel,
    group_by: Vec<GroupSpec>,
    aggregations: Vec<AggregationSpec>,
    expansion: ExpansionState,
    pagination: PaginationState,
    window: VirtualWindow,
    selection: SelectionState,
    column_state: Vec<ColumnState>,
    resize: Option<ColumnResize>,

    events: EventBus,
}

impl Grid {
    pub fn new(
        rows: Vec<Row>,
        columns: Vec<ColumnSpec>,
        options: GridOptions,
    ) -> Result<Self, GridError> {
        options.validate()?;
        let pagination = PaginationState::new(options.page_size)?;
        let window = VirtualWindow::from_options(&options)?;
        let selection = SelectionState::new(options.selection_mode);
        let column_state = initialize_column_state(&columns);

        Ok(Grid {
            rows,
            columns,
            options,
            sort_model: Vec::new(),
            filter_model: FilterModel::new(),
            group_by: Vec::new(),
            aggregations: Vec::new(),
            expansion: ExpansionState::new(),
            pagination,
            window,
            selection,
            column_state,
            resize: None,
            events: EventBus::new(),
        })
    }

    // ========================================================================
    // OUTPUTS
    // ========================================================================

    /// Current state as orchestrator input. Group specs only apply with
    /// grouping enabled, and enabling grouping turns virtualization off.
    pub fn pipeline_input(&self) -> PipelineInput<'_> {
        let grouping = self.options.enable_grouping;
        let virtual_scroll = self.options.virtual_scroll_config();
        PipelineInput {
            rows: &self.rows,
            columns: &self.columns,
            filter_model: &self.filter_model,
            sort_model: &self.sort_model,
            group_by: if grouping { self.group_by.as_slice() } else { &[] },
            aggregations: &self.aggregations,
            expansion: &self.expansion,
            pagination: self.options.enable_pagination.then_some(self.pagination),
            virtual_window: (virtual_scroll.enabled && !grouping).then_some(self.window),
        }
    }

    pub fn view(&self) -> GridView<'_> {
        compute_view(&self.pipeline_input())
    }

    /// Filtered and sorted rows; the sequence row ids refer to.
    pub fn processed_rows(&self) -> Vec<&Row> {
        process_rows(&self.rows, &self.columns, &self.filter_model, &self.sort_model)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn sort_model(&self) -> &[SortSpec] {
        &self.sort_model
    }

    pub fn filter_model(&self) -> &FilterModel {
        &self.filter_model
    }

    pub fn group_by(&self) -> &[GroupSpec] {
        &self.group_by
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Page position; `total_rows` is only current inside a `view()`.
    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn virtual_window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected_rows(&self) -> Vec<&Row> {
        self.selection.selected_rows(&self.processed_rows())
    }

    pub fn selection_summary(&self) -> SelectionSummary {
        self.selection.summary(&self.processed_rows())
    }

    pub fn sort_direction(&self, field: &str) -> Option<SortDirection> {
        sort_direction(field, &self.sort_model)
    }

    pub fn sort_priority(&self, field: &str) -> Option<usize> {
        sort_priority(field, &self.sort_model)
    }

    pub fn has_active_filters(&self) -> bool {
        has_active_filters(&self.filter_model)
    }

    // ========================================================================
    // LISTENERS
    // ========================================================================

    pub fn subscribe(&mut self, listener: GridListener) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn emit(&mut self, event: GridEvent) {
        trace!(target: "grid::grid", "emitting {}", event.name());
        self.events.emit(&event);
    }

    // ========================================================================
    // DATA
    // ========================================================================

    /// Replaces the dataset. Sort, filter, grouping, expansion and selection
    /// state are kept.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        debug!(target: "grid::grid", "replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
    }

    /// Replaces the columns and rebuilds the column layout from them.
    pub fn set_columns(&mut self, columns: Vec<ColumnSpec>) {
        self.column_state = initialize_column_state(&columns);
        self.resize = None;
        self.columns = columns;
    }

    // ========================================================================
    // COLUMN LAYOUT
    // ========================================================================

    pub fn column_state(&self) -> &[ColumnState] {
        &self.column_state
    }

    /// Visible columns in display order with their layout.
    pub fn visible_columns(&self) -> Vec<(&ColumnSpec, &ColumnState)> {
        visible_columns(&self.column_state, &self.columns)
    }

    pub fn set_column_visible(&mut self, field: &str, visible: bool) {
        self.column_state = set_column_visible(&self.column_state, field, visible);
    }

    /// Starts a resize drag at pointer position `x`. Returns false when
    /// resizing is disabled or the column has no layout.
    pub fn begin_column_resize(&mut self, field: &str, x: f64) -> bool {
        if !self.options.enable_column_resize {
            return false;
        }
        self.resize = ColumnResize::begin(&self.column_state, &self.columns, field, x);
        self.resize.is_some()
    }

    /// Pointer moved during a drag. Returns the new width, or `None` when no
    /// drag is in progress.
    pub fn drag_column_resize(&mut self, x: f64) -> Option<f64> {
        let drag = self.resize.as_ref()?;
        self.column_state = drag.apply(&self.column_state, x);
        Some(drag.width_at(x))
    }

    /// Ends the drag and emits the final width.
    pub fn end_column_resize(&mut self) -> bool {
        let Some(drag) = self.resize.take() else {
            return false;
        };
        let width = self
            .column_state
            .iter()
            .find(|s| s.field == drag.field)
            .map(|s| s.width);
        match width {
            Some(width) => {
                self.emit(GridEvent::ColumnResized {
                    field: drag.field,
                    width,
                });
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // SORT & FILTER
    // ========================================================================

    /// Header click. Returns false when ignored: sorting disabled, unknown
    /// column, or a column marked not sortable.
    pub fn toggle_sort(&mut self, field: &str, multi: bool) -> bool {
        if !self.options.enable_sorting {
            debug!(target: "grid::grid", "sorting disabled; ignoring header click on '{}'", field);
            return false;
        }
        match find_column(&self.columns, field) {
            Some(column) if column.is_sortable() => {}
            _ => {
                debug!(target: "grid::grid", "column '{}' is not sortable", field);
                return false;
            }
        }

        self.sort_model = toggle_sort(field, &self.sort_model, multi);
        trace!(target: "grid::grid", "sort model now {:?}", self.sort_model);
        self.emit(GridEvent::SortChanged {
            sort_model: self.sort_model.clone(),
        });
        true
    }

    /// Replaces the sort model without emitting.
    pub fn set_sort_model(&mut self, sort_model: Vec<SortSpec>) {
        self.sort_model = sort_model;
    }

    pub fn set_filter_model(&mut self, filter_model: FilterModel) {
        self.filter_model = filter_model;
        self.emit_filter_changed();
    }

    /// Replaces the filter model with one `contains` filter per filterable
    /// column.
    pub fn set_quick_filter(&mut self, text: &str) {
        self.filter_model = create_quick_filter(text, &self.columns);
        self.emit_filter_changed();
    }

    pub fn clear_column_filter(&mut self, field: &str) {
        self.filter_model = clear_column_filter(field, &self.filter_model);
        self.emit_filter_changed();
    }

    pub fn clear_filters(&mut self) {
        self.filter_model = clear_filters();
        self.emit_filter_changed();
    }

    fn emit_filter_changed(&mut self) {
        self.emit(GridEvent::FilterChanged {
            filter_model: self.filter_model.clone(),
        });
    }

    // ========================================================================
    // GROUPING
    // ========================================================================

    pub fn set_group_by(&mut self, group_by: Vec<GroupSpec>) {
        self.group_by = group_by;
        let fields = self.group_by.iter().map(|spec| spec.field.clone()).collect();
        self.emit(GridEvent::GroupByChanged { group_by: fields });
    }

    pub fn set_aggregations(&mut self, aggregations: Vec<AggregationSpec>) {
        self.aggregations = aggregations;
    }

    /// Flips one group. Returns whether it is now expanded.
    pub fn toggle_group(&mut self, group_key: &str) -> bool {
        let (expansion, expanded) = grouping::toggle_group(&self.expansion, group_key);
        self.expansion = expansion;
        self.emit(GridEvent::GroupExpanded {
            group_key: group_key.to_string(),
            expanded,
        });
        expanded
    }

    /// Expands every group of the current grouping.
    pub fn expand_all(&mut self) {
        let expansion = grouping::expand_all(&self.view().tree);
        trace!(target: "grid::grid", "expanding {} group(s)", expansion.len());
        self.expansion = expansion;
    }

    pub fn collapse_all(&mut self) {
        self.expansion = grouping::collapse_all();
    }

    pub fn is_group_expanded(&self, group_key: &str) -> bool {
        grouping::is_group_expanded(&self.expansion, group_key)
    }

    // ========================================================================
    // PAGINATION & SCROLLING
    // ========================================================================

    /// Moves to `page`. Out-of-range or unchanged pages are ignored and
    /// return false.
    pub fn set_page(&mut self, page: usize) -> bool {
        let total_rows = self.view().flattened_len;
        match self.pagination.with_total_rows(total_rows).set_page(page) {
            Some(next) => {
                self.apply_page(next);
                true
            }
            None => false,
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.pagination.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        match self.pagination.current_page.checked_sub(1) {
            Some(page) => self.set_page(page),
            None => false,
        }
    }

    /// Changes the page size and returns to page 1. The size must be one of
    /// `page_size_options` unless that list is empty.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), GridError> {
        let next = self.pagination.with_page_size(page_size)?;
        if !self.options.pagination_config().offers(page_size) {
            return Err(GridError::PageSizeNotOffered(page_size));
        }
        self.options.page_size = page_size;
        self.apply_page(next);
        Ok(())
    }

    fn apply_page(&mut self, next: PaginationState) {
        self.pagination = next;
        self.window = self.window.with_scroll(0.0, self.window.scroll_left);
        self.emit(GridEvent::PageChanged {
            current_page: next.current_page,
            page_size: next.page_size,
        });
    }

    /// Scroll position update. Ignored when virtual scrolling is disabled.
    pub fn scroll(&mut self, scroll_top: f64, scroll_left: f64) {
        if !self.options.enable_virtual_scroll {
            return;
        }
        self.window = self.window.with_scroll(scroll_top, scroll_left);
    }

    pub fn resize_viewport(&mut self, height: f64, width: f64) -> Result<(), GridError> {
        self.window = self.window.with_viewport(height, width)?;
        self.options.viewport_height = height;
        self.options.viewport_width = width;
        Ok(())
    }

    pub fn set_row_height(&mut self, row_height: f64) -> Result<(), GridError> {
        self.window = self.window.with_row_height(row_height)?;
        self.options.row_height = row_height;
        Ok(())
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    /// Row click. `additive` is the ctrl/meta modifier. Ignored when
    /// selection is disabled.
    pub fn click_row(&mut self, id: &str, additive: bool) {
        if !self.options.enable_selection {
            return;
        }
        self.selection.click_row(id, additive);
        self.emit_selection_changed();
    }

    /// Checkbox toggle. Ignored when selection is disabled.
    pub fn toggle_row_selection(&mut self, id: &str) {
        if !self.options.enable_selection {
            return;
        }
        self.selection.toggle_row(id);
        self.emit_selection_changed();
    }

    pub fn select_all(&mut self) {
        let processed =
            process_rows(&self.rows, &self.columns, &self.filter_model, &self.sort_model);
        self.selection.select_all(&processed);
        self.emit_selection_changed();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit_selection_changed();
    }

    /// Header checkbox click.
    pub fn toggle_select_all(&mut self) {
        let processed =
            process_rows(&self.rows, &self.columns, &self.filter_model, &self.sort_model);
        self.selection.toggle_all(&processed);
        self.emit_selection_changed();
    }

    fn emit_selection_changed(&mut self) {
        let selected_rows = self.selected_rows().into_iter().cloned().collect();
        let selected_row_ids = self.selection.ids().iter().cloned().collect();
        self.emit(GridEvent::SelectionChanged {
            selected_rows,
            selected_row_ids,
        });
    }
}
