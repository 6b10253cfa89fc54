//! FILENAME: grid-engine/src/virtual_scroll.rs
//! Virtual Scroll Window - Buffered index range derived from scroll position.
//!
//! Rows have a fixed height, so the window is pure arithmetic:
//!   raw_start     = floor(scroll_top / row_height)
//!   visible_count = ceil(viewport_height / row_height)
//!   start_row     = max(0, raw_start - buffer)
//!   end_row       = raw_start + visible_count + buffer
//! `end_row` is clamped to the row count only when a range is requested.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::definition::GridOptions;
use crate::error::GridError;

pub const DEFAULT_BUFFER_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualWindow {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub row_height: f64,
    pub buffer: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        VirtualWindow {
            scroll_top: 0.0,
            scroll_left: 0.0,
            viewport_height: 600.0,
            viewport_width: 800.0,
            row_height: 40.0,
            buffer: DEFAULT_BUFFER_ROWS,
            start_row: 0,
            end_row: 0,
        }
        .recomputed()
    }
}

impl VirtualWindow {
    pub fn new(
        row_height: f64,
        viewport_height: f64,
        viewport_width: f64,
        buffer: usize,
    ) -> Result<Self, GridError> {
        validate_row_height(row_height)?;
        validate_viewport(viewport_height, viewport_width)?;
        Ok(VirtualWindow {
            row_height,
            viewport_height,
            viewport_width,
            buffer,
            ..VirtualWindow::default()
        }
        .recomputed())
    }

    pub fn from_options(options: &GridOptions) -> Result<Self, GridError> {
        VirtualWindow::new(
            options.row_height,
            options.viewport_height,
            options.viewport_width,
            options.buffer_rows,
        )
    }

    pub fn with_scroll(&self, scroll_top: f64, scroll_left: f64) -> VirtualWindow {
        VirtualWindow {
            scroll_top,
            scroll_left,
            ..*self
        }
        .recomputed()
    }

    pub fn with_viewport(&self, height: f64, width: f64) -> Result<VirtualWindow, GridError> {
        validate_viewport(height, width)?;
        Ok(VirtualWindow {
            viewport_height: height,
            viewport_width: width,
            ..*self
        }
        .recomputed())
    }

    pub fn with_row_height(&self, row_height: f64) -> Result<VirtualWindow, GridError> {
        validate_row_height(row_height)?;
        Ok(VirtualWindow { row_height, ..*self }.recomputed())
    }

    fn recomputed(mut self) -> Self {
        let raw_start = self.row_index_at_scroll(self.scroll_top);
        let visible_count = (self.viewport_height / self.row_height).ceil().max(0.0) as usize;
        self.start_row = raw_start.saturating_sub(self.buffer);
        self.end_row = raw_start.saturating_add(visible_count).saturating_add(self.buffer);
        self
    }

    /// Index range to materialize for `total_rows` rows.
    pub fn visible_range(&self, total_rows: usize) -> Range<usize> {
        let end = self.end_row.min(total_rows);
        let start = self.start_row.min(end);
        start..end
    }

    /// Full scrollable content height.
    pub fn total_height(&self, row_count: usize) -> f64 {
        row_count as f64 * self.row_height
    }

    /// Absolute y position of a row.
    pub fn row_offset(&self, index: usize) -> f64 {
        index as f64 * self.row_height
    }

    /// Scroll offset that brings `index` to the top of the viewport.
    pub fn scroll_to_row(&self, index: usize) -> f64 {
        self.row_offset(index)
    }

    pub fn row_index_at_scroll(&self, scroll_top: f64) -> usize {
        // Negative offsets (overscroll) map to row 0.
        (scroll_top / self.row_height).floor().max(0.0) as usize
    }
}

fn validate_row_height(row_height: f64) -> Result<(), GridError> {
    if row_height.is_finite() && row_height > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidRowHeight(row_height))
    }
}

fn validate_viewport(height: f64, width: f64) -> Result<(), GridError> {
    if height >= 0.0 && width >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidViewport { height, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_window_from_scroll() {
        let window = VirtualWindow::new(40.0, 400.0, 800.0, 5).unwrap().with_scroll(500.0, 0.0);
        assert_eq!(window.row_index_at_scroll(500.0), 12);
        assert_eq!(window.start_row, 7);
        assert_eq!(window.end_row, 27);
        assert_eq!(window.visible_range(1000), 7..27);
    }

    #[test]
    fn test_window_at_top() {
        let window = VirtualWindow::default();
        // 600 / 40 = 15 visible rows, plus 5 buffer below, none above.
        assert_eq!(window.start_row, 0);
        assert_eq!(window.end_row, 20);
    }

    #[test]
    fn test_range_clamped_to_row_count() {
        let window = VirtualWindow::default().with_scroll(4000.0, 0.0);
        assert_eq!(window.visible_range(50), 50..50);
        assert_eq!(window.visible_range(110), 95..110);
        assert_eq!(VirtualWindow::default().visible_range(0), 0..0);
    }

    #[test]
    fn test_partial_row_rounds_visible_count_up() {
        let window = VirtualWindow::new(40.0, 410.0, 800.0, 0).unwrap();
        assert_eq!(window.end_row, 11);
    }

    #[test]
    fn test_geometry_helpers() {
        let window = VirtualWindow::default();
        assert_eq!(window.total_height(100), 4000.0);
        assert_eq!(window.row_offset(3), 120.0);
        assert_eq!(window.scroll_to_row(10), 400.0);
        assert_eq!(window.row_index_at_scroll(79.9), 1);
        assert_eq!(window.row_index_at_scroll(-20.0), 0);
    }

    #[test]
    fn test_viewport_and_row_height_changes_recompute() {
        let window = VirtualWindow::default().with_scroll(400.0, 0.0);
        assert_eq!((window.start_row, window.end_row), (5, 30));

        let taller = window.with_viewport(800.0, 800.0).unwrap();
        assert_eq!(taller.end_row, 35);

        let denser = window.with_row_height(20.0).unwrap();
        assert_eq!((denser.start_row, denser.end_row), (15, 55));
    }

    #[test]
    fn test_huge_scroll_and_buffer_saturate() {
        let far = VirtualWindow::default().with_scroll(1e30, 0.0);
        assert_eq!(far.end_row, usize::MAX);
        assert_eq!(far.visible_range(100), 100..100);

        let wide = VirtualWindow::new(40.0, 600.0, 800.0, usize::MAX).unwrap();
        assert_eq!(wide.start_row, 0);
        assert_eq!(wide.visible_range(10), 0..10);
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        assert!(matches!(
            VirtualWindow::default().with_row_height(0.0),
            Err(GridError::InvalidRowHeight(_))
        ));
        assert!(matches!(
            VirtualWindow::default().with_viewport(-1.0, 10.0),
            Err(GridError::InvalidViewport { .. })
        ));
    }
}
