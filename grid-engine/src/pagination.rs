//! FILENAME: grid-engine/src/pagination.rs
//! Pagination Window - Page slicing over the flattened display sequence.

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Current page position. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub current_page: usize,
    pub page_size: usize,
    pub total_rows: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState {
            current_page: 1,
            page_size: 25,
            total_rows: 0,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Result<Self, GridError> {
        PaginationState::default().with_page_size(page_size)
    }

    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_rows.div_ceil(self.page_size)
    }

    /// 0-based index range of the current page, clamped to the row count.
    pub fn page_bounds(&self) -> Range<usize> {
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(self.total_rows);
        let end = start.saturating_add(self.page_size).min(self.total_rows);
        start..end
    }

    /// 1-based `(startRow, endRow)` for "showing X to Y of Z" labels.
    /// Both are 0 when there are no rows.
    pub fn row_range(&self) -> (usize, usize) {
        if self.total_rows == 0 {
            return (0, 0);
        }
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .saturating_add(1);
        let end = self.current_page.saturating_mul(self.page_size).min(self.total_rows);
        (start, end)
    }

    /// Moves to `page`. Returns `None` (state unchanged) when the page is
    /// out of range or already current.
    pub fn set_page(&self, page: usize) -> Option<PaginationState> {
        if page < 1 || page > self.total_pages() || page == self.current_page {
            debug!(
                target: "grid::pipeline",
                "ignoring page change to {} (current {}, total {})",
                page,
                self.current_page,
                self.total_pages()
            );
            return None;
        }
        Some(PaginationState {
            current_page: page,
            ..*self
        })
    }

    pub fn first(&self) -> Option<PaginationState> {
        self.set_page(1)
    }

    pub fn previous(&self) -> Option<PaginationState> {
        self.current_page.checked_sub(1).and_then(|page| self.set_page(page))
    }

    pub fn next(&self) -> Option<PaginationState> {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn last(&self) -> Option<PaginationState> {
        self.set_page(self.total_pages())
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.total_pages()
    }

    /// Changes the page size. The page position always resets to 1.
    pub fn with_page_size(&self, page_size: usize) -> Result<PaginationState, GridError> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize(page_size));
        }
        Ok(PaginationState {
            current_page: 1,
            page_size,
            total_rows: self.total_rows,
        })
    }

    pub fn with_total_rows(&self, total_rows: usize) -> PaginationState {
        PaginationState { total_rows, ..*self }
    }
}

/// The current page's slice of `items`. A page past the end is empty.
pub fn paginate<'s, T>(items: &'s [T], state: &PaginationState) -> &'s [T] {
    let state = state.with_total_rows(items.len());
    &items[state.page_bounds()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(current_page: usize, page_size: usize, total_rows: usize) -> PaginationState {
        PaginationState {
            current_page,
            page_size,
            total_rows,
        }
    }

    #[test]
    fn test_second_page_of_hundred() {
        let items: Vec<usize> = (0..100).collect();
        let page = paginate(&items, &state(2, 10, 100));
        assert_eq!(page, &(10..20).collect::<Vec<_>>()[..]);
        assert_eq!(state(2, 10, 100).row_range(), (11, 20));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(state(1, 10, 0).total_pages(), 0);
        assert_eq!(state(1, 10, 10).total_pages(), 1);
        assert_eq!(state(1, 10, 11).total_pages(), 2);
        assert_eq!(state(1, 25, 1000).total_pages(), 40);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<usize> = (0..23).collect();
        let s = state(3, 10, 23);
        assert_eq!(paginate(&items, &s), &[20, 21, 22]);
        assert_eq!(s.row_range(), (21, 23));
        assert!(s.is_last_page());
    }

    #[test]
    fn test_pages_cover_sequence_once() {
        let items: Vec<usize> = (0..37).collect();
        for page_size in 1..=40 {
            let first = state(1, page_size, items.len());
            let mut joined = Vec::new();
            for page in 1..=first.total_pages() {
                let s = state(page, page_size, items.len());
                joined.extend_from_slice(paginate(&items, &s));
            }
            assert_eq!(joined, items, "page size {}", page_size);
        }
    }

    #[test]
    fn test_out_of_range_page_changes_are_ignored() {
        let s = state(2, 10, 30);
        assert_eq!(s.set_page(0), None);
        assert_eq!(s.set_page(4), None);
        assert_eq!(s.set_page(2), None);
        assert_eq!(s.set_page(3), Some(state(3, 10, 30)));
    }

    #[test]
    fn test_navigation_helpers() {
        let s = state(1, 10, 30);
        assert!(s.is_first_page());
        assert!(!state(2, 10, 30).is_first_page());
        assert_eq!(s.previous(), None);
        assert_eq!(s.first(), None);
        assert_eq!(s.next().map(|n| n.current_page), Some(2));
        assert_eq!(s.last().map(|n| n.current_page), Some(3));
        assert_eq!(state(3, 10, 30).next(), None);
        assert_eq!(state(3, 10, 30).previous().map(|n| n.current_page), Some(2));
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let s = state(3, 10, 100).with_page_size(50).unwrap();
        assert_eq!(s, state(1, 50, 100));
        assert!(matches!(s.with_page_size(0), Err(GridError::InvalidPageSize(0))));
    }

    #[test]
    fn test_huge_page_number_saturates() {
        let s = state(usize::MAX, 10, 30);
        assert_eq!(s.row_range(), (usize::MAX, 30));
        assert_eq!(s.page_bounds(), 30..30);
        assert_eq!(s.next(), None);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = [1, 2, 3];
        assert!(paginate(&items, &state(5, 10, 3)).is_empty());
        assert_eq!(state(1, 10, 0).row_range(), (0, 0));
    }
}
