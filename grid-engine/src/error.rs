//! FILENAME: grid-engine/src/error.rs

use thiserror::Error;

/// Configuration failures. Evaluating the pipeline itself never fails:
/// unknown operators pass, and out-of-range navigation is ignored.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(usize),

    #[error("Page size {0} is not one of the offered page sizes")]
    PageSizeNotOffered(usize),

    #[error("Invalid row height: {0} (must be a positive, finite number)")]
    InvalidRowHeight(f64),

    #[error("Invalid viewport size: {height}x{width}")]
    InvalidViewport { height: f64, width: f64 },

    #[error("Invalid grid options: {0}")]
    Json(#[from] serde_json::Error),
}
