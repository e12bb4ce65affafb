//! Error types for the docfuse library.

use std::io;
use thiserror::Error;

use crate::fallback::ToolError;

/// Result type alias for docfuse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error parsing a persisted extraction document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table grid was requested from an empty cell list.
    #[error("Cannot assemble a grid from an empty cell list")]
    EmptyTable,

    /// Style attachment was requested with no spans at all.
    #[error("Cannot attach styles from an empty span set")]
    EmptySpanSet,

    /// A table cell violates the end-exclusive span invariant.
    #[error("Invalid table cell: rows {start_row}..{end_row}, cols {start_col}..{end_col}")]
    InvalidCell {
        /// First row covered by the cell.
        start_row: usize,
        /// One past the last row covered.
        end_row: usize,
        /// First column covered by the cell.
        start_col: usize,
        /// One past the last column covered.
        end_col: usize,
    },

    /// An external tool invocation failed.
    #[error("External tool error: {0}")]
    Tool(#[from] ToolError),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
