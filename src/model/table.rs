//! Table types: sparse spanning cells and the dense assembled grid.

use serde::{Deserialize, Serialize};

/// A sparse table cell, possibly spanning multiple rows and columns.
///
/// Row and column ends are exclusive: a plain cell at `(r, c)` has
/// `end_row = r + 1` and `end_col = c + 1`. Cells from upstream extraction
/// may overlap; that is defined behavior for the assembler, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// First row covered
    pub start_row: usize,
    /// First column covered
    pub start_col: usize,
    /// One past the last row covered
    pub end_row: usize,
    /// One past the last column covered
    pub end_col: usize,
    /// Cell text content
    pub text: String,
    /// Header flag as reported by the extractor
    pub is_header: bool,
}

impl TableCell {
    /// Create a single-position cell.
    pub fn new(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row + 1,
            end_col: col + 1,
            text: text.into(),
            is_header: false,
        }
    }

    /// Create a spanning cell.
    pub fn spanning(
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
            text: text.into(),
            is_header: false,
        }
    }

    /// Mark the cell as a header cell and return self.
    pub fn header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Check the end-exclusive span invariant.
    pub fn is_valid(&self) -> bool {
        self.end_row > self.start_row && self.end_col > self.start_col
    }

    /// Check if the cell text is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if the cell spans more than one grid position.
    pub fn is_merged(&self) -> bool {
        self.end_row - self.start_row > 1 || self.end_col - self.start_col > 1
    }
}

/// One position in an assembled grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell text (empty when nothing was written)
    pub text: String,
    /// Header flag inherited from the covering cell
    pub is_header: bool,
}

impl GridCell {
    /// Check if nothing was written to this position.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A dense rectangular table grid.
///
/// Immutable after construction by [`crate::fuse::grid::assemble`]; every
/// row has exactly `num_cols` entries. Serializes as
/// `{num_rows, num_cols, grid: [[{text, is_header}]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Row-major cell storage
    pub grid: Vec<Vec<GridCell>>,
    /// Per-row header classification, derived at assembly time.
    #[serde(skip)]
    pub(crate) header_rows: Vec<bool>,
}

impl Grid {
    /// Get a cell by position, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// Whether the given row was classified as a header row.
    ///
    /// A row is a header row if every cell anchored in it (a cell whose
    /// span starts on that row) carried the header flag; rows reached only
    /// through row-span fill are data rows. Out-of-range rows are not
    /// headers.
    pub fn is_header_row(&self, row: usize) -> bool {
        self.header_rows.get(row).copied().unwrap_or(false)
    }

    /// Number of leading header rows.
    pub fn header_row_count(&self) -> usize {
        self.header_rows.iter().take_while(|&&h| h).count()
    }

    /// Plain text rendering, tab-separated cells and newline-separated rows.
    pub fn plain_text(&self) -> String {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
