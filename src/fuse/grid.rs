//! Table grid assembly.
//!
//! Table extraction produces a sparse list of spanning cells; downstream
//! consumers need a dense rectangular grid. This module span-fills every
//! covered position, resolves overlapping cells deterministically, and
//! classifies header rows.

use crate::error::{Error, Result};
use crate::model::{Grid, GridCell, TableCell};

/// Assemble a dense rectangular grid from sparse spanning cells.
///
/// Grid dimensions are `max(end_row) x max(end_col)` over all cells; every
/// position starts empty and non-header, and each input cell writes into
/// every position its span covers. Overlapping cells are defined behavior
/// (upstream extraction legitimately produces redundant spans): the cell
/// processed last wins, with one asymmetry — a blank cell never erases
/// text a previous cell already wrote.
///
/// Errors: [`Error::EmptyTable`] for an empty cell list,
/// [`Error::InvalidCell`] when a cell violates the end-exclusive span
/// invariant.
pub fn assemble(cells: &[TableCell]) -> Result<Grid> {
    if cells.is_empty() {
        return Err(Error::EmptyTable);
    }

    let mut num_rows = 0;
    let mut num_cols = 0;
    for cell in cells {
        if !cell.is_valid() {
            return Err(Error::InvalidCell {
                start_row: cell.start_row,
                end_row: cell.end_row,
                start_col: cell.start_col,
                end_col: cell.end_col,
            });
        }
        num_rows = num_rows.max(cell.end_row);
        num_cols = num_cols.max(cell.end_col);
    }

    let mut grid = vec![vec![GridCell::default(); num_cols]; num_rows];

    for cell in cells {
        let blank = cell.is_blank();
        for row in grid.iter_mut().take(cell.end_row).skip(cell.start_row) {
            for position in row.iter_mut().take(cell.end_col).skip(cell.start_col) {
                // Later wins, except blank text never erases real text.
                if blank && !position.is_empty() {
                    continue;
                }
                position.text = cell.text.clone();
                position.is_header = cell.is_header;
            }
        }
    }

    let header_rows = classify_header_rows(cells, num_rows);
    log::debug!(
        "assembled {}x{} grid from {} cells, {} header row(s)",
        num_rows,
        num_cols,
        cells.len(),
        header_rows.iter().filter(|&&h| h).count()
    );

    Ok(Grid {
        num_rows,
        num_cols,
        grid,
        header_rows,
    })
}

/// A row is a header row when every cell anchored in it (span starting on
/// that row) carries the header flag. Rows covered only through row-span
/// fill, and rows with no cells at all, are data rows.
fn classify_header_rows(cells: &[TableCell], num_rows: usize) -> Vec<bool> {
    let mut any_anchor = vec![false; num_rows];
    let mut all_header = vec![true; num_rows];

    for cell in cells {
        if cell.start_row < num_rows {
            any_anchor[cell.start_row] = true;
            all_header[cell.start_row] &= cell.is_header;
        }
    }

    (0..num_rows)
        .map(|row| any_anchor[row] && all_header[row])
        .collect()
}
