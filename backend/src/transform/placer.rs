//! Grid placement into worksheets.
//!
//! Two placement modes:
//!
//! - **append**: the grid is added below whatever the sheet already holds,
//!   so on a fresh sheet its first cell lands on A1
//! - **block**: the grid's first cell lands on a caller-supplied anchor,
//!   typically row 3 and two columns past the last occupied column
//!
//! Writes never check for collisions; the last write to a cell wins.

use crate::models::Grid;
use crate::workbook::Worksheet;

/// Which rows count when looking for the last occupied column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnScan {
    /// Only rows below the header row.
    #[default]
    BelowHeader,
    /// Every row, header included.
    IncludeHeader,
}

/// Top-left worksheet cell a grid is written to (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub row: u32,
    pub col: u32,
}

impl Anchor {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Highest column holding a non-blank value or formula.
///
/// Returns 1 for a sheet with nothing in the scanned rows. The whole sheet
/// is rescanned on every call.
pub fn last_used_column(sheet: &Worksheet, scan: ColumnScan) -> u32 {
    let first_row = match scan {
        ColumnScan::BelowHeader => 2,
        ColumnScan::IncludeHeader => 1,
    };

    sheet
        .cells()
        .filter(|(coord, cell)| coord.0 >= first_row && cell.is_occupied())
        .map(|(coord, _)| coord.1)
        .max()
        .unwrap_or(1)
}

/// Anchor for a block merged after the existing content.
///
/// Leaves exactly one blank separator column.
pub fn anchor_after_last_column(sheet: &Worksheet, scan: ColumnScan, row: u32) -> Anchor {
    Anchor::new(row, last_used_column(sheet, scan) + 2)
}

/// Write a grid with its first cell at `anchor`.
pub fn place_grid(sheet: &mut Worksheet, grid: &Grid, anchor: Anchor) {
    for (r, row) in grid.rows().iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.set_value(anchor.row + r as u32, anchor.col + c as u32, value.clone());
        }
    }
}

/// Append a grid below the sheet's last row, starting in column A.
///
/// Returns the anchor used.
pub fn append_grid(sheet: &mut Worksheet, grid: &Grid) -> Anchor {
    let anchor = Anchor::new(sheet.row_count() + 1, 1);
    place_grid(sheet, grid, anchor);
    anchor
}
