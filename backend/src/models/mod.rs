//! Domain models shared by the pipeline stages.
//!
//! - [`CellValue`] - a typed value parsed from one delimited field
//! - [`Grid`] - rows of cell values parsed from one input file
//! - [`SourceFile`] - raw bytes of an input file plus its name
//! - [`KeyedGrid`] - a grid together with the sheet key it belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Cell Values
// =============================================================================

/// A single cell value.
///
/// Serialises untagged: numbers as JSON numbers, text as strings and
/// `Empty` as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value.
    Number(f64),
    /// Text value, verbatim after trimming (may be the empty string).
    Text(String),
    /// No value.
    Empty,
}

impl CellValue {
    /// Whether this value counts as "occupied" for column scans.
    ///
    /// Empty text is treated the same as no value.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Text content if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

// =============================================================================
// Grid
// =============================================================================

/// Parsed rows of one input file.
///
/// Rows may have different lengths. A grid is never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the longest row (0 for an empty grid).
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Value at 0-based (row, column), if present.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// An input file as handed over by the host (browser upload or disk read).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Original file name, including extension.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A parsed grid assigned to a worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedGrid {
    /// Sanitised sheet key.
    pub sheet_key: String,
    /// Key text before sanitising, used for date ordering.
    pub date_key: String,
    /// Name of the file the grid came from.
    pub source: String,
    /// Parsed content.
    pub grid: Grid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grid_width_uses_longest_row() {
        let grid = Grid::new(vec![
            vec!["a".into()],
            vec!["b".into(), 1.0.into(), 2.0.into()],
        ]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(Grid::default().width(), 0);
    }

    #[test]
    fn test_blank_values() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(!CellValue::Text("x".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_number_display_drops_trailing_zero() {
        assert_eq!(CellValue::Number(20240115.0).to_string(), "20240115");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_grid_serializes_as_nested_arrays() {
        let grid = Grid::new(vec![vec!["A".into(), 1.0.into(), CellValue::Empty]]);
        let value = serde_json::to_value(&grid).unwrap();
        assert_eq!(value, json!([["A", 1.0, null]]));
    }
}
