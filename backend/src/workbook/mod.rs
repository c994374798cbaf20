//! In-memory workbook model.
//!
//! A [`Workbook`] is an ordered list of uniquely named [`Worksheet`]s. Each
//! worksheet is a sparse map from 1-based `(row, column)` coordinates to
//! [`Cell`]s, plus column widths and a frozen-pane split.
//!
//! The container format lives in [`reader`] (load via calamine) and
//! [`writer`] (save via rust_xlsxwriter); nothing here knows about XLSX.

pub mod reader;
pub mod writer;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::CellValue;

pub use reader::load_from_bytes;
pub use writer::save_to_buffer;

/// Bright green fill used for the header formula cells.
pub const FILL_LIME: u32 = 0x00FF00;

/// Yellow fill used for the DESCRIPTION / TOTAL headers.
pub const FILL_YELLOW: u32 = 0xFFFF00;

// =============================================================================
// Cells
// =============================================================================

/// What a cell holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// A literal value.
    Value(CellValue),
    /// A formula, stored without the leading `=`.
    Formula(String),
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Cosmetic cell style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub font_name: Option<String>,
    pub align: Option<HAlign>,
    pub valign: Option<VAlign>,
    /// Solid fill as `0xRRGGBB`.
    pub fill: Option<u32>,
}

impl CellStyle {
    /// Bold Calibri, the font every styled cell of a summary sheet uses.
    pub fn bold_calibri() -> Self {
        Self {
            bold: true,
            font_name: Some("Calibri".to_string()),
            ..Default::default()
        }
    }

    pub fn align(mut self, align: HAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = Some(valign);
        self
    }

    pub fn fill(mut self, rgb: u32) -> Self {
        self.fill = Some(rgb);
        self
    }
}

/// A worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    pub style: Option<CellStyle>,
}

impl Cell {
    /// Whether the cell holds a formula or a non-blank value.
    pub fn is_occupied(&self) -> bool {
        match &self.content {
            CellContent::Formula(_) => true,
            CellContent::Value(v) => !v.is_blank(),
        }
    }

    pub fn value(&self) -> Option<&CellValue> {
        match &self.content {
            CellContent::Value(v) => Some(v),
            CellContent::Formula(_) => None,
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match &self.content {
            CellContent::Formula(f) => Some(f),
            CellContent::Value(_) => None,
        }
    }
}

// =============================================================================
// Worksheet
// =============================================================================

/// A named 2-D cell space addressed by 1-based `(row, column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    column_widths: BTreeMap<u32, f64>,
    frozen: Option<(u32, u32)>,
    max_row: u32,
    max_col: u32,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            column_widths: BTreeMap::new(),
            frozen: None,
            max_row: 0,
            max_col: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a value, keeping any style already on the cell.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.set_content(row, col, CellContent::Value(value.into()));
    }

    /// Write a formula (without leading `=`), keeping any existing style.
    pub fn set_formula(&mut self, row: u32, col: u32, formula: impl Into<String>) {
        self.set_content(row, col, CellContent::Formula(formula.into()));
    }

    fn set_content(&mut self, row: u32, col: u32, content: CellContent) {
        self.touch(row, col);
        match self.cells.entry((row, col)) {
            Entry::Occupied(mut entry) => entry.get_mut().content = content,
            Entry::Vacant(entry) => {
                entry.insert(Cell { content, style: None });
            }
        }
    }

    /// Replace the style of a cell, creating an empty cell if needed.
    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.touch(row, col);
        self.cells
            .entry((row, col))
            .or_insert(Cell {
                content: CellContent::Value(CellValue::Empty),
                style: None,
            })
            .style = Some(style);
    }

    fn touch(&mut self, row: u32, col: u32) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Literal value at a coordinate (`None` for formulas and missing cells).
    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cell(row, col).and_then(Cell::value)
    }

    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.cell(row, col).and_then(Cell::formula)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }

    /// Highest row index holding any cell (0 when empty).
    pub fn row_count(&self) -> u32 {
        self.max_row
    }

    /// Highest column index holding any cell (0 when empty).
    pub fn column_count(&self) -> u32 {
        self.max_col
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (&u32, &f64)> {
        self.column_widths.iter()
    }

    /// Freeze the top `rows` rows and the left `cols` columns.
    pub fn freeze(&mut self, rows: u32, cols: u32) {
        self.frozen = Some((rows, cols));
    }

    pub fn frozen(&self) -> Option<(u32, u32)> {
        self.frozen
    }
}

// =============================================================================
// Workbook
// =============================================================================

/// Ordered collection of uniquely named worksheets.
///
/// Names are compared case-insensitively, the same way spreadsheet
/// applications do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Worksheet] {
        &mut self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.to_lowercase() == name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&Worksheet> {
        self.position(name).map(|i| &self.sheets[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.position(name).map(move |i| &mut self.sheets[i])
    }

    /// Resolve a sheet by name, appending a new one if it does not exist.
    ///
    /// Returns the sheet and whether it was created. An empty name gets a
    /// generated `SheetN` name.
    pub fn get_or_add(&mut self, name: &str) -> (&mut Worksheet, bool) {
        if !name.is_empty() {
            if let Some(idx) = self.position(name) {
                return (&mut self.sheets[idx], false);
            }
        }

        let name = if name.is_empty() {
            self.generated_name()
        } else {
            name.to_string()
        };
        self.sheets.push(Worksheet::new(name));
        let idx = self.sheets.len() - 1;
        (&mut self.sheets[idx], true)
    }

    fn generated_name(&self) -> String {
        (self.sheets.len() + 1..)
            .map(|n| format!("Sheet{}", n))
            .find(|candidate| self.position(candidate).is_none())
            .unwrap_or_else(|| "Sheet".to_string())
    }
}

/// Column letter for a 1-based column index (1 = A, 27 = AA).
pub fn column_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}
