//! Summary columns overlaid on a data sheet.
//!
//! For a sheet whose data occupies columns `1..=D`:
//!
//! ```text
//!  row 1   | B..: net sales formula (lime) | D+2: DESCRIPTION | D+3: TOTAL |
//!  row 9   |                               | GROSS_SLS        | SUM(A9:?9) |
//!  ...     |                               | ...              | ...        |
//!  row 68  |                               | LDISC            | SUM(A68:?68)
//! ```
//!
//! Column `D+1` stays blank as a separator, and `D+4` separates the summary
//! from any EOD block placed at `D+5`.

use super::catalog::{catalog_rows, net_sales_formula, row_sum_formula, CATALOG_END_ROW, CATALOG_START_ROW};
use crate::workbook::{column_letter, CellStyle, HAlign, VAlign, Worksheet, FILL_LIME, FILL_YELLOW};

/// Header text of the label column.
pub const DESCRIPTION_HEADER: &str = "DESCRIPTION";

/// Header text of the row total column.
pub const TOTAL_HEADER: &str = "TOTAL";

/// Which rows receive a row total formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalRows {
    /// From the first catalog row through the sheet's last row.
    ThroughLastRow,
    /// From the first catalog row through a fixed row.
    Fixed(u32),
}

impl TotalRows {
    /// Totals on exactly the catalog rows.
    pub fn catalog() -> Self {
        Self::Fixed(CATALOG_END_ROW)
    }
}

/// Parameters of one summary overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPlan {
    /// D: last data column, at least 1.
    pub data_columns: u32,
    /// Header formulas are written on columns `2..=formula_columns`.
    pub formula_columns: u32,
    pub total_rows: TotalRows,
}

impl SummaryPlan {
    pub fn new(data_columns: u32) -> Self {
        let data_columns = data_columns.max(1);
        Self {
            data_columns,
            formula_columns: data_columns,
            total_rows: TotalRows::ThroughLastRow,
        }
    }

    pub fn formula_columns(mut self, columns: u32) -> Self {
        self.formula_columns = columns;
        self
    }

    pub fn total_rows(mut self, rows: TotalRows) -> Self {
        self.total_rows = rows;
        self
    }

    pub fn description_column(&self) -> u32 {
        self.data_columns + 2
    }

    pub fn total_column(&self) -> u32 {
        self.data_columns + 3
    }

    /// First column after the summary and its trailing separator.
    pub fn next_free_column(&self) -> u32 {
        self.data_columns + 5
    }
}

/// Where a summary overlay ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPlacement {
    pub description_column: u32,
    pub total_column: u32,
    pub last_total_row: u32,
    pub next_free_column: u32,
}

/// Write header formulas, catalog labels and row totals onto a sheet.
///
/// Existing cells at those coordinates are overwritten.
pub fn apply_summary(sheet: &mut Worksheet, plan: &SummaryPlan) -> SummaryPlacement {
    let header_style = CellStyle::bold_calibri()
        .align(HAlign::Center)
        .valign(VAlign::Middle)
        .fill(FILL_LIME);
    for col in 2..=plan.formula_columns {
        sheet.set_formula(1, col, net_sales_formula(&column_letter(col)));
        sheet.set_style(1, col, header_style.clone());
    }

    let description_col = plan.description_column();
    let total_col = plan.total_column();
    let title_style = CellStyle::bold_calibri()
        .align(HAlign::Center)
        .valign(VAlign::Middle)
        .fill(FILL_YELLOW);
    sheet.set_value(1, description_col, DESCRIPTION_HEADER);
    sheet.set_style(1, description_col, title_style.clone());
    sheet.set_value(1, total_col, TOTAL_HEADER);
    sheet.set_style(1, total_col, title_style);

    let label_style = CellStyle::bold_calibri().align(HAlign::Left).valign(VAlign::Middle);
    for (row, label) in catalog_rows() {
        sheet.set_value(row, description_col, label);
        sheet.set_style(row, description_col, label_style.clone());
    }

    // Resolved after the labels so a short sheet still totals every label row
    let last_total_row = match plan.total_rows {
        TotalRows::ThroughLastRow => sheet.row_count(),
        TotalRows::Fixed(row) => row,
    };
    let last_letter = column_letter(plan.data_columns);
    let total_style = CellStyle::bold_calibri().align(HAlign::Center).valign(VAlign::Middle);
    for row in CATALOG_START_ROW..=last_total_row {
        sheet.set_formula(row, total_col, row_sum_formula(&last_letter, row));
        sheet.set_style(row, total_col, total_style.clone());
    }

    SummaryPlacement {
        description_column: description_col,
        total_column: total_col,
        last_total_row,
        next_free_column: plan.next_free_column(),
    }
}

/// Bold, left-aligned first column for freshly converted data.
pub fn style_first_column(sheet: &mut Worksheet) {
    let rows: Vec<u32> = sheet
        .cells()
        .filter(|(coord, cell)| coord.1 == 1 && cell.is_occupied())
        .map(|(coord, _)| coord.0)
        .collect();

    let style = CellStyle::bold_calibri().align(HAlign::Left).valign(VAlign::Middle);
    for row in rows {
        sheet.set_style(row, 1, style.clone());
    }
}

/// Set the width of columns `1..=last_column`.
pub fn set_column_widths(sheet: &mut Worksheet, last_column: u32, width: f64) {
    for col in 1..=last_column {
        sheet.set_column_width(col, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::transform::catalog::SUMMARY_LABELS;

    fn data_sheet(rows: u32, cols: u32) -> Worksheet {
        let mut sheet = Worksheet::new("data");
        for row in 1..=rows {
            for col in 1..=cols {
                sheet.set_value(row, col, (row * col) as f64);
            }
        }
        sheet
    }

    #[test]
    fn test_catalog_written_in_order() {
        let mut sheet = data_sheet(3, 4);
        let placement = apply_summary(&mut sheet, &SummaryPlan::new(4));

        assert_eq!(placement.description_column, 6);
        assert_eq!(sheet.value(1, 6), Some(&CellValue::Text("DESCRIPTION".into())));
        for (i, label) in SUMMARY_LABELS.iter().enumerate() {
            let row = CATALOG_START_ROW + i as u32;
            assert_eq!(sheet.value(row, 6), Some(&CellValue::Text(label.to_string())));
        }
        assert_eq!(sheet.value(9, 6), Some(&CellValue::Text("GROSS_SLS".into())));
    }

    #[test]
    fn test_header_formulas_and_totals() {
        let mut sheet = data_sheet(2, 3);
        let placement = apply_summary(&mut sheet, &SummaryPlan::new(3));

        assert_eq!(sheet.formula(1, 1), None);
        assert_eq!(
            sheet.formula(1, 2),
            Some("B46+B45+B44+B43+B42+B41+B31+B30+B29+B28+B27+B26+B25+B22+B21+B20+B19+B18+B17+B16+B14-B9-B58")
        );
        assert!(sheet.formula(1, 3).unwrap().starts_with("C46+"));
        assert_eq!(sheet.formula(1, 4), None);

        assert_eq!(placement.total_column, 6);
        assert_eq!(sheet.value(1, 6), Some(&CellValue::Text("TOTAL".into())));
        assert_eq!(sheet.formula(9, 6), Some("SUM(A9:C9)"));
        assert_eq!(sheet.formula(68, 6), Some("SUM(A68:C68)"));
        assert_eq!(placement.last_total_row, 68);
        assert_eq!(placement.next_free_column, 8);
    }

    #[test]
    fn test_header_cells_are_styled() {
        let mut sheet = data_sheet(1, 2);
        apply_summary(&mut sheet, &SummaryPlan::new(2));

        let header = sheet.cell(1, 2).unwrap().style.clone().unwrap();
        assert!(header.bold);
        assert_eq!(header.fill, Some(FILL_LIME));
        assert_eq!(header.align, Some(HAlign::Center));

        let title = sheet.cell(1, 4).unwrap().style.clone().unwrap();
        assert_eq!(title.fill, Some(FILL_YELLOW));
    }

    #[test]
    fn test_totals_extend_past_catalog_on_long_sheets() {
        let mut sheet = data_sheet(80, 2);
        let placement = apply_summary(&mut sheet, &SummaryPlan::new(2));

        assert_eq!(placement.last_total_row, 80);
        assert_eq!(sheet.formula(80, 5), Some("SUM(A80:B80)"));
    }

    #[test]
    fn test_fixed_totals_stop_at_catalog_end() {
        let mut sheet = data_sheet(80, 2);
        let plan = SummaryPlan::new(2).total_rows(TotalRows::catalog());
        apply_summary(&mut sheet, &plan);

        assert_eq!(sheet.formula(68, 5), Some("SUM(A68:B68)"));
        assert_eq!(sheet.formula(69, 5), None);
    }

    #[test]
    fn test_formula_span_can_exceed_data_columns() {
        let mut sheet = data_sheet(2, 3);
        apply_summary(&mut sheet, &SummaryPlan::new(2).formula_columns(3));

        assert!(sheet.formula(1, 3).unwrap().starts_with("C46+"));
        assert_eq!(sheet.value(1, 4), Some(&CellValue::Text("DESCRIPTION".into())));
    }

    #[test]
    fn test_single_column_sheet() {
        let mut sheet = Worksheet::new("empty");
        let placement = apply_summary(&mut sheet, &SummaryPlan::new(1));

        assert_eq!(sheet.formula(1, 2), None);
        assert_eq!(placement.description_column, 3);
        assert_eq!(placement.total_column, 4);
        assert_eq!(sheet.formula(9, 4), Some("SUM(A9:A9)"));
        assert_eq!(SummaryPlan::new(0).data_columns, 1);
    }

    #[test]
    fn test_style_first_column() {
        let mut sheet = data_sheet(3, 2);
        sheet.set_value(4, 1, "");
        style_first_column(&mut sheet);

        assert!(sheet.cell(1, 1).unwrap().style.as_ref().unwrap().bold);
        assert!(sheet.cell(3, 1).unwrap().style.is_some());
        assert!(sheet.cell(1, 2).unwrap().style.is_none());
        assert!(sheet.cell(4, 1).unwrap().style.is_none());
    }

    #[test]
    fn test_set_column_widths() {
        let mut sheet = Worksheet::new("s");
        set_column_widths(&mut sheet, 35, 15.0);
        assert_eq!(sheet.column_width(1), Some(15.0));
        assert_eq!(sheet.column_width(35), Some(15.0));
        assert_eq!(sheet.column_width(36), None);
    }
}
