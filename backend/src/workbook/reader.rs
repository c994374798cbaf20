//! Load a workbook container (xlsx, xls, xlsb, ods) with calamine.
//!
//! Only cell values and formulas are read. calamine does not expose
//! styles, column widths or frozen panes, so a loaded workbook starts
//! without them.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use super::Workbook;
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::CellValue;

/// Parse workbook bytes into the in-memory model.
///
/// Fails on anything that is not a readable workbook; no fallback sheet is
/// created.
pub fn load_from_bytes(bytes: &[u8]) -> WorkbookResult<Workbook> {
    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_names: Vec<String> = source.sheet_names().to_vec();

    let mut workbook = Workbook::new();

    for sheet_name in &sheet_names {
        let range = source
            .worksheet_range(sheet_name)
            .map_err(|e| WorkbookError::ReadSheet {
                sheet: sheet_name.clone(),
                message: e.to_string(),
            })?;

        let (sheet, _) = workbook.get_or_add(sheet_name);

        // Ranges start at the first used cell, not necessarily A1
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (r, c, data) in range.cells() {
            if let Some(value) = data_to_value(data) {
                sheet.set_value(start_row + r as u32 + 1, start_col + c as u32 + 1, value);
            }
        }

        // Formulas replace the cached values read above
        if let Ok(formulas) = source.worksheet_formula(sheet_name) {
            let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
            for (r, c, formula) in formulas.cells() {
                if !formula.is_empty() {
                    let formula = formula.strip_prefix('=').unwrap_or(formula);
                    sheet.set_formula(start_row + r as u32 + 1, start_col + c as u32 + 1, formula);
                }
            }
        }
    }

    Ok(workbook)
}

fn data_to_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(n) => Some(CellValue::Number(*n)),
        Data::Int(n) => Some(CellValue::Number(*n as f64)),
        Data::Bool(b) => Some(CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string())),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{save_to_buffer, Workbook};

    #[test]
    fn test_garbage_bytes_fail() {
        let result = load_from_bytes(b"definitely not a spreadsheet");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_bytes_fail() {
        assert!(load_from_bytes(&[]).is_err());
    }

    #[test]
    fn test_values_and_formulas_round_trip() {
        let mut wb = Workbook::new();
        let (sheet, _) = wb.get_or_add("2024-01-15");
        sheet.set_value(1, 1, "TRN_DATE");
        sheet.set_value(2, 1, "A");
        sheet.set_value(2, 2, 10.5);
        sheet.set_value(2, 3, 2.0);
        sheet.set_formula(2, 5, "SUM(A2:C2)");
        wb.get_or_add("Other").0.set_value(4, 4, "x");

        let bytes = save_to_buffer(&wb).unwrap();
        let loaded = load_from_bytes(&bytes).unwrap();

        assert_eq!(loaded.sheet_names(), vec!["2024-01-15", "Other"]);
        let sheet = loaded.get("2024-01-15").unwrap();
        assert_eq!(sheet.value(1, 1), Some(&CellValue::Text("TRN_DATE".into())));
        assert_eq!(sheet.value(2, 2), Some(&CellValue::Number(10.5)));
        assert_eq!(sheet.value(2, 3), Some(&CellValue::Number(2.0)));
        assert_eq!(sheet.formula(2, 5), Some("SUM(A2:C2)"));
        assert_eq!(loaded.get("Other").unwrap().value(4, 4), Some(&CellValue::Text("x".into())));
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(data_to_value(&Data::Empty), None);
        assert_eq!(data_to_value(&Data::String(String::new())), None);
        assert_eq!(data_to_value(&Data::Int(3)), Some(CellValue::Number(3.0)));
        assert_eq!(data_to_value(&Data::Bool(true)), Some(CellValue::Text("TRUE".into())));
    }
}
