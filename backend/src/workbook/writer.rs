//! Serialise the in-memory workbook to XLSX bytes with rust_xlsxwriter.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook as XlsxWorkbook, Worksheet as XlsxWorksheet};

use super::{Cell, CellContent, CellStyle, HAlign, VAlign, Workbook};
use crate::error::{WorkbookError, WorkbookResult};
use crate::models::CellValue;

/// Last addressable row of an XLSX worksheet (1-based).
pub const MAX_ROWS: u32 = 1_048_576;

/// Last addressable column of an XLSX worksheet (1-based).
pub const MAX_COLUMNS: u32 = 16_384;

/// Serialise every sheet, cell, style, column width and frozen pane.
///
/// Any writer error aborts the whole save.
pub fn save_to_buffer(workbook: &Workbook) -> WorkbookResult<Vec<u8>> {
    let mut xlsx = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (&(row, col), cell) in sheet.cells() {
            write_cell(worksheet, row, col, cell)?;
        }

        for (&col, &width) in sheet.column_widths() {
            let (_, col16) = to_xlsx_coords(1, col)?;
            worksheet.set_column_width(col16, width)?;
        }

        // Freeze split is the first unfrozen cell, which is (rows, cols) 0-based
        if let Some((rows, cols)) = sheet.frozen() {
            if rows >= MAX_ROWS || cols >= MAX_COLUMNS {
                return Err(WorkbookError::OutOfRange { row: rows, col: cols });
            }
            worksheet.set_freeze_panes(rows, cols as u16)?;
        }
    }

    Ok(xlsx.save_to_buffer()?)
}

/// 1-based model coordinates to 0-based XLSX coordinates.
fn to_xlsx_coords(row: u32, col: u32) -> WorkbookResult<(u32, u16)> {
    if row == 0 || row > MAX_ROWS || col == 0 || col > MAX_COLUMNS {
        return Err(WorkbookError::OutOfRange { row, col });
    }
    Ok((row - 1, (col - 1) as u16))
}

fn write_cell(worksheet: &mut XlsxWorksheet, row: u32, col: u32, cell: &Cell) -> WorkbookResult<()> {
    let (row0, col0) = to_xlsx_coords(row, col)?;
    let format = cell.style.as_ref().map(build_format).unwrap_or_else(Format::new);

    match &cell.content {
        CellContent::Formula(formula) => {
            worksheet.write_formula_with_format(row0, col0, formula.as_str(), &format)?;
        }
        CellContent::Value(CellValue::Number(n)) => {
            worksheet.write_number_with_format(row0, col0, *n, &format)?;
        }
        CellContent::Value(CellValue::Text(s)) if !s.is_empty() => {
            worksheet.write_string_with_format(row0, col0, s, &format)?;
        }
        CellContent::Value(_) => {
            // Blank cells only matter when they carry a style
            if cell.style.is_some() {
                worksheet.write_blank(row0, col0, &format)?;
            }
        }
    }

    Ok(())
}

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }

    if let Some(ref name) = style.font_name {
        format = format.set_font_name(name);
    }

    format = match style.align {
        None => format,
        Some(HAlign::Left) => format.set_align(FormatAlign::Left),
        Some(HAlign::Center) => format.set_align(FormatAlign::Center),
        Some(HAlign::Right) => format.set_align(FormatAlign::Right),
    };

    format = match style.valign {
        None => format,
        Some(VAlign::Top) => format.set_align(FormatAlign::Top),
        Some(VAlign::Middle) => format.set_align(FormatAlign::VerticalCenter),
        Some(VAlign::Bottom) => format.set_align(FormatAlign::Bottom),
    };

    if let Some(rgb) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(rgb));
    }

    format
}
