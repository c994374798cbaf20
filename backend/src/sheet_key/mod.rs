//! Sheet key derivation.
//!
//! Every parsed grid is assigned to a worksheet. The key comes from the
//! grid's `TRN_DATE` marker row when there is one, otherwise from the file
//! name without its extension. Keys are always sanitised to be valid sheet
//! names before use.
//!
//! Primary grids are ordered by interpreting their keys as dates, see
//! [`sort_by_sheet_date`].

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use crate::models::{CellValue, Grid, KeyedGrid};

/// Literal marking the row that carries the transaction date.
pub const TRN_DATE_MARKER: &str = "TRN_DATE";

/// Maximum length of a worksheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;

static FORBIDDEN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:\\/?*\[\]]").unwrap());
static FILE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Strip characters that worksheet names cannot contain and truncate to
/// [`MAX_SHEET_NAME_LEN`] characters.
///
/// Idempotent: sanitising a sanitised name returns it unchanged.
pub fn sanitize_sheet_name(name: &str) -> String {
    FORBIDDEN_CHARS
        .replace_all(name, "")
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// Fallback key: the file name with its last extension removed.
pub fn fallback_sheet_name(file_name: &str) -> String {
    FILE_EXTENSION.replace(file_name, "").into_owned()
}

/// Value of the first `TRN_DATE` marker row, converted to text.
///
/// A marker row needs the literal `TRN_DATE` in its first column and a
/// non-empty second column. Later marker rows are ignored.
pub fn extract_trn_date(grid: &Grid) -> Option<String> {
    grid.rows().iter().find_map(|row| match (row.first(), row.get(1)) {
        (Some(CellValue::Text(marker)), Some(value))
            if marker == TRN_DATE_MARKER && !value.is_blank() =>
        {
            Some(value.to_string())
        }
        _ => None,
    })
}

/// Unsanitised key text: the `TRN_DATE` value or the file-name fallback.
///
/// Date ordering works on this text, since sanitising drops the `/` and `:`
/// separators that dates and times are written with.
pub fn raw_sheet_key(grid: &Grid, file_name: &str) -> String {
    extract_trn_date(grid).unwrap_or_else(|| fallback_sheet_name(file_name))
}

/// Sanitised sheet key for a grid parsed from `file_name`.
pub fn sheet_key_for(grid: &Grid, file_name: &str) -> String {
    sanitize_sheet_name(&raw_sheet_key(grid, file_name))
}

// =============================================================================
// Date ordering
// =============================================================================

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
];

/// Interpret a sheet key as a calendar date (with optional time).
pub fn parse_key_date(key: &str) -> Option<NaiveDateTime> {
    let key = key.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(key, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(key, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Order keys by date: dated keys ascending, undated keys after them.
pub fn compare_sheet_dates(a: &str, b: &str) -> Ordering {
    match (parse_key_date(a), parse_key_date(b)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort primary grids by their unsanitised date keys.
///
/// The sort is stable: grids with equal dates, and grids whose keys are not
/// dates, keep their input order. Undated grids go last.
pub fn sort_by_sheet_date(grids: &mut [KeyedGrid]) {
    grids.sort_by(|a, b| compare_sheet_dates(&a.date_key, &b.date_key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rows;

    fn keyed(key: &str) -> KeyedGrid {
        KeyedGrid {
            sheet_key: sanitize_sheet_name(key),
            date_key: key.to_string(),
            source: format!("{key}.csv"),
            grid: Grid::default(),
        }
    }

    #[test]
    fn test_sanitize_strips_forbidden_chars() {
        assert_eq!(sanitize_sheet_name("a:b\\c/d?e*f[g]h"), "abcdefgh");
        assert_eq!(sanitize_sheet_name("01/15/2024"), "01152024");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), 31);

        // Truncation happens after stripping
        let name = format!("[[{}]]", "y".repeat(31));
        assert_eq!(sanitize_sheet_name(&name), "y".repeat(31));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let accented = "é".repeat(40);
        for name in ["2024-01-15", "a:b/c", accented.as_str(), "", "[]"] {
            let once = sanitize_sheet_name(name);
            assert_eq!(sanitize_sheet_name(&once), once);
            assert!(once.chars().count() <= MAX_SHEET_NAME_LEN);
            assert!(!once.contains([':', '\\', '/', '?', '*', '[', ']']));
        }
    }

    #[test]
    fn test_fallback_strips_last_extension() {
        assert_eq!(fallback_sheet_name("store01.csv"), "store01");
        assert_eq!(fallback_sheet_name("eod.2024.txt"), "eod.2024");
        assert_eq!(fallback_sheet_name("noext"), "noext");
    }

    #[test]
    fn test_extract_trn_date() {
        let grid = parse_rows("TRN_DATE,2024-01-15\nA,1,2\nB,x,4");
        assert_eq!(extract_trn_date(&grid).as_deref(), Some("2024-01-15"));
        assert_eq!(sheet_key_for(&grid, "whatever.csv"), "2024-01-15");
    }

    #[test]
    fn test_first_marker_wins() {
        let grid = parse_rows("TRN_DATE,2024-01-15\nTRN_DATE,2024-02-01");
        assert_eq!(extract_trn_date(&grid).as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_marker_with_empty_value_is_skipped() {
        let grid = parse_rows("TRN_DATE,\nTRN_DATE,2024-03-01");
        assert_eq!(extract_trn_date(&grid).as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_numeric_marker_value_becomes_text() {
        let grid = parse_rows("TRN_DATE,20240115");
        assert_eq!(extract_trn_date(&grid).as_deref(), Some("20240115"));
    }

    #[test]
    fn test_missing_marker_uses_file_name() {
        let grid = parse_rows("A,1\nB,2");
        assert_eq!(extract_trn_date(&grid), None);
        assert_eq!(sheet_key_for(&grid, "Branch [North].txt"), "Branch North");
    }

    #[test]
    fn test_marker_value_is_sanitized() {
        let grid = parse_rows("TRN_DATE,01/15/2024");
        assert_eq!(sheet_key_for(&grid, "x.csv"), "01152024");
    }

    #[test]
    fn test_sort_two_dates() {
        let mut grids = vec![keyed("2024-02-01"), keyed("2024-01-15")];
        sort_by_sheet_date(&mut grids);
        let keys: Vec<_> = grids.iter().map(|g| g.sheet_key.as_str()).collect();
        assert_eq!(keys, ["2024-01-15", "2024-02-01"]);
    }

    #[test]
    fn test_undated_keys_go_last_in_input_order() {
        let mut grids = vec![
            keyed("zeta"),
            keyed("2024-03-01"),
            keyed("alpha"),
            keyed("2024-01-01"),
        ];
        sort_by_sheet_date(&mut grids);
        let keys: Vec<_> = grids.iter().map(|g| g.sheet_key.as_str()).collect();
        assert_eq!(keys, ["2024-01-01", "2024-03-01", "zeta", "alpha"]);
    }

    #[test]
    fn test_sort_uses_unsanitised_dates() {
        let mut grids = vec![
            keyed("02/01/2024 08:00"),
            keyed("2024-01-20 08:00:00"),
            keyed("01/15/2024"),
        ];
        sort_by_sheet_date(&mut grids);
        let keys: Vec<_> = grids.iter().map(|g| g.sheet_key.as_str()).collect();
        assert_eq!(keys, ["01152024", "2024-01-20 080000", "02012024 0800"]);
    }

    #[test]
    fn test_raw_key_keeps_separators() {
        let grid = parse_rows("TRN_DATE,01/15/2024 08:00");
        assert_eq!(raw_sheet_key(&grid, "x.csv"), "01/15/2024 08:00");
        assert_eq!(raw_sheet_key(&parse_rows("A,1"), "Branch [North].txt"), "Branch [North]");
    }

    #[test]
    fn test_parse_key_date_formats() {
        assert!(parse_key_date("2024-01-15").is_some());
        assert!(parse_key_date("2024/01/15").is_some());
        assert!(parse_key_date("01/15/2024").is_some());
        assert!(parse_key_date("2024-01-15 08:30:00").is_some());
        assert!(parse_key_date("01/15/2024 08:30").is_some());
        assert!(parse_key_date("01-15-2024 08:30:00").is_some());
        assert!(parse_key_date("Branch 1").is_none());
        assert!(parse_key_date("2024-13-45").is_none());
    }

    #[test]
    fn test_compare_sheet_dates() {
        assert_eq!(compare_sheet_dates("2024-01-01", "2024-01-02"), Ordering::Less);
        assert_eq!(compare_sheet_dates("2024-01-01", "x"), Ordering::Less);
        assert_eq!(compare_sheet_dates("x", "y"), Ordering::Equal);
    }
}
