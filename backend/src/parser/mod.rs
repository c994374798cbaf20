//! Delimited text to grid parser.
//!
//! POS exports arrive as `.csv` or `.txt` files that mix commas and tabs
//! freely. Every line is split on either character, fields are trimmed and
//! numeric-looking fields become numbers. Quoting is not supported: a field
//! can never contain a comma or a tab.
//!
//! Parsing is total. Any text produces a grid, blank lines are dropped and
//! fields that do not look numeric are kept as text.

use crate::models::{CellValue, Grid};

/// Decoded input text together with the encoding that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub content: String,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text.
///
/// Valid UTF-8 is used as-is. Anything else goes through charset detection,
/// and unknown charsets fall back to lossy UTF-8. A leading BOM is dropped.
pub fn decode_content(bytes: &[u8]) -> Decoded {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded {
            content: text.to_string(),
            encoding: "utf-8".to_string(),
        };
    }

    let encoding = detect_encoding(bytes);
    let content = match encoding.as_str() {
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Decoded { content, encoding }
}

/// Parse delimited text into a grid.
///
/// # Example
/// ```
/// use salesbook::parser::parse_rows;
/// use salesbook::models::CellValue;
///
/// let grid = parse_rows("TRN_DATE,2024-01-15\nA,1,2");
/// assert_eq!(grid.row_count(), 2);
/// assert_eq!(grid.get(1, 1), Some(&CellValue::Number(1.0)));
/// ```
pub fn parse_rows(text: &str) -> Grid {
    let rows = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split([',', '\t']).map(classify_field).collect())
        .collect();

    Grid::new(rows)
}

/// Parse raw file bytes into a grid, decoding them first.
pub fn parse_bytes(bytes: &[u8]) -> (Grid, String) {
    let decoded = decode_content(bytes);
    (parse_rows(&decoded.content), decoded.encoding)
}

/// Classify one raw field.
///
/// The trimmed field becomes a number if it is a numeric literal, otherwise
/// it stays text (possibly empty).
pub fn classify_field(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    match parse_number(trimmed) {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(trimmed.to_string()),
    }
}

/// Numeric literal test used by [`classify_field`].
///
/// Accepts finite decimal literals (with optional sign, fraction and
/// exponent) and unsigned `0x`, `0o`, `0b` integers.
pub fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }

    if let Some(n) = parse_radix_literal(s) {
        return Some(n);
    }

    // Rules out "inf", "NaN" and friends which f64::from_str would accept.
    let decimal_chars = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_chars {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => (16, &s[2..]),
        "0o" => (8, &s[2..]),
        "0b" => (2, &s[2..]),
        _ => return None,
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u64::from_str_radix(digits, radix).ok().map(|n| n as f64)
}
