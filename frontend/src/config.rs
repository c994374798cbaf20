//! Application configuration.
//!
//! Centralized configuration for the Salesbook frontend. In development
//! these are hardcoded; the backend address matches `salesbook serve`.

/// Backend API base URL.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Maximum size of a single selected file (in bytes).
///
/// 50 MB, the backend's default upload limit.
pub const MAX_FILE_SIZE: f64 = 50.0 * 1024.0 * 1024.0;

/// Maximum logs to keep in memory.
pub const MAX_LOG_ENTRIES: usize = 200;

/// MIME type of the downloaded workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// File types offered by the CSV/TXT pickers.
pub const SOURCE_ACCEPT: &str = ".csv,.txt";

/// File types offered by the workbook picker.
pub const WORKBOOK_ACCEPT: &str = ".xlsx,.xls,.ods";

/// How long a downloaded workbook's object URL stays alive (in ms).
pub const DOWNLOAD_URL_TTL_MS: i32 = 60_000;
