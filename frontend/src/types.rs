//! Common types used across the frontend application.
//!
//! # Categories
//!
//! - **Workflow Types** - The five processing modes offered by the page
//! - **Log Types** - Real-time log streaming
//! - **API Types** - Backend error bodies
//! - **Error Types** - Frontend error handling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Workflow Types
// =============================================================================

/// Processing mode, sent to the backend as the `workflow` form field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    #[default]
    Convert,
    Combine,
    Merge,
    Update,
    Manage,
}

impl Workflow {
    pub const ALL: [Workflow; 5] = [
        Workflow::Convert,
        Workflow::Combine,
        Workflow::Merge,
        Workflow::Update,
        Workflow::Manage,
    ];

    /// Form value understood by the backend.
    pub fn value(&self) -> &'static str {
        match self {
            Workflow::Convert => "convert",
            Workflow::Combine => "combine",
            Workflow::Merge => "merge",
            Workflow::Update => "update",
            Workflow::Manage => "manage",
        }
    }

    /// Label shown in the workflow picker.
    pub fn label(&self) -> &'static str {
        match self {
            Workflow::Convert => "Convert CSV/TXT to Excel",
            Workflow::Combine => "Combine main + EOD files",
            Workflow::Merge => "Append EOD files to a workbook",
            Workflow::Update => "Add summary columns to a workbook",
            Workflow::Manage => "Update a workbook and append EOD files",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            Workflow::Convert => "Converted_File",
            Workflow::Combine => "Final_Excel",
            Workflow::Merge => "Combined_Excel",
            Workflow::Update => "Updated_Excel_File",
            Workflow::Manage => "Updated_Excel",
        }
    }

    pub fn uses_workbook(&self) -> bool {
        matches!(self, Workflow::Merge | Workflow::Update | Workflow::Manage)
    }

    pub fn uses_primary(&self) -> bool {
        matches!(self, Workflow::Convert | Workflow::Combine)
    }

    pub fn uses_secondary(&self) -> bool {
        matches!(self, Workflow::Combine | Workflow::Merge | Workflow::Manage)
    }
}

impl FromStr for Workflow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workflow::ALL
            .into_iter()
            .find(|w| w.value() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown workflow: {}", s)))
    }
}

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level.
///
/// Matches the backend's log levels for SSE streaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }
}

/// A single log line shown in the logs panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub indent: u8,
    /// Local display time (HH:MM:SS)
    pub timestamp: String,
}

// =============================================================================
// API Types
// =============================================================================

/// JSON body returned by the backend on failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub job_id: String,
    pub status: String,
    pub error: String,
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
#[derive(Clone, Debug, PartialEq)]
pub enum AppError {
    /// Missing or invalid user input.
    Validation(String),
    /// Network/HTTP error.
    Network(String),
    /// Backend rejected the request.
    Server { status: u16, message: String },
    /// Saving the workbook in the browser failed.
    Download(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server { status, message } => write!(f, "Server error ({}): {}", status, message),
            AppError::Download(msg) => write!(f, "Download error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;
