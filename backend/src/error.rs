//! Error types for the Salesbook assembly pipeline.
//!
//! The hierarchy follows the pipeline layers:
//!
//! - [`InputError`] - required input missing for the selected workflow
//! - [`WorkbookError`] - loading or serialising the workbook container
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Parsing text and deriving sheet keys never fail, so they have no error
//! type of their own. Conversions are automatic via `From`, so `?` works
//! across layer boundaries.

use thiserror::Error;

// =============================================================================
// Input Errors
// =============================================================================

/// A workflow was started without the inputs it needs.
///
/// Raised before any workbook mutation happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// No primary CSV/TXT file was supplied.
    #[error("Upload main CSV/TXT files first.")]
    MissingPrimary,

    /// No secondary (EOD) CSV/TXT file was supplied.
    #[error("Please upload CSV/TXT files to append.")]
    MissingSecondary,

    /// No base workbook was supplied.
    #[error("Please upload an Excel file first.")]
    MissingWorkbook,

    /// The workflow name is not one of the known workflows.
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),
}

// =============================================================================
// Workbook Errors
// =============================================================================

/// Errors while reading or writing the binary workbook container.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// The supplied bytes are not a readable workbook.
    #[error("Failed to open workbook: {0}")]
    Open(#[from] calamine::Error),

    /// A sheet inside the workbook could not be read.
    #[error("Failed to read sheet '{sheet}': {message}")]
    ReadSheet { sheet: String, message: String },

    /// The XLSX writer rejected the workbook.
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// A cell coordinate cannot be represented in the XLSX grid.
    #[error("Cell ({row}, {col}) is outside the worksheet grid")]
    OutOfRange { row: u32, col: u32 },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level assembly errors.
///
/// Returned by [`crate::transform::pipeline::assemble`]. Every variant is
/// terminal for the current request: no partial workbook is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required input missing.
    #[error("{0}")]
    Input(#[from] InputError),

    /// Workbook load/save failure.
    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// Reading an input file from disk failed.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for workbook container operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let input_err = InputError::MissingPrimary;
        let pipeline_err: PipelineError = input_err.into();
        assert!(pipeline_err.to_string().contains("main CSV/TXT"));

        let server_err: ServerError = pipeline_err.into();
        assert!(server_err.to_string().starts_with("Pipeline error"));
    }

    #[test]
    fn test_out_of_range_format() {
        let err = WorkbookError::OutOfRange { row: 0, col: 20000 };
        let msg = err.to_string();
        assert!(msg.contains("(0, 20000)"));
    }

    #[test]
    fn test_unknown_workflow_names_value() {
        let err = InputError::UnknownWorkflow("export".into());
        assert_eq!(err.to_string(), "Unknown workflow: export");
    }
}
