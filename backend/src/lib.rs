//! # Salesbook - POS transaction exports to summarised workbooks
//!
//! Salesbook turns comma/tab-separated point-of-sale exports (main
//! transaction files and end-of-day files) into XLSX workbooks with one
//! sheet per business date and a net sales / total summary beside the data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / TXT  │────▶│   Parser    │────▶│  Sheet key  │────▶│   Placer +  │────▶│    XLSX     │
//! │  (any enc.) │     │ (auto-enc)  │     │ (TRN_DATE)  │     │   Summary   │     │   bytes     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use salesbook::{assemble, AssemblyRequest, SourceFile, Workflow};
//!
//! let file = SourceFile::new("day1.csv", "TRN_DATE,2024-01-15\nGROSS,1200.50");
//! let output = assemble(AssemblyRequest::new(Workflow::Convert).with_primary(vec![file])).unwrap();
//! assert_eq!(output.file_name, "Converted_File.xlsx");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cell values, grids, source files
//! - [`parser`] - Decoding and row parsing
//! - [`sheet_key`] - Sheet naming and date ordering
//! - [`workbook`] - Workbook model and XLSX codec
//! - [`transform`] - Placement, summary columns, workflows
//! - [`config`] - Server and layout settings
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;
pub mod sheet_key;

// Workbook
pub mod workbook;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{InputError, PipelineError, PipelineResult, ServerError, WorkbookError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, Grid, KeyedGrid, SourceFile};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_content, detect_encoding, parse_bytes, parse_rows};
pub use sheet_key::{raw_sheet_key, sanitize_sheet_name, sheet_key_for, sort_by_sheet_date};

// =============================================================================
// Re-exports - Workbook
// =============================================================================

pub use workbook::{load_from_bytes, save_to_buffer, Workbook, Worksheet};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    assemble, output_file_name, parse_source, read_source_file, read_source_files, AssemblyContext,
    AssemblyOutput, AssemblyReport, AssemblyRequest, SheetReport, Workflow,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{LayoutOptions, ServerConfig};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
