//! Backend services.
//!
//! # Services
//!
//! - [`process`] - Workflow submission to the salesbook backend and browser
//!   download of the resulting workbook

pub mod process;

pub use process::*;
