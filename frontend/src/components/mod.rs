//! UI Components for the Salesbook page.
//!
//! # Layout Components
//! - [`Header`] - Title bar and page introduction
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`WorkflowPanel`] - Workflow picker, file inputs, process/clear buttons
//! - [`LogsPanel`] - Real-time processing logs (SSE)

mod footer;
mod header;
mod logs;
mod upload;

pub use footer::*;
pub use header::*;
pub use logs::*;
pub use upload::*;
