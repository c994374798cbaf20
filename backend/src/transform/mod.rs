//! Transformation module.
//!
//! This module turns parsed grids into finished worksheets:
//! - Catalog: fixed summary labels and formula rows
//! - Placer: grid placement at computed anchors
//! - Summary: header formulas, DESCRIPTION / TOTAL columns
//! - Pipeline: workflow orchestration

pub mod catalog;
pub mod placer;
pub mod pipeline;
pub mod summary;

pub use placer::{last_used_column, Anchor, ColumnScan};
pub use pipeline::*;
pub use summary::{apply_summary, SummaryPlan, TotalRows};
