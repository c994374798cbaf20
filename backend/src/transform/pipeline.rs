//! High-level assembly pipeline: source files in, XLSX bytes out.
//!
//! One call to [`assemble`] runs a whole [`Workflow`]:
//!
//! 1. Validate the request (nothing is touched when an input is missing)
//! 2. Load the base workbook, or start from an empty one
//! 3. Parse every source file and resolve its sheet key
//! 4. Place grids and overlay summary columns
//! 5. Serialise the workbook
//!
//! All state lives in a request-scoped [`AssemblyContext`], so concurrent
//! requests never share sheets or anchors.
//!
//! # Example
//!
//! ```rust
//! use salesbook::models::SourceFile;
//! use salesbook::transform::{assemble, AssemblyRequest, Workflow};
//!
//! let csv = SourceFile::new("store.csv", "TRN_DATE,2024-01-15\nCASH,100,200");
//! let output = assemble(AssemblyRequest::new(Workflow::Combine).with_primary(vec![csv])).unwrap();
//!
//! assert_eq!(output.file_name, "Final_Excel.xlsx");
//! assert_eq!(output.report.sheets[0].name, "2024-01-15");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::placer::{anchor_after_last_column, append_grid, last_used_column, place_grid, Anchor, ColumnScan};
use super::summary::{apply_summary, set_column_widths, style_first_column, SummaryPlan, TotalRows};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::LayoutOptions;
use crate::error::{InputError, PipelineError, PipelineResult};
use crate::models::{KeyedGrid, SourceFile};
use crate::parser::parse_bytes;
use crate::sheet_key::{raw_sheet_key, sanitize_sheet_name, sort_by_sheet_date};
use crate::workbook::{load_from_bytes, save_to_buffer, Workbook};

// =============================================================================
// Workflows
// =============================================================================

/// The five supported assembly workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Primary files to a plain workbook, one sheet per key.
    Convert,
    /// Primary files with summary columns, plus optional EOD blocks.
    Combine,
    /// EOD blocks appended to an existing workbook.
    Merge,
    /// Summary columns added to every sheet of an existing workbook.
    Update,
    /// Update, then merge EOD blocks.
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

    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Convert => "convert",
            Workflow::Combine => "combine",
            Workflow::Merge => "merge",
            Workflow::Update => "update",
            Workflow::Manage => "manage",
        }
    }

    /// Output title used when the user leaves it blank.
    pub fn default_title(&self) -> &'static str {
        match self {
            Workflow::Convert => "Converted_File",
            Workflow::Combine => "Final_Excel",
            Workflow::Merge => "Combined_Excel",
            Workflow::Update => "Updated_Excel_File",
            Workflow::Manage => "Updated_Excel",
        }
    }

    /// Whether the workflow starts from an uploaded workbook.
    pub fn uses_base_workbook(&self) -> bool {
        matches!(self, Workflow::Merge | Workflow::Update | Workflow::Manage)
    }

    pub fn uses_primary(&self) -> bool {
        matches!(self, Workflow::Convert | Workflow::Combine)
    }

    pub fn uses_secondary(&self) -> bool {
        matches!(self, Workflow::Combine | Workflow::Merge | Workflow::Manage)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workflow {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Workflow::ALL
            .into_iter()
            .find(|w| w.as_str() == wanted)
            .ok_or_else(|| InputError::UnknownWorkflow(s.trim().to_string()))
    }
}

/// Where EOD blocks go on their sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryPlacement {
    /// The column reserved after the summary of a primary sheet, else column 1.
    ReservedColumn,
    /// Two columns past the sheet's last occupied column.
    AfterLastColumn(ColumnScan),
}

/// Which columns receive header formulas on an existing sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSpan {
    /// Columns `2..=D`.
    DataColumns,
    /// Columns `2..=` the sheet's highest column, header included.
    AllColumns,
}

// =============================================================================
// Request / Output
// =============================================================================

/// Everything one assembly run needs.
#[derive(Debug, Clone)]
pub struct AssemblyRequest {
    pub workflow: Workflow,
    /// Output title without extension; blank means the workflow default.
    pub title: Option<String>,
    pub base_workbook: Option<Vec<u8>>,
    /// Main CSV/TXT files.
    pub primary: Vec<SourceFile>,
    /// EOD CSV/TXT files.
    pub secondary: Vec<SourceFile>,
    pub layout: LayoutOptions,
}

impl AssemblyRequest {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            title: None,
            base_workbook: None,
            primary: Vec::new(),
            secondary: Vec::new(),
            layout: LayoutOptions::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_base_workbook(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.base_workbook = Some(bytes.into());
        self
    }

    pub fn with_primary(mut self, files: Vec<SourceFile>) -> Self {
        self.primary = files;
        self
    }

    pub fn with_secondary(mut self, files: Vec<SourceFile>) -> Self {
        self.secondary = files;
        self
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Check that the inputs the workflow requires are present.
    pub fn validate(&self) -> Result<(), InputError> {
        match self.workflow {
            Workflow::Convert | Workflow::Combine if self.primary.is_empty() => {
                Err(InputError::MissingPrimary)
            }
            Workflow::Merge | Workflow::Update | Workflow::Manage if self.base_workbook.is_none() => {
                Err(InputError::MissingWorkbook)
            }
            Workflow::Merge if self.secondary.is_empty() => Err(InputError::MissingSecondary),
            _ => Ok(()),
        }
    }

    /// `<title>.xlsx`, falling back to the workflow default title.
    pub fn file_name(&self) -> String {
        output_file_name(self.title.as_deref(), self.workflow)
    }
}

/// Output file name for a title.
pub fn output_file_name(title: Option<&str>, workflow: Workflow) -> String {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| workflow.default_title());
    format!("{}.xlsx", title)
}

/// Shape of one sheet of the produced workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    pub name: String,
    pub rows: u32,
    pub columns: u32,
}

/// What an assembly run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyReport {
    pub workflow: Workflow,
    pub file_name: String,
    pub primary_files: usize,
    pub secondary_files: usize,
    pub sheets: Vec<SheetReport>,
}

/// Result of a successful assembly run.
#[derive(Debug, Clone)]
pub struct AssemblyOutput {
    pub file_name: String,
    /// XLSX container bytes.
    pub bytes: Vec<u8>,
    pub report: AssemblyReport,
}

// =============================================================================
// Context
// =============================================================================

/// Mutable state of one assembly run.
///
/// Owns the workbook under construction and the EOD anchor of each primary
/// sheet (keyed by lower-cased sheet name).
#[derive(Debug)]
pub struct AssemblyContext {
    layout: LayoutOptions,
    workbook: Workbook,
    secondary_anchors: HashMap<String, u32>,
}

impl AssemblyContext {
    pub fn new(workbook: Workbook, layout: LayoutOptions) -> Self {
        Self {
            layout,
            workbook,
            secondary_anchors: HashMap::new(),
        }
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Column reserved for EOD blocks on a primary sheet.
    pub fn secondary_anchor(&self, sheet_name: &str) -> Option<u32> {
        self.secondary_anchors.get(&sheet_name.to_lowercase()).copied()
    }

    /// Sort primary grids by date and append each one to its sheet.
    ///
    /// Every touched sheet gets a frozen first column and a bold first
    /// column. With `with_summary`, the summary columns are overlaid once per
    /// sheet and the column after them is reserved for EOD blocks.
    pub fn place_primary(&mut self, mut grids: Vec<KeyedGrid>, with_summary: bool) {
        sort_by_sheet_date(&mut grids);

        // Sheet name and widest grid, in first-placement order
        let mut touched: Vec<(String, u32)> = Vec::new();

        for keyed in &grids {
            let (sheet, created) = self.workbook.get_or_add(&keyed.sheet_key);
            if !created {
                log_warning(format!("Sheet '{}' already exists, appending {}", sheet.name(), keyed.source));
            }
            let anchor = append_grid(sheet, &keyed.grid);
            log_info_indent(format!("{} → '{}' at row {}", keyed.source, sheet.name(), anchor.row), 1);

            let width = keyed.grid.width() as u32;
            match touched.iter_mut().find(|(name, _)| name.as_str() == sheet.name()) {
                Some(entry) => entry.1 = entry.1.max(width),
                None => touched.push((sheet.name().to_string(), width)),
            }
        }

        for (name, width) in touched {
            let Some(sheet) = self.workbook.get_mut(&name) else {
                continue;
            };
            sheet.freeze(0, 1);
            style_first_column(sheet);

            if with_summary {
                let plan = SummaryPlan::new(width);
                let placement = apply_summary(sheet, &plan);
                set_column_widths(
                    sheet,
                    plan.data_columns + 4 + self.layout.headroom_columns,
                    self.layout.column_width,
                );
                self.secondary_anchors
                    .insert(name.to_lowercase(), placement.next_free_column);
            } else {
                set_column_widths(sheet, width + self.layout.headroom_columns, self.layout.column_width);
            }
        }
    }

    /// Write EOD grids as blocks, in input order.
    pub fn place_secondary(&mut self, grids: &[KeyedGrid], placement: SecondaryPlacement) {
        let row = self.layout.secondary_start_row;

        for keyed in grids {
            let (sheet, created) = self.workbook.get_or_add(&keyed.sheet_key);
            let anchor = match placement {
                SecondaryPlacement::ReservedColumn => {
                    let col = if created {
                        1
                    } else {
                        self.secondary_anchors
                            .get(&sheet.name().to_lowercase())
                            .copied()
                            .unwrap_or(1)
                    };
                    Anchor::new(row, col)
                }
                SecondaryPlacement::AfterLastColumn(scan) => anchor_after_last_column(sheet, scan, row),
            };

            place_grid(sheet, &keyed.grid, anchor);
            log_info_indent(
                format!("{} → '{}' at row {}, column {}", keyed.source, sheet.name(), anchor.row, anchor.col),
                1,
            );
        }
    }

    /// Overlay summary columns on every sheet currently in the workbook.
    ///
    /// Totals cover the catalog rows only.
    pub fn summarize_existing(&mut self, scan: ColumnScan, span: HeaderSpan) {
        for sheet in self.workbook.sheets_mut() {
            let data_columns = last_used_column(sheet, scan);
            let formula_columns = match span {
                HeaderSpan::DataColumns => data_columns,
                HeaderSpan::AllColumns => sheet.column_count(),
            };
            let plan = SummaryPlan::new(data_columns)
                .formula_columns(formula_columns)
                .total_rows(TotalRows::catalog());

            let placement = apply_summary(sheet, &plan);
            log_info_indent(
                format!("'{}': summary at column {}", sheet.name(), placement.description_column),
                1,
            );
        }
    }

    fn report(&self, workflow: Workflow, file_name: &str, primary: usize, secondary: usize) -> AssemblyReport {
        AssemblyReport {
            workflow,
            file_name: file_name.to_string(),
            primary_files: primary,
            secondary_files: secondary,
            sheets: self
                .workbook
                .sheets()
                .iter()
                .map(|s| SheetReport {
                    name: s.name().to_string(),
                    rows: s.row_count(),
                    columns: s.column_count(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse one source file and resolve its sheet key.
pub fn parse_source(file: &SourceFile) -> KeyedGrid {
    let (grid, encoding) = parse_bytes(&file.bytes);
    let date_key = raw_sheet_key(&grid, &file.name);
    let sheet_key = sanitize_sheet_name(&date_key);
    log_info_indent(
        format!("{}: {} rows ({}) → sheet '{}'", file.name, grid.row_count(), encoding, sheet_key),
        1,
    );
    KeyedGrid {
        sheet_key,
        date_key,
        source: file.name.clone(),
        grid,
    }
}

fn parse_sources(label: &str, files: &[SourceFile]) -> Vec<KeyedGrid> {
    if files.is_empty() {
        return Vec::new();
    }
    log_info(format!("📖 Reading {} {} file(s)...", files.len(), label));
    files.iter().map(parse_source).collect()
}

/// Run a workflow end to end.
///
/// Fails before touching anything when a required input is missing. Any
/// workbook load or save failure aborts the run without partial output.
pub fn assemble(request: AssemblyRequest) -> PipelineResult<AssemblyOutput> {
    request.validate()?;
    let workflow = request.workflow;
    log_info(format!("🔄 Running {} workflow...", workflow));

    let workbook = match &request.base_workbook {
        Some(bytes) if workflow.uses_base_workbook() => {
            log_info("Loading base workbook...");
            let workbook = load_from_bytes(bytes)?;
            log_success(format!("Loaded {} sheet(s)", workbook.sheets().len()));
            workbook
        }
        Some(_) => {
            log_warning(format!("The {} workflow ignores the uploaded workbook", workflow));
            Workbook::new()
        }
        None => Workbook::new(),
    };

    if !workflow.uses_primary() && !request.primary.is_empty() {
        log_warning(format!("The {} workflow ignores main files", workflow));
    }
    if !workflow.uses_secondary() && !request.secondary.is_empty() {
        log_warning(format!("The {} workflow ignores EOD files", workflow));
    }

    let mut ctx = AssemblyContext::new(workbook, request.layout);

    match workflow {
        Workflow::Convert => {
            ctx.place_primary(parse_sources("main", &request.primary), false);
        }
        Workflow::Combine => {
            ctx.place_primary(parse_sources("main", &request.primary), true);
            let eod = parse_sources("EOD", &request.secondary);
            ctx.place_secondary(&eod, SecondaryPlacement::ReservedColumn);
        }
        Workflow::Merge => {
            let eod = parse_sources("EOD", &request.secondary);
            ctx.place_secondary(&eod, SecondaryPlacement::AfterLastColumn(ColumnScan::IncludeHeader));
        }
        Workflow::Update => {
            ctx.summarize_existing(ColumnScan::IncludeHeader, HeaderSpan::AllColumns);
        }
        Workflow::Manage => {
            ctx.summarize_existing(ColumnScan::BelowHeader, HeaderSpan::DataColumns);
            let eod = parse_sources("EOD", &request.secondary);
            ctx.place_secondary(&eod, SecondaryPlacement::AfterLastColumn(ColumnScan::BelowHeader));
        }
    }

    let file_name = request.file_name();
    let primary_files = if workflow.uses_primary() { request.primary.len() } else { 0 };
    let secondary_files = if workflow.uses_secondary() { request.secondary.len() } else { 0 };
    let report = ctx.report(workflow, &file_name, primary_files, secondary_files);

    log_info("💾 Writing workbook...");
    let bytes = save_to_buffer(ctx.workbook())?;
    log_success(format!("✅ {} ready ({} sheet(s))", file_name, report.sheets.len()));

    Ok(AssemblyOutput {
        file_name,
        bytes,
        report,
    })
}

/// Read files from disk concurrently, keeping their order.
///
/// Returns only after every read has completed.
pub async fn read_source_files(paths: &[PathBuf]) -> PipelineResult<Vec<SourceFile>> {
    let reads = paths.iter().map(|path| read_source_file(path));
    futures::future::try_join_all(reads).await
}

/// Read one file from disk, named after its final path component.
pub async fn read_source_file(path: &Path) -> PipelineResult<SourceFile> {
    let bytes = tokio::fs::read(path).await.map_err(|source| PipelineError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile::new(name, bytes))
}
