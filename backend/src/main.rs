//! Salesbook CLI - Turn POS exports into summarised XLSX workbooks
//!
//! # Workflows
//!
//! ```bash
//! salesbook convert -p day1.csv day2.csv             # One plain sheet per date
//! salesbook combine -p day1.csv -s eod1.txt          # Sheets + summary + EOD blocks
//! salesbook merge   -w book.xlsx -s eod1.txt          # EOD blocks into a workbook
//! salesbook update  -w book.xlsx                      # Summary on every sheet
//! salesbook manage  -w book.xlsx -s eod1.txt          # Update, then merge
//! ```
//!
//! # Other Commands
//!
//! ```bash
//! salesbook parse day1.csv      # Dump the parsed grid and its sheet key
//! salesbook serve               # Start HTTP server (port 3000)
//! ```

use clap::{Args, Parser, Subcommand};
use salesbook::{
    assemble, parse_bytes, read_source_file, read_source_files, server::start_server, sheet_key_for,
    AssemblyRequest, PipelineResult, ServerConfig, Workflow,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salesbook")]
#[command(about = "Turn POS transaction exports into summarised XLSX workbooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert main files into a workbook, one sheet per date
    Convert(WorkflowArgs),

    /// Convert main files, add summary columns and EOD blocks
    Combine(WorkflowArgs),

    /// Append EOD files to an existing workbook
    Merge(WorkflowArgs),

    /// Add summary columns to every sheet of a workbook
    Update(WorkflowArgs),

    /// Update a workbook, then append EOD files
    Manage(WorkflowArgs),

    /// Parse a CSV/TXT file and output JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: SALESBOOK_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug, Clone)]
struct WorkflowArgs {
    /// Base workbook (merge, update, manage)
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// Main CSV/TXT files
    #[arg(short, long, num_args = 1..)]
    primary: Vec<PathBuf>,

    /// EOD CSV/TXT files
    #[arg(short, long, num_args = 1..)]
    secondary: Vec<PathBuf>,

    /// Output title (default depends on the workflow)
    #[arg(short, long)]
    title: Option<String>,

    /// Directory for the generated workbook
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert(args) => cmd_workflow(Workflow::Convert, args).await,
        Commands::Combine(args) => cmd_workflow(Workflow::Combine, args).await,
        Commands::Merge(args) => cmd_workflow(Workflow::Merge, args).await,
        Commands::Update(args) => cmd_workflow(Workflow::Update, args).await,
        Commands::Manage(args) => cmd_workflow(Workflow::Manage, args).await,
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Read every input, then run the workflow and write `<title>.xlsx`.
async fn cmd_workflow(workflow: Workflow, args: WorkflowArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "📄 {}: {} main, {} EOD file(s)",
        workflow,
        args.primary.len(),
        args.secondary.len()
    );

    let (primary, secondary, workbook) = tokio::try_join!(
        read_source_files(&args.primary),
        read_source_files(&args.secondary),
        read_workbook(args.workbook.as_deref()),
    )?;

    let mut request = AssemblyRequest::new(workflow)
        .with_primary(primary)
        .with_secondary(secondary);
    if let Some(title) = args.title {
        request = request.with_title(title);
    }
    if let Some(bytes) = workbook {
        request = request.with_base_workbook(bytes);
    }

    let output = assemble(request)?;

    fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(&output.file_name);
    fs::write(&path, &output.bytes)?;

    for sheet in &output.report.sheets {
        eprintln!("   {} ({} rows × {} columns)", sheet.name, sheet.rows, sheet.columns);
    }
    eprintln!("💾 Workbook written to: {}", path.display());
    Ok(())
}

async fn read_workbook(path: Option<&Path>) -> PipelineResult<Option<Vec<u8>>> {
    match path {
        Some(p) => Ok(Some(read_source_file(p).await?.bytes)),
        None => Ok(None),
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let bytes = fs::read(input)?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (grid, encoding) = parse_bytes(&bytes);
    let sheet_key = sheet_key_for(&grid, &file_name);

    eprintln!("   Encoding: {}", encoding);
    eprintln!("   Sheet: {}", sheet_key);
    eprintln!("✅ Parsed {} rows, {} columns", grid.row_count(), grid.width());

    let json = serde_json::to_string_pretty(&json!({
        "file": file_name,
        "encoding": encoding,
        "sheetKey": sheet_key,
        "rows": grid,
    }))?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config = config.with_port(port);
    }
    start_server(config).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_workflow_args() {
        let cli = Cli::try_parse_from([
            "salesbook", "combine", "-p", "a.csv", "b.csv", "-s", "e.txt", "-t", "Week", "-o", "out",
        ])
        .unwrap();

        match cli.command {
            Commands::Combine(args) => {
                assert_eq!(args.primary, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
                assert_eq!(args.secondary, vec![PathBuf::from("e.txt")]);
                assert_eq!(args.title.as_deref(), Some("Week"));
                assert_eq!(args.out_dir, PathBuf::from("out"));
                assert!(args.workbook.is_none());
            }
            _ => panic!("expected combine"),
        }
    }

    #[tokio::test]
    async fn test_workflow_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("day.csv");
        fs::write(&input, "TRN_DATE,2024-01-15\nCASH,100").unwrap();

        let args = WorkflowArgs {
            workbook: None,
            primary: vec![input],
            secondary: Vec::new(),
            title: Some("Out".to_string()),
            out_dir: dir.path().join("result"),
        };
        cmd_workflow(Workflow::Combine, args).await.unwrap();

        let written = fs::read(dir.path().join("result").join("Out.xlsx")).unwrap();
        let workbook = salesbook::load_from_bytes(&written).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["2024-01-15"]);
    }

    #[tokio::test]
    async fn test_missing_input_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = WorkflowArgs {
            workbook: None,
            primary: vec![dir.path().join("missing.csv")],
            secondary: Vec::new(),
            title: None,
            out_dir: dir.path().to_path_buf(),
        };
        let err = cmd_workflow(Workflow::Convert, args).await.unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_parse_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Store A.txt");
        let output = dir.path().join("out.json");
        fs::write(&input, "x\t1\ny,2").unwrap();

        cmd_parse(&input, Some(&output)).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["sheetKey"], "Store A");
        assert_eq!(json["rows"][0][1], 1.0);
    }
}
