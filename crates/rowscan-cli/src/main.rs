//! rowscan command-line interface
//!
//! Replays a captured result set through the row decoder and prints every
//! decoded row.
//!
//! # Usage
//!
//! ```bash
//! # Print a snapshot as a table
//! rowscan users.json
//!
//! # Output as JSON, logging the result metadata first
//! rowscan -o json --dump-metadata users.json
//!
//! # Accept repeated column names (last value wins)
//! rowscan --allow-duplicates joined.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rowscan_core::{DataRow, DuplicatePolicy, Rows};

mod config;
mod formatter;
mod snapshot;

use config::CliConfig;
use formatter::OutputFormat;
use snapshot::Snapshot;

/// rowscan command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "rowscan",
    version,
    about = "Decode a captured SQL result set into typed rows",
    long_about = "Decode a captured SQL result set into typed rows.\n\n\
                  The input is a JSON snapshot holding the result's column names,\n\
                  vendor type names and rows. Every row is scanned into typed buffers\n\
                  and printed through the typed accessors."
)]
struct Args {
    /// Snapshot file to replay
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, env = "ROWSCAN_OUTPUT")]
    output: Option<OutputFormatArg>,

    /// Log every column and its declared type before the rows
    #[arg(long)]
    dump_metadata: bool,

    /// Accept repeated column names; the last value wins
    #[arg(long)]
    allow_duplicates: bool,

    /// Do not print the row count
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE", env = "ROWSCAN_CONFIG")]
    config: Option<PathBuf>,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display rows in a formatted table
    Table,
    /// Display rows as JSON
    Json,
    /// Display rows as CSV
    Csv,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_logging(args.verbose, config.dump_metadata);

    let format: OutputFormat = match args.output {
        Some(arg) => arg.into(),
        None => config.output_format.parse()?,
    };

    let output = replay(&args, &config, format)?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Filter directives used when `RUST_LOG` is not set.
fn default_directives(verbose: bool, dump_metadata: bool) -> &'static str {
    if verbose {
        "rowscan=debug,rowscan_core=debug"
    } else if dump_metadata {
        "rowscan=warn,rowscan_core=info"
    } else {
        "rowscan=warn,rowscan_core=warn"
    }
}

fn init_logging(verbose: bool, dump_metadata: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, dump_metadata)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?
    } else {
        CliConfig::load_default()?
    };

    // Command-line flags override the file
    if args.dump_metadata {
        config.dump_metadata = true;
    }
    if args.allow_duplicates {
        config.duplicate_columns = DuplicatePolicy::LastWriteWins;
    }
    if args.quiet {
        config.row_count = false;
    }

    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Decodes every row of the snapshot and renders the result.
fn replay(args: &Args, config: &CliConfig, format: OutputFormat) -> Result<String> {
    info!("Replaying snapshot: {}", args.input.display());

    let cursor = Snapshot::from_file(&args.input)?.into_cursor()?;
    let rows = Rows::new(cursor, &config.decoder_config())?;
    let metadata = rows.metadata().clone();

    let decoded = rows
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("decoding row {}", i)))
        .collect::<Result<Vec<DataRow>>>()?;

    let mut output = formatter::format_rows(&metadata, &decoded, format)?;
    if config.row_count && format == OutputFormat::Table {
        let noun = if decoded.len() == 1 { "row" } else { "rows" };
        output.push_str(&format!("\n({} {})\n", decoded.len(), noun));
    }
    Ok(output)
}
