//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spoolbook: convert spool captures and consolidate tabular exports
#[derive(Parser)]
#[command(name = "spoolbook")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a spool capture into an xlsx workbook
    Convert {
        /// Path to the spool file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output workbook path (default: <file>.xlsx); the extension is forced to .xlsx
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Size columns to the widest record instead of the first one
        #[arg(long)]
        widest: bool,
    },

    /// Print the visible lines of a spool capture with line numbers
    View {
        /// Path to the spool file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Convert every spool capture in a directory
    Batch {
        /// Directory containing spool files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File name pattern to match
        #[arg(short, long, default_value = "*.hpspool")]
        pattern: String,

        /// Output directory (default: <DIR>/xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON report of per-file outcomes
        #[arg(long)]
        report: Option<PathBuf>,

        /// Stop at the first file that fails
        #[arg(long)]
        fail_fast: bool,

        /// Size columns to the widest record instead of the first one
        #[arg(long)]
        widest: bool,
    },

    /// Stack many exports into one table, matching columns by name
    Consolidate {
        /// Directory containing the exports
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Kind of export
        #[arg(short, long, default_value = "excel")]
        kind: ExportKind,

        /// File name pattern (default depends on --kind)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Output path; .csv/.tsv write delimited text, anything else xlsx
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split delimited exports into one workbook per classification key
    Partition {
        /// Directory containing the exports
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File name pattern to match
        #[arg(short, long, default_value = "*.csv")]
        pattern: String,

        /// Column the key is derived from
        #[arg(short, long, default_value = "CLefCat")]
        column: String,

        /// Name of the derived key column
        #[arg(long, default_value = "Cbranche")]
        derived: String,

        /// Regex extracting the key (first group, or whole match)
        #[arg(long, default_value = r"\d")]
        key_pattern: String,

        /// Output directory (default: <DIR>/output_files)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prefix for partition file and sheet names
        #[arg(long, default_value = "branch")]
        prefix: String,
    },
}

/// Export kinds understood by `consolidate`.
#[derive(Clone, Debug, Default)]
pub enum ExportKind {
    /// Spreadsheet batches (.xlsx)
    #[default]
    Excel,
    /// Accounting integration ledgers
    Ledger,
    /// Delimited text with a header row
    Csv,
}

impl ExportKind {
    /// Pattern used when none is given.
    pub fn default_pattern(&self) -> &'static str {
        match self {
            ExportKind::Excel => "*.xlsx",
            ExportKind::Ledger => "*IntegrationComptable.csv",
            ExportKind::Csv => "*.csv",
        }
    }

    /// Output file name used when none is given.
    pub fn default_output(&self) -> &'static str {
        match self {
            ExportKind::Excel => "consolidated.xlsx",
            ExportKind::Ledger => "consolidated_accounting.csv",
            ExportKind::Csv => "consolidated.csv",
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportKind::Excel),
            "ledger" | "accounting" => Ok(ExportKind::Ledger),
            "csv" => Ok(ExportKind::Csv),
            _ => Err(format!("Unknown kind: {}. Use excel, ledger, or csv.", s)),
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportKind::Excel => write!(f, "excel"),
            ExportKind::Ledger => write!(f, "ledger"),
            ExportKind::Csv => write!(f, "csv"),
        }
    }
}
