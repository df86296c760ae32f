//! Consolidate command - stack many exports into one table.

use std::path::{Path, PathBuf};

use colored::Colorize;
use spoolbook::input::read_workbook;
use spoolbook::{discover, read_table, Consolidator, LedgerLayout};

use super::sink_for;
use crate::cli::ExportKind;

pub fn run(
    dir: PathBuf,
    kind: ExportKind,
    pattern: Option<String>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let pattern = pattern.unwrap_or_else(|| kind.default_pattern().to_string());
    let files = discover(&dir, &pattern)?;
    if files.is_empty() {
        return Err(format!("No {} files matching '{}' in {}", kind, pattern, dir.display()).into());
    }

    println!(
        "{} {} {} files",
        "Consolidating".cyan().bold(),
        files.len().to_string().white().bold(),
        kind
    );

    let consolidation = match kind {
        ExportKind::Excel => Consolidator::new().consolidate(&files, |p: &Path| read_workbook(p))?,
        ExportKind::Csv => Consolidator::new().consolidate(&files, |p: &Path| read_table(p))?,
        ExportKind::Ledger => {
            let layout = LedgerLayout::integration();
            let mut result = Consolidator::new()
                .with_source_column(None)
                .consolidate(&files, |p: &Path| layout.read_file(p))?;
            layout.sort(&mut result.table);
            result
        }
    };

    for item in consolidation.report.failures() {
        if let spoolbook::ItemOutcome::Failed { reason } = &item.outcome {
            println!(
                "  {} {}: {}",
                "Skipped".yellow(),
                item.source.display(),
                reason
            );
        }
    }

    let output_path = output.unwrap_or_else(|| dir.join(kind.default_output()));
    let sink = sink_for(&output_path);
    let written = sink.write(&consolidation.table, &output_path)?;

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        for header in &consolidation.table.headers {
            println!("  {}", header);
        }
    }

    println!();
    println!(
        "{} {} rows from {} files",
        "Consolidated".green().bold(),
        consolidation.table.row_count().to_string().white().bold(),
        consolidation.report.succeeded().to_string().white()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        written.display().to_string().white()
    );

    Ok(())
}
