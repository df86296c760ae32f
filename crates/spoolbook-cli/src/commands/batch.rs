//! Batch command - convert every spool capture in a directory.

use std::path::PathBuf;

use colored::Colorize;
use spoolbook::{convert_batch, BatchOptions, ColumnPolicy, ItemOutcome, SpoolConfig, SpoolParser};

pub fn run(
    dir: PathBuf,
    pattern: String,
    output: Option<PathBuf>,
    report_path: Option<PathBuf>,
    fail_fast: bool,
    widest: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let policy = if widest {
        ColumnPolicy::Widest
    } else {
        ColumnPolicy::FirstRecord
    };
    let parser = SpoolParser::with_config(SpoolConfig::default().with_column_policy(policy));
    let out_dir = output.unwrap_or_else(|| dir.join("xlsx"));

    println!(
        "{} {} in {}",
        "Converting".cyan().bold(),
        pattern.white(),
        dir.display().to_string().white()
    );

    let report = convert_batch(&dir, &pattern, &out_dir, &parser, &BatchOptions { fail_fast })?;

    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Converted { output, rows, .. } => {
                if verbose {
                    println!(
                        "  {} {} → {} ({} rows)",
                        "✓".green(),
                        item.source.display(),
                        output
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default(),
                        rows
                    );
                }
            }
            ItemOutcome::Failed { reason } => {
                println!("  {} {}: {}", "✗".red(), item.source.display(), reason);
            }
        }
    }

    if let Some(path) = report_path {
        report.save(&path)?;
        println!(
            "{} {}",
            "Report saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    println!();
    println!(
        "{} {} converted, {} failed",
        "Done:".green().bold(),
        report.succeeded().to_string().white().bold(),
        report.failed().to_string().red()
    );

    Ok(())
}
