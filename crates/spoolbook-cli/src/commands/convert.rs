//! Convert command - turn one spool capture into an xlsx workbook.

use std::path::PathBuf;

use colored::Colorize;
use spoolbook::{ColumnPolicy, SpoolConfig, SpoolParser};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    widest: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Converting".cyan().bold(),
        file.display().to_string().white()
    );

    let policy = if widest {
        ColumnPolicy::Widest
    } else {
        ColumnPolicy::FirstRecord
    };
    let parser = SpoolParser::with_config(SpoolConfig::default().with_column_policy(policy));

    let output_path = output.unwrap_or_else(|| file.with_extension("xlsx"));
    let conversion = parser.convert(&file, &output_path)?;

    if conversion.output != output_path {
        println!(
            "{} output extension changed to .xlsx",
            "Note:".yellow()
        );
    }

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        println!("  {}", conversion.table.headers.join(", "));
        println!("{} {}", "Source hash:".yellow().bold(), conversion.source.hash);
    }

    println!(
        "Processed {} rows across {} columns",
        conversion.table.row_count().to_string().white().bold(),
        conversion.table.column_count().to_string().white().bold()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        conversion.output.display().to_string().white()
    );

    Ok(())
}
