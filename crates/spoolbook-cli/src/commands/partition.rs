//! Partition command - split exports into one workbook per derived key.

use std::path::{Path, PathBuf};

use colored::Colorize;
use spoolbook::{
    discover, read_table, write_partitions, ClassificationKey, ColumnLayout, Consolidator, XlsxSink,
};

#[allow(clippy::too_many_arguments)]
pub fn run(
    dir: PathBuf,
    pattern: String,
    column: String,
    derived: String,
    key_pattern: String,
    output: Option<PathBuf>,
    prefix: String,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let key = ClassificationKey::new(column, derived, &key_pattern)?;
    let files = discover(&dir, &pattern)?;
    if files.is_empty() {
        return Err(format!("No files matching '{}' in {}", pattern, dir.display()).into());
    }

    println!(
        "{} {} files",
        "Extracting".cyan().bold(),
        files.len().to_string().white().bold()
    );

    let consolidation = Consolidator::new()
        .with_source_column(None)
        .with_column_layout(ColumnLayout::Union)
        .consolidate(&files, |p: &Path| read_table(p))?;
    let mut table = consolidation.table;
    if table.is_empty() {
        return Err("No data extracted".into());
    }
    println!("Extracted {} rows", table.row_count().to_string().white().bold());

    key.derive(&mut table)?;
    let partitions = key.partition(&table)?;

    let out_dir = output.unwrap_or_else(|| dir.join("output_files"));
    let written = write_partitions(&partitions, &out_dir, &prefix, &XlsxSink::new())?;

    for ((value, part), path) in partitions.iter().zip(&written) {
        if verbose {
            println!(
                "  {} {} rows → {}",
                value.cyan(),
                part.row_count(),
                path.display()
            );
        }
    }

    println!();
    println!(
        "{} {} partitions in {}",
        "Wrote".green().bold(),
        written.len().to_string().white().bold(),
        out_dir.display().to_string().white()
    );

    Ok(())
}
