//! Example: convert a spool capture and print what was recovered.
//!
//! Usage:
//!   cargo run --example convert -- <spool_file> [output.xlsx]

use std::env;
use std::path::{Path, PathBuf};

use spoolbook::SpoolParser;

fn main() -> spoolbook::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example convert -- <spool_file> [output.xlsx]");
        std::process::exit(1);
    }

    let input = Path::new(&args[1]);
    let output = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("xlsx"));

    let conversion = SpoolParser::new().convert(input, &output)?;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Spool conversion: {}", input.display());
    println!("{}", separator);
    println!("Hash:    {}", conversion.source.hash);
    println!("Size:    {} bytes", conversion.source.size_bytes);
    println!("Rows:    {}", conversion.table.row_count());
    println!("Columns: {}", conversion.table.column_count());
    println!();

    for row in conversion.table.rows.iter().take(5) {
        println!("  {}", row.join(" | "));
    }
    if conversion.table.row_count() > 5 {
        println!("  ... {} more rows", conversion.table.row_count() - 5);
    }

    println!();
    println!("Saved to {}", conversion.output.display());
    Ok(())
}
