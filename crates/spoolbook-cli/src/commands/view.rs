//! View command - list the visible lines of a spool capture.

use std::path::PathBuf;

use colored::Colorize;

pub fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let listing = spoolbook::spool::view(&file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!();
    println!("Contents of {}:", name.cyan().bold());
    println!("{}", "-".repeat(80));

    for line in &listing.lines {
        println!("{:4} | {}", line.number, line.text);
    }

    println!("{}", "-".repeat(80));
    println!("Total lines: {}", listing.total_lines);

    Ok(())
}
