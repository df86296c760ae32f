//! Spoolbook CLI - spool conversion and export consolidation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            file,
            output,
            widest,
        } => commands::convert::run(file, output, widest, cli.verbose),

        Commands::View { file } => commands::view::run(file),

        Commands::Batch {
            dir,
            pattern,
            output,
            report,
            fail_fast,
            widest,
        } => commands::batch::run(dir, pattern, output, report, fail_fast, widest, cli.verbose),

        Commands::Consolidate {
            dir,
            kind,
            pattern,
            output,
        } => commands::consolidate::run(dir, kind, pattern, output, cli.verbose),

        Commands::Partition {
            dir,
            pattern,
            column,
            derived,
            key_pattern,
            output,
            prefix,
        } => commands::partition::run(
            dir,
            pattern,
            column,
            derived,
            key_pattern,
            output,
            prefix,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "spoolbook=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
