//! Batch conversion with a per-file outcome report.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SpoolbookError};
use crate::input::discover;
use crate::output::create_parent_dir;
use crate::spool::SpoolParser;

/// What happened to one file in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The file was converted or read.
    Converted {
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<PathBuf>,
        rows: usize,
        columns: usize,
    },
    /// The file was left out, with the reason.
    Failed { reason: String },
}

/// One file's entry in a batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The input file.
    pub source: PathBuf,
    /// Its outcome.
    pub outcome: ItemOutcome,
}

impl BatchItem {
    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Converted { .. })
    }
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished.
    pub finished_at: DateTime<Utc>,
    /// Per-file outcomes.
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    /// Start an empty report.
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            items: Vec::new(),
        }
    }

    /// Record a success.
    pub fn record_success(
        &mut self,
        source: impl Into<PathBuf>,
        output: Option<PathBuf>,
        rows: usize,
        columns: usize,
    ) {
        self.items.push(BatchItem {
            source: source.into(),
            outcome: ItemOutcome::Converted {
                output,
                rows,
                columns,
            },
        });
    }

    /// Record a failure.
    pub fn record_failure(&mut self, source: impl Into<PathBuf>, reason: impl Into<String>) {
        let source = source.into();
        let reason = reason.into();
        warn!(source = %source.display(), %reason, "skipped file");
        self.items.push(BatchItem {
            source,
            outcome: ItemOutcome::Failed { reason },
        });
    }

    /// Stamp the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Number of successful items.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    /// Number of failed items.
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Failed items only.
    pub fn failures(&self) -> impl Iterator<Item = &BatchItem> {
        self.items.iter().filter(|i| !i.is_success())
    }

    /// Save the report as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent_dir(path)?;

        let file = File::create(path).map_err(|e| SpoolbookError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Options for batch runs.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Abort on the first failing file instead of recording it.
    pub fail_fast: bool,
}

/// Convert every spool under `base` matching `pattern` into
/// `out_dir/<stem>.xlsx`.
///
/// Each file succeeds or fails on its own; failures land in the report
/// unless `fail_fast` is set, in which case the first one is returned. An
/// input whose stem was already converted in this run fails with
/// `OutputCollision` instead of overwriting the earlier workbook.
pub fn convert_batch(
    base: impl AsRef<Path>,
    pattern: &str,
    out_dir: impl AsRef<Path>,
    parser: &SpoolParser,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let base = base.as_ref();
    let out_dir = out_dir.as_ref();
    let sources = discover(base, pattern)?;

    if sources.is_empty() {
        return Err(SpoolbookError::EmptyData(format!(
            "No files matching '{}' in {}",
            pattern,
            base.display()
        )));
    }
    info!(count = sources.len(), "converting spool batch");

    let mut report = BatchReport::start();
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    for source in sources {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let target = out_dir.join(format!("{}.xlsx", stem));

        if !claimed.insert(target.clone()) {
            let err = SpoolbookError::OutputCollision { path: target };
            if options.fail_fast {
                return Err(err);
            }
            report.record_failure(source, err.to_string());
            continue;
        }

        match parser.convert(&source, &target) {
            Ok(conversion) => report.record_success(
                source,
                Some(conversion.output),
                conversion.table.row_count(),
                conversion.table.column_count(),
            ),
            Err(e) if options.fail_fast => return Err(e),
            Err(e) => report.record_failure(source, e.to_string()),
        }
    }

    Ok(report.finish())
}
