//! Spool parser: sanitize, reconstruct, and emit a spool capture as a table.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::input::{read_source, ColumnPolicy, SourceMetadata, Table};
use crate::output::{TableSink, XlsxSink};

use super::reconstruct::reconstruct;
use super::sanitize::{decode_ignoring_invalid, sanitize, split_lines};

/// Configuration for spool conversion.
#[derive(Debug, Clone)]
pub struct SpoolConfig {
    /// How the emitted column count is chosen.
    pub column_policy: ColumnPolicy,
    /// Worksheet name in the output workbook.
    pub sheet_name: String,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            column_policy: ColumnPolicy::FirstRecord,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl SpoolConfig {
    /// Set the column policy.
    pub fn with_column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = policy;
        self
    }
}

/// Result of converting one spool file.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The emitted table.
    pub table: Table,
    /// Path of the written workbook.
    pub output: PathBuf,
    /// Metadata about the source file.
    pub source: SourceMetadata,
}

/// Converts line-printer spool captures into tables.
pub struct SpoolParser {
    config: SpoolConfig,
}

impl SpoolParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(SpoolConfig::default())
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: SpoolConfig) -> Self {
        Self { config }
    }

    /// Get the parser configuration.
    pub fn config(&self) -> &SpoolConfig {
        &self.config
    }

    /// Parse spool text already in memory.
    pub fn parse_str(&self, text: &str) -> Result<Table> {
        let lines = sanitize(text);
        debug!(kept = lines.len(), "sanitized spool lines");

        let records = reconstruct(&lines)?;
        let table = Table::from_records(&records, self.config.column_policy);

        let dropped: usize = records
            .iter()
            .map(|r| r.fields().len().saturating_sub(table.column_count()))
            .sum();
        debug!(
            columns = table.column_count(),
            rows = table.row_count(),
            dropped_fields = dropped,
            policy = ?self.config.column_policy,
            "emitted spool table"
        );

        Ok(table)
    }

    /// Parse raw spool bytes, dropping invalid UTF-8 sequences.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        self.parse_str(&decode_ignoring_invalid(bytes))
    }

    /// Read and parse a spool file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let contents = read_source(path)?;
        let table = self
            .parse_bytes(&contents)
            .map_err(|e| e.with_source_path(path))?;
        let metadata = SourceMetadata::new(path.to_path_buf(), &contents, "spool", &table);
        Ok((table, metadata))
    }

    /// Convert a spool file into an `.xlsx` workbook at `output`.
    ///
    /// The output extension is replaced with `.xlsx` when it differs, the
    /// destination directory is created, and an existing file is overwritten.
    pub fn convert(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Conversion> {
        let sink = XlsxSink::new().with_sheet_name(self.config.sheet_name.clone());
        self.convert_with(input, output, &sink)
    }

    /// Convert a spool file using any table sink.
    pub fn convert_with(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        sink: &dyn TableSink,
    ) -> Result<Conversion> {
        let (table, source) = self.parse_file(input)?;
        let output = sink.write(&table, output.as_ref())?;

        Ok(Conversion {
            table,
            output,
            source,
        })
    }
}

impl Default for SpoolParser {
    fn default() -> Self {
        Self::new()
    }
}

/// One visible line of a spool listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedLine {
    /// 1-based line number in the raw file.
    pub number: usize,
    /// Line text with form feeds and line endings stripped from its ends.
    pub text: String,
}

/// A human-readable listing of a spool file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolListing {
    /// Visible lines with their original numbers.
    pub lines: Vec<ListedLine>,
    /// Number of raw lines, including blank ones.
    pub total_lines: usize,
}

/// List the visible lines of a spool file without restructuring them.
pub fn view(path: impl AsRef<Path>) -> Result<SpoolListing> {
    let path = path.as_ref();
    let contents = read_source(path)?;
    Ok(listing(&decode_ignoring_invalid(&contents)))
}

fn listing(text: &str) -> SpoolListing {
    let mut total_lines = 0;
    let mut lines = Vec::new();

    for (i, raw) in split_lines(text).into_iter().enumerate() {
        total_lines += 1;
        let text = raw.trim_matches('\x0c');
        if !text.is_empty() {
            lines.push(ListedLine {
                number: i + 1,
                text: text.to_string(),
            });
        }
    }

    SpoolListing { lines, total_lines }
}
