//! Tabular data and source metadata.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SpoolbookError};

/// Metadata about a source file that has been read or converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (spool, csv, tsv, xlsx, ledger, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the source was processed.
    pub converted_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file from its raw contents and the table it produced.
    pub fn new(path: PathBuf, contents: &[u8], format: impl Into<String>, table: &Table) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash: content_hash(contents),
            size_bytes: contents.len() as u64,
            format: format.into(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            converted_at: Utc::now(),
        }
    }
}

/// Read a whole source file, failing with `SourceNotFound` before any read
/// when the path does not exist.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(SpoolbookError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = File::open(path).map_err(|e| SpoolbookError::io(path, e))?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| SpoolbookError::io(path, e))?;

    Ok(contents)
}

/// SHA-256 digest of raw bytes, formatted as `sha256:<hex>`.
pub fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("sha256:{:x}", hasher.finalize())
}

/// How many columns a table built from ragged records gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Width of the first record. Wider records lose their trailing fields.
    #[default]
    FirstRecord,
    /// Width of the widest record. Nothing is dropped.
    Widest,
}

impl ColumnPolicy {
    /// Column count this policy assigns to the given records.
    pub fn column_count<R: AsRef<[String]>>(&self, records: &[R]) -> usize {
        match self {
            ColumnPolicy::FirstRecord => records.first().map(|r| r.as_ref().len()).unwrap_or(0),
            ColumnPolicy::Widest => records.iter().map(|r| r.as_ref().len()).max().unwrap_or(0),
        }
    }
}

/// Represents tabular data with string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a new table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from headerless ragged records using positional column names.
    ///
    /// Every row is padded with empty strings or truncated to the width the
    /// policy picks, so the result is rectangular.
    pub fn from_records<R: AsRef<[String]>>(records: &[R], policy: ColumnPolicy) -> Self {
        let width = policy.column_count(records);
        let rows = records
            .iter()
            .map(|record| fit_row(record.as_ref().to_vec(), width))
            .collect();

        Self {
            headers: positional_headers(width),
            rows,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Append a column, filling each row from `values`.
    pub fn push_column(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = String>) {
        self.headers.push(name.into());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().unwrap_or_default());
        }
    }

    /// Check whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Generic ordinal column names, `Column_1` through `Column_<count>`.
pub fn positional_headers(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column_{}", i)).collect()
}

/// Pad with empty strings or truncate so the row has exactly `width` cells.
pub(crate) fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}
