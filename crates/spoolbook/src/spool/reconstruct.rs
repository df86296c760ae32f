//! Record reconstructor: folds indented continuation lines into the record
//! that precedes them.

use tracing::{debug, warn};

use crate::error::{Result, SpoolbookError};
use super::sanitize::CleanLine;

/// One logical row, possibly spanning several printed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRecord {
    fields: Vec<String>,
    line_count: usize,
}

impl LogicalRecord {
    fn open(fields: Vec<String>) -> Self {
        Self {
            fields,
            line_count: 1,
        }
    }

    fn absorb(&mut self, fields: impl IntoIterator<Item = String>) {
        self.fields.extend(fields);
        self.line_count += 1;
    }

    /// Fields in print order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of physical lines folded into this record.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Consume the record, returning its fields.
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl AsRef<[String]> for LogicalRecord {
    fn as_ref(&self) -> &[String] {
        &self.fields
    }
}

/// Group sanitized lines into logical records.
///
/// A non-indented line with fields opens a new record; every other line
/// extends the open one. Continuation lines seen before any record is open
/// are dropped. Fails with `NoDataFound` when no record results.
pub fn reconstruct(lines: &[CleanLine]) -> Result<Vec<LogicalRecord>> {
    let mut records = Vec::new();
    let mut current: Option<LogicalRecord> = None;
    let mut orphaned = 0usize;

    for line in lines {
        let fields: Vec<String> = line.fields().map(str::to_string).collect();

        if !fields.is_empty() && !line.indented {
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(LogicalRecord::open(fields));
        } else if let Some(open) = current.as_mut() {
            open.absorb(fields);
        } else {
            orphaned += 1;
        }
    }

    if let Some(done) = current {
        records.push(done);
    }

    if orphaned > 0 {
        warn!(orphaned, "dropped continuation lines with no preceding record");
    }

    if records.is_empty() {
        return Err(SpoolbookError::NoDataFound { path: None });
    }

    debug!(lines = lines.len(), records = records.len(), "reconstructed records");
    Ok(records)
}
