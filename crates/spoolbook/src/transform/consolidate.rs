//! Stack tables from many files into one, matching columns by name.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::batch::BatchReport;
use crate::error::{Result, SpoolbookError};
use crate::input::{SourceMetadata, Table};

/// Name of the column recording which file a row came from.
pub const SOURCE_FILE_COLUMN: &str = "Source_File";

/// Output of a consolidation run.
#[derive(Debug, Clone)]
pub struct Consolidation {
    /// All accepted rows under the consolidator's column layout.
    pub table: Table,
    /// Per-file outcomes.
    pub report: BatchReport,
}

/// How the consolidated column set is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Columns of the first accepted table. Extra columns in later tables
    /// are dropped and tables sharing no column are skipped.
    #[default]
    FirstTable,
    /// Every column seen in any table, in order of first appearance.
    Union,
}

/// Merges tables column-by-name.
///
/// With [`ColumnLayout::FirstTable`] the first accepted table fixes the
/// column layout. Later tables are reindexed to it: missing columns are left
/// empty and extra columns are dropped. A table that shares no column with
/// the layout is skipped. With [`ColumnLayout::Union`] new columns are
/// appended as they appear and no table is skipped.
#[derive(Debug, Clone)]
pub struct Consolidator {
    source_column: Option<String>,
    layout: ColumnLayout,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self {
            source_column: Some(SOURCE_FILE_COLUMN.to_string()),
            layout: ColumnLayout::FirstTable,
        }
    }
}

impl Consolidator {
    /// Create a consolidator that tags rows with `Source_File`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different source column name, or none.
    pub fn with_source_column(mut self, name: Option<String>) -> Self {
        self.source_column = name;
        self
    }

    /// Choose how the column set is built.
    pub fn with_column_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Read each path with `reader` and stack the results.
    ///
    /// Read failures and incompatible tables are recorded in the report and
    /// do not stop the run. Fails with `EmptyData` when nothing was accepted.
    pub fn consolidate<F>(&self, paths: &[PathBuf], mut reader: F) -> Result<Consolidation>
    where
        F: FnMut(&Path) -> Result<(Table, SourceMetadata)>,
    {
        let mut report = BatchReport::start();
        let mut layout: Option<IndexSet<String>> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();

        for path in paths {
            let (table, meta) = match reader(path) {
                Ok(read) => read,
                Err(e) => {
                    report.record_failure(path.clone(), e.to_string());
                    continue;
                }
            };
            let table = self.tag_source(table, &meta.file);

            if let Some(columns) = layout.as_mut() {
                if self.layout == ColumnLayout::Union {
                    let before = columns.len();
                    columns.extend(table.headers.iter().cloned());
                    if columns.len() > before {
                        debug!(path = %path.display(), added = columns.len() - before, "columns added");
                    }
                    report.record_success(path.clone(), None, table.row_count(), columns.len());
                    rows.extend(reindex(&table, columns));
                    continue;
                }
                if !self.shares_data_column(columns, &table) {
                    report.record_failure(path.clone(), "No matching columns");
                    continue;
                }
                report.record_success(path.clone(), None, table.row_count(), columns.len());
                rows.extend(reindex(&table, columns));
                continue;
            }

            let columns: IndexSet<String> = table.headers.iter().cloned().collect();
            debug!(path = %path.display(), columns = columns.len(), "column layout fixed");
            report.record_success(path.clone(), None, table.row_count(), columns.len());
            rows.extend(reindex(&table, &columns));
            layout = Some(columns);
        }

        let Some(columns) = layout else {
            return Err(SpoolbookError::EmptyData(
                "No files could be consolidated".to_string(),
            ));
        };

        let width = columns.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        let table = Table::new(columns.into_iter().collect(), rows);
        info!(
            files = report.succeeded(),
            skipped = report.failed(),
            rows = table.row_count(),
            "consolidated tables"
        );

        Ok(Consolidation {
            table,
            report: report.finish(),
        })
    }

    fn tag_source(&self, mut table: Table, file: &str) -> Table {
        if let Some(name) = &self.source_column {
            if table.column_index(name).is_none() {
                let rows = table.row_count();
                table.push_column(name.clone(), std::iter::repeat_n(file.to_string(), rows));
            }
        }
        table
    }

    /// The source column is added to every table, so it does not count as
    /// a shared column.
    fn shares_data_column(&self, columns: &IndexSet<String>, table: &Table) -> bool {
        table
            .headers
            .iter()
            .filter(|h| Some(h.as_str()) != self.source_column.as_deref())
            .any(|h| columns.contains(h))
    }
}

/// Reorder a table's rows to `columns`, filling missing columns with "".
fn reindex(table: &Table, columns: &IndexSet<String>) -> Vec<Vec<String>> {
    let positions: Vec<Option<usize>> = columns
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    table
        .rows
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|pos| pos.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                .collect()
        })
        .collect()
}
