//! Spreadsheet workbook reader.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::{Result, SpoolbookError};
use super::source::{fit_row, read_source, SourceMetadata, Table};

/// Read the first worksheet of a workbook, using its first row as the header.
pub fn read_workbook(path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
    let path = path.as_ref();
    let contents = read_source(path)?;

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SpoolbookError::EmptyData(format!("No worksheet in '{}'", path.display())))??;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows
        .next()
        .ok_or_else(|| SpoolbookError::EmptyData(format!("No header row in '{}'", path.display())))?;
    let width = headers.len();
    let rows: Vec<Vec<String>> = rows.map(|row| fit_row(row, width)).collect();

    let table = Table::new(headers, rows);
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "read workbook"
    );

    let format = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "xlsx".to_string());
    let metadata = SourceMetadata::new(path.to_path_buf(), &contents, format, &table);
    Ok((table, metadata))
}

/// Render a cell as text; empty cells become empty strings.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
