//! Format dispatch for tabular sources.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolbookError};
use super::delimited::DelimitedReader;
use super::source::{SourceMetadata, Table};
use super::workbook::read_workbook;

/// Tabular source formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// CSV, TSV, or other delimited text.
    Delimited,
    /// Spreadsheet workbook.
    Workbook,
}

impl SourceFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(SpoolbookError::UnsupportedFormat(format!(
                "'{}' (expected csv, tsv, txt, xlsx, xlsm, xls or ods)",
                path.display()
            ))),
        }
    }
}

/// Read a delimited or workbook source, choosing the reader by extension.
pub fn read_table(path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
    let path = path.as_ref();
    match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => DelimitedReader::new().read_file(path),
        SourceFormat::Workbook => read_workbook(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Delimited);
        assert_eq!(SourceFormat::from_path(Path::new("a.xlsx")).unwrap(), SourceFormat::Workbook);
        assert!(matches!(
            SourceFormat::from_path(Path::new("a.hpspool")),
            Err(SpoolbookError::UnsupportedFormat(_))
        ));
    }
}
