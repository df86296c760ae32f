//! Table sinks: write a rectangular table to a file.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::{Result, SpoolbookError};
use crate::input::Table;

/// Data rows an xlsx worksheet can hold below its header row.
pub const MAX_SHEET_DATA_ROWS: usize = 1_048_575;

/// Longest worksheet name Excel accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// A destination for tables.
///
/// Implementations create missing parent directories, overwrite any existing
/// file, and return the path actually written, which may differ from the
/// requested one when the extension is coerced.
pub trait TableSink {
    /// File extension this sink produces, without the dot.
    fn extension(&self) -> &str;

    /// Write the table to `path`.
    fn write(&self, table: &Table, path: &Path) -> Result<PathBuf>;
}

/// Replace the extension of `path` with `extension` unless it already matches
/// (case-insensitively).
pub fn ensure_extension(path: &Path, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false);

    if matches {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SpoolbookError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Writes `.xlsx` workbooks, splitting tables that exceed the worksheet row
/// limit across numbered sheets.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    /// Worksheet name; becomes `<name>_part_<n>` when the table is split.
    pub sheet_name: String,
    /// Data rows per worksheet.
    pub max_rows_per_sheet: usize,
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            max_rows_per_sheet: MAX_SHEET_DATA_ROWS,
        }
    }
}

impl XlsxSink {
    /// Create a sink with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base worksheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the number of data rows per worksheet (clamped to the xlsx limit).
    pub fn with_max_rows_per_sheet(mut self, rows: usize) -> Self {
        self.max_rows_per_sheet = rows.clamp(1, MAX_SHEET_DATA_ROWS);
        self
    }

    /// Names of the sheets a table of `rows` data rows is written to.
    pub fn sheet_names(&self, rows: usize) -> Vec<String> {
        let per_sheet = self.max_rows_per_sheet.max(1);
        let parts = rows.div_ceil(per_sheet).max(1);
        if parts == 1 {
            return vec![sheet_label(&self.sheet_name)];
        }
        (1..=parts)
            .map(|n| {
                let suffix = format!("_part_{}", n);
                let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
                let base: String = sheet_label(&self.sheet_name).chars().take(keep).collect();
                format!("{}{}", base, suffix)
            })
            .collect()
    }
}

impl TableSink for XlsxSink {
    fn extension(&self) -> &str {
        "xlsx"
    }

    fn write(&self, table: &Table, path: &Path) -> Result<PathBuf> {
        let path = ensure_extension(path, self.extension());
        create_parent_dir(&path)?;

        let mut workbook = Workbook::new();
        let per_sheet = self.max_rows_per_sheet.max(1);
        let names = self.sheet_names(table.row_count());

        for (part, name) in names.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;

            for (col, header) in table.headers.iter().enumerate() {
                worksheet.write_string(0, col as u16, header)?;
            }

            let start = part * per_sheet;
            let end = (start + per_sheet).min(table.row_count());
            for (offset, row) in table.rows[start..end].iter().enumerate() {
                let row_num = (offset + 1) as u32;
                for (col, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        worksheet.write_string(row_num, col as u16, value)?;
                    }
                }
            }
        }

        workbook.save(&path)?;
        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            sheets = names.len(),
            "wrote workbook"
        );
        Ok(path)
    }
}

/// Writes delimited text files.
#[derive(Debug, Clone)]
pub struct CsvSink {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSink {
    /// Create a comma-delimited sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tab-delimited sink.
    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl TableSink for CsvSink {
    fn extension(&self) -> &str {
        if self.delimiter == b'\t' { "tsv" } else { "csv" }
    }

    fn write(&self, table: &Table, path: &Path) -> Result<PathBuf> {
        let path = ensure_extension(path, self.extension());
        create_parent_dir(&path)?;

        let file = File::create(&path).map_err(|e| SpoolbookError::io(&path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(BufWriter::new(file));

        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| SpoolbookError::io(&path, e))?;

        info!(path = %path.display(), rows = table.row_count(), "wrote delimited file");
        Ok(path)
    }
}

/// Worksheet names cannot contain `[]:*?/\`.
fn sheet_label(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_extension_replaces_suffix() {
        assert_eq!(ensure_extension(Path::new("out.txt"), "xlsx"), PathBuf::from("out.xlsx"));
        assert_eq!(ensure_extension(Path::new("dir/out"), "xlsx"), PathBuf::from("dir/out.xlsx"));
        assert_eq!(ensure_extension(Path::new("out.XLSX"), "xlsx"), PathBuf::from("out.XLSX"));
        assert_eq!(
            ensure_extension(Path::new("report.2023.txt"), "xlsx"),
            PathBuf::from("report.2023.xlsx")
        );
    }

    #[test]
    fn test_sheet_names_single_and_split() {
        let sink = XlsxSink::new().with_sheet_name("branch_3").with_max_rows_per_sheet(2);

        assert_eq!(sink.sheet_names(0), vec!["branch_3"]);
        assert_eq!(sink.sheet_names(2), vec!["branch_3"]);
        assert_eq!(
            sink.sheet_names(5),
            vec!["branch_3_part_1", "branch_3_part_2", "branch_3_part_3"]
        );
    }

    #[test]
    fn test_sheet_names_respect_length_limit() {
        let sink = XlsxSink::new()
            .with_sheet_name("a_very_long_sheet_name_for_a_partition")
            .with_max_rows_per_sheet(1);

        let names = sink.sheet_names(3);
        for name in &names {
            assert!(name.chars().count() <= MAX_SHEET_NAME_LEN);
        }
        assert!(names[0].ends_with("_part_1"));
        assert!(names[2].ends_with("_part_3"));
        assert_eq!(sheet_label("a/b"), "a_b");
    }

    #[test]
    fn test_csv_sink_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "x,y".into()]],
        );

        let written = CsvSink::new().write(&table, &target).unwrap();
        assert_eq!(written, dir.path().join("nested").join("out.csv"));
        let first = fs::read_to_string(&written).unwrap();
        assert_eq!(first, "a,b\n1,\"x,y\"\n");

        CsvSink::new().write(&table, &target).unwrap();
        assert_eq!(fs::read_to_string(&written).unwrap(), first);
    }
}
