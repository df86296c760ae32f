//! Accounting integration ledger layout.
//!
//! Integration exports are single-space-delimited text with a fixed sequence
//! of positional columns and no header row. Two of those positions are always
//! blank padding (a doubled space in the file) and are dropped on read.
//! Dates and amounts are rewritten to a canonical text form so ledgers from
//! different periods stack cleanly.

use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use super::delimited::decode_text;
use super::source::{fit_row, read_source, SourceMetadata, Table};

/// Quarter tag embedded in integration file names, e.g. `2T23`.
static QUARTER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\dT\d{2})").unwrap());

/// Column layout of a ledger export.
#[derive(Debug, Clone)]
pub struct LedgerLayout {
    /// Positional column names in file order.
    pub columns: Vec<String>,
    /// Prefix marking padding columns to drop.
    pub padding_prefix: String,
    /// Column holding `dd/mm/YYYY` dates.
    pub date_column: String,
    /// Column holding amounts with `,` thousands separators.
    pub amount_column: String,
    /// Columns the consolidated ledger is sorted by.
    pub sort_by: Vec<String>,
}

impl LedgerLayout {
    /// Layout of the quarterly accounting integration exports.
    pub fn integration() -> Self {
        let columns = [
            "DATE",
            "SPACE1",
            "REFERENCE",
            "AFFAIRE",
            "COMPTE",
            "CODE",
            "DESCRIPTION",
            "PERIODE",
            "SPACE2",
            "CODE_JOURNAL",
            "NUM_PIECE",
            "MONTANT",
            "CODE_TIERS",
            "NUM_OPERATION",
            "TYPE_MVT",
            "STATUT",
        ];

        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            padding_prefix: "SPACE".to_string(),
            date_column: "DATE".to_string(),
            amount_column: "MONTANT".to_string(),
            sort_by: vec!["DATE".to_string(), "REFERENCE".to_string()],
        }
    }

    /// Read one ledger file, normalizing dates and amounts and tagging each
    /// row with its source file and quarter.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let contents = read_source(path)?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut table = self.parse_text(&decode_text(&contents));
        let quarter = quarter_tag(&file_name).unwrap_or_default();
        let rows = table.row_count();
        table.push_column("SOURCE_FILE", std::iter::repeat_n(file_name.clone(), rows));
        table.push_column("TRIMESTRE", std::iter::repeat_n(quarter, rows));

        debug!(path = %path.display(), rows, "read ledger");
        let metadata = SourceMetadata::new(path.to_path_buf(), &contents, "ledger", &table);
        Ok((table, metadata))
    }

    /// Parse ledger text into a table with padding columns removed.
    pub fn parse_text(&self, text: &str) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.starts_with(&self.padding_prefix))
            .map(|(i, _)| i)
            .collect();
        let headers: Vec<String> = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let date_idx = headers.iter().position(|h| *h == self.date_column);
        let amount_idx = headers.iter().position(|h| *h == self.amount_column);

        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let fields: Vec<String> = line.trim_end().split(' ').map(str::to_string).collect();
                let fields = fit_row(fields, self.columns.len());
                let mut row: Vec<String> = keep.iter().map(|&i| fields[i].clone()).collect();
                if let Some(i) = date_idx {
                    row[i] = normalize_date(&row[i]).unwrap_or_default();
                }
                if let Some(i) = amount_idx {
                    row[i] = normalize_amount(&row[i]).unwrap_or_default();
                }
                row
            })
            .collect();

        Table::new(headers, rows)
    }

    /// Sort rows by the layout's sort columns. Stable; missing columns are ignored.
    pub fn sort(&self, table: &mut Table) {
        let keys: Vec<usize> = self
            .sort_by
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();
        table.rows.sort_by(|a, b| {
            keys.iter()
                .map(|&k| a[k].cmp(&b[k]))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// `dd/mm/YYYY` to ISO `YYYY-mm-dd`.
pub fn normalize_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Strip thousands separators and render the amount as a plain decimal.
pub fn normalize_amount(value: &str) -> Option<String> {
    let cleaned = value.trim().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.to_string())
}

/// Quarter tag (`\dT\d{2}`) found in a file name.
pub fn quarter_tag(file_name: &str) -> Option<String> {
    QUARTER_TAG
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}
