//! Split a table into partitions by a key derived from one of its columns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, SpoolbookError};
use crate::input::Table;
use crate::output::{TableSink, XlsxSink};

/// First digit of a category code.
static FIRST_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

/// Derives a classification key from a source column with a regex.
///
/// The key is the first capture group of the first match, or the whole match
/// when the pattern has no groups. Rows without a match get an empty key.
#[derive(Debug, Clone)]
pub struct ClassificationKey {
    /// Column the key is extracted from.
    pub source_column: String,
    /// Name of the column holding the derived key.
    pub derived_column: String,
    /// Extraction pattern.
    pub pattern: Regex,
}

impl ClassificationKey {
    /// Key on the first digit of `CLefCat`, stored in `Cbranche`.
    pub fn branch() -> Self {
        Self {
            source_column: "CLefCat".to_string(),
            derived_column: "Cbranche".to_string(),
            pattern: FIRST_DIGIT.clone(),
        }
    }

    /// Build a key from user-supplied names and pattern.
    pub fn new(
        source_column: impl Into<String>,
        derived_column: impl Into<String>,
        pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            source_column: source_column.into(),
            derived_column: derived_column.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Extract the key from one value.
    pub fn key_of(&self, value: &str) -> String {
        match self.pattern.captures(value) {
            Some(caps) => caps
                .get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Append the derived key column to `table`, replacing it if present.
    pub fn derive(&self, table: &mut Table) -> Result<()> {
        let source = table.column_index(&self.source_column).ok_or_else(|| {
            SpoolbookError::Config(format!(
                "Classification column '{}' not found",
                self.source_column
            ))
        })?;

        let keys: Vec<String> = table
            .column_values(source)
            .map(|v| self.key_of(v))
            .collect();

        match table.column_index(&self.derived_column) {
            Some(existing) => {
                for (row, key) in table.rows.iter_mut().zip(keys) {
                    row[existing] = key;
                }
            }
            None => table.push_column(self.derived_column.clone(), keys),
        }
        Ok(())
    }

    /// Group rows by the derived key, in sorted key order.
    ///
    /// Derives the key column first when it is missing. Rows with an empty
    /// key belong to no partition.
    pub fn partition(&self, table: &Table) -> Result<BTreeMap<String, Table>> {
        let mut keyed;
        let table = if table.column_index(&self.derived_column).is_some() {
            table
        } else {
            keyed = table.clone();
            self.derive(&mut keyed)?;
            &keyed
        };
        let key_index = table
            .column_index(&self.derived_column)
            .ok_or_else(|| SpoolbookError::Config("Derived column missing".to_string()))?;

        let mut partitions: BTreeMap<String, Table> = BTreeMap::new();
        let mut unkeyed = 0usize;
        for row in &table.rows {
            let key = &row[key_index];
            if key.is_empty() {
                unkeyed += 1;
                continue;
            }
            partitions
                .entry(key.clone())
                .or_insert_with(|| Table::new(table.headers.clone(), Vec::new()))
                .rows
                .push(row.clone());
        }

        if unkeyed > 0 {
            warn!(rows = unkeyed, column = %self.source_column, "rows without a classification key");
        }
        debug!(partitions = partitions.len(), "partitioned table");
        Ok(partitions)
    }
}

/// Write each partition to `out_dir/<prefix>_<key>.xlsx`.
///
/// Each workbook's sheets are named `<prefix>_<key>`, numbered with
/// `_part_<n>` when a partition exceeds the sink's sheet row limit. Path
/// separators and characters Excel rejects in names become `_`, so every
/// file lands directly in `out_dir`.
pub fn write_partitions(
    partitions: &BTreeMap<String, Table>,
    out_dir: impl AsRef<Path>,
    prefix: &str,
    sink: &XlsxSink,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    let mut written = Vec::with_capacity(partitions.len());

    for (key, table) in partitions {
        let name = partition_name(prefix, key);
        let sheet_sink = sink.clone().with_sheet_name(name.clone());
        let path = out_dir.join(format!("{}.{}", name, sheet_sink.extension()));
        written.push(sheet_sink.write(table, &path)?);
    }

    Ok(written)
}

/// `<prefix>_<key>` with separators and reserved characters replaced.
fn partition_name(prefix: &str, key: &str) -> String {
    format!("{}_{}", prefix, key)
        .chars()
        .map(|c| {
            if c.is_control() || "[]:*?/\\<>|\"".contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
