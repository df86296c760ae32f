//! CSV/TSV reader with delimiter detection.

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::error::{Result, SpoolbookError};
use super::source::{fit_row, positional_headers, read_source, SourceMetadata, Table};

/// Delimiters to try when auto-detecting, most preferred first.
const DELIMITERS: &[u8] = &[b';', b'\t', b',', b'|'];

/// Non-blank lines inspected when auto-detecting.
const SAMPLE_LINES: usize = 10;

/// Delimited reader configuration.
#[derive(Debug, Clone)]
pub struct DelimitedConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Quote character.
    pub quote: u8,
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            quote: b'"',
        }
    }
}

impl DelimitedConfig {
    /// Use a fixed delimiter instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Reads delimited text exports into tables.
pub struct DelimitedReader {
    config: DelimitedConfig,
}

impl DelimitedReader {
    /// Create a new reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: DelimitedConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: DelimitedConfig) -> Self {
        Self { config }
    }

    /// Read a file and return the table and metadata.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let contents = read_source(path)?;
        let text = decode_text(&contents);

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&text)?,
        };
        debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "reading delimited file");

        let table = self.parse_bytes(text.as_bytes(), delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        let metadata = SourceMetadata::new(path.to_path_buf(), &contents, format, &table);
        Ok((table, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        let headers = if self.config.has_header {
            if records.is_empty() {
                return Err(SpoolbookError::EmptyData("No header row found".to_string()));
            }
            records.remove(0)
        } else {
            positional_headers(records.first().map(|r| r.len()).unwrap_or(0))
        };

        if headers.is_empty() {
            return Err(SpoolbookError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let rows = records
            .into_iter()
            .map(|row| fit_row(row, expected_cols))
            .collect();

        Ok(Table::new(headers, rows))
    }
}

impl Default for DelimitedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode file bytes as UTF-8, falling back to Windows-1252 for legacy
/// exports (`€`, `œ` and typographic quotes live in 0x80..=0x9F there).
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Pick the delimiter whose count outside quotes agrees across the most
/// sample lines. Ties go to the earlier entry of [`DELIMITERS`], so a
/// semicolon export with decimal commas resolves to `;`.
fn detect_delimiter(text: &str) -> Result<u8> {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();

    let Some(header) = sample.first() else {
        return Err(SpoolbookError::EmptyData("No lines to analyze".to_string()));
    };

    let mut best: Option<(u8, usize)> = None;
    for &delimiter in DELIMITERS {
        let expected = count_unquoted(header, delimiter);
        if expected == 0 {
            continue;
        }
        let agreeing = sample
            .iter()
            .filter(|line| count_unquoted(line, delimiter) == expected)
            .count();
        if best.is_none_or(|(_, score)| agreeing > score) {
            best = Some((delimiter, agreeing));
        }
    }

    Ok(best.map(|(delimiter, _)| delimiter).unwrap_or(b','))
}

/// Occurrences of `delimiter` outside double-quoted sections.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let delimiter = delimiter as char;
    line.chars()
        .fold((0, false), |(count, quoted), ch| match ch {
            '"' => (count, !quoted),
            c if c == delimiter && !quoted => (count + 1, quoted),
            _ => (count, quoted),
        })
        .0
}
