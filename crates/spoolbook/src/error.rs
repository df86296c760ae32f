//! Error types for the Spoolbook library.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for Spoolbook operations.
#[derive(Debug, Error)]
pub enum SpoolbookError {
    /// The input path did not exist when the operation started.
    #[error("Source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Sanitizing and reconstructing the input produced no records.
    #[error("No data found in {}", describe_source(path.as_deref()))]
    NoDataFound { path: Option<PathBuf> },

    /// Two batch inputs map to the same output file.
    #[error("Output '{}' was already written by another input in this batch", path.display())]
    OutputCollision { path: PathBuf },

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error writing an xlsx workbook.
    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Error reading a spreadsheet workbook.
    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Invalid glob pattern for source discovery.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A discovered path could not be inspected.
    #[error("Discovery error: {0}")]
    Glob(#[from] glob::GlobError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Nothing to consolidate or convert.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SpoolbookError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SpoolbookError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach a source path to a `NoDataFound` raised on in-memory input.
    pub fn with_source_path(self, source: &Path) -> Self {
        match self {
            SpoolbookError::NoDataFound { path: None } => SpoolbookError::NoDataFound {
                path: Some(source.to_path_buf()),
            },
            other => other,
        }
    }
}

fn describe_source(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "input".to_string(),
    }
}

/// Result type alias for Spoolbook operations.
pub type Result<T> = std::result::Result<T, SpoolbookError>;
