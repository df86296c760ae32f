//! CLI command implementations.

pub mod batch;
pub mod consolidate;
pub mod convert;
pub mod partition;
pub mod view;

use std::path::Path;

use spoolbook::{CsvSink, TableSink, XlsxSink};

/// Pick a sink from the output extension: delimited text for .csv/.tsv,
/// xlsx otherwise.
pub(crate) fn sink_for(path: &Path) -> Box<dyn TableSink> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Box::new(CsvSink::new()),
        "tsv" => Box::new(CsvSink::tsv()),
        _ => Box::new(XlsxSink::new()),
    }
}
