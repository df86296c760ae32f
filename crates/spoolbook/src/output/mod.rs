//! Output sinks for tables.

mod sink;

pub use sink::{create_parent_dir, ensure_extension, CsvSink, TableSink, XlsxSink, MAX_SHEET_DATA_ROWS};
