//! Spoolbook: turn line-printer spool captures and tabular exports into
//! spreadsheets.
//!
//! The core is a spool parser that rebuilds rows from printer output with no
//! delimiters. Around it sit readers for delimited ledgers and workbooks, a
//! consolidator that stacks many exports into one table, and a partitioner
//! that splits a table by a derived classification key.
//!
//! # Core Principles
//!
//! - **Forward-only**: raw bytes → clean lines → records → table → file
//! - **Fail fast per file**: a conversion either returns a table or an error
//! - **Batch isolation**: batch runs report each file's outcome instead of
//!   stopping or swallowing failures
//!
//! # Example
//!
//! ```no_run
//! use spoolbook::SpoolParser;
//!
//! let parser = SpoolParser::new();
//! let conversion = parser.convert("ETAT.hpspool", "out/ETAT.xlsx").unwrap();
//!
//! println!("Rows: {}", conversion.table.row_count());
//! println!("Columns: {}", conversion.table.column_count());
//! ```

pub mod batch;
pub mod error;
pub mod input;
pub mod output;
pub mod spool;
pub mod transform;

pub use batch::{convert_batch, BatchItem, BatchOptions, BatchReport, ItemOutcome};
pub use error::{Result, SpoolbookError};
pub use input::{
    discover, read_table, ColumnPolicy, DelimitedConfig, DelimitedReader, LedgerLayout,
    SourceMetadata, Table,
};
pub use output::{CsvSink, TableSink, XlsxSink};
pub use spool::{Conversion, SpoolConfig, SpoolParser};
pub use transform::{write_partitions, ClassificationKey, ColumnLayout, Consolidation, Consolidator};
