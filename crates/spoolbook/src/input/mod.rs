//! Input readers and tabular data handling.

mod delimited;
mod discover;
mod format;
mod ledger;
mod source;
mod workbook;

pub use delimited::{decode_text, DelimitedConfig, DelimitedReader};
pub use discover::discover;
pub use format::{read_table, SourceFormat};
pub use ledger::{normalize_amount, normalize_date, quarter_tag, LedgerLayout};
pub use source::{content_hash, positional_headers, read_source, ColumnPolicy, SourceMetadata, Table};
pub use workbook::read_workbook;
