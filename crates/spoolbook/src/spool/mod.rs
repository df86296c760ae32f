//! Line-printer spool ingestion.
//!
//! A spool capture is printer output with no delimiters: form feeds and
//! ANSI escapes mixed into fixed-layout text, and logical rows that wrap onto
//! indented continuation lines. Conversion runs three forward-only stages:
//!
//! 1. [`sanitize`] strips control sequences and blank lines, recording which
//!    lines were indented before trimming.
//! 2. [`reconstruct`] folds continuation lines into the record above them.
//! 3. [`SpoolParser`] fits the records to a fixed column count and writes
//!    them to a sink.

mod parser;
mod reconstruct;
mod sanitize;

pub use parser::{view, Conversion, ListedLine, SpoolConfig, SpoolListing, SpoolParser};
pub use reconstruct::{reconstruct, LogicalRecord};
pub use sanitize::{
    decode_ignoring_invalid, sanitize, sanitize_line, split_lines, strip_controls, CleanLine,
};
