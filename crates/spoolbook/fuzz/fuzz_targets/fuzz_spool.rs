//! Fuzz target for the spool parser.
//!
//! Checks that arbitrary printer output never panics and that every emitted
//! row has the table's width.

#![no_main]

use libfuzzer_sys::fuzz_target;
use spoolbook::SpoolParser;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(table) = SpoolParser::new().parse_bytes(data) {
        let width = table.column_count();
        assert!(table.rows.iter().all(|row| row.len() == width));
    }
});
