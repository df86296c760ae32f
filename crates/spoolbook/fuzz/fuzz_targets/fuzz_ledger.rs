//! Fuzz target for ledger parsing and value normalization.

#![no_main]

use libfuzzer_sys::fuzz_target;
use spoolbook::input::{decode_text, normalize_amount, normalize_date};
use spoolbook::LedgerLayout;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let text = decode_text(data);
    let table = LedgerLayout::integration().parse_text(&text);
    assert!(table.rows.iter().all(|row| row.len() == table.column_count()));

    for token in text.split_whitespace().take(100) {
        let _ = normalize_date(token);
        let _ = normalize_amount(token);
    }
});
