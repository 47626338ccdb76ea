//! Parsing server date/time text.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odbc_types::temporal::{native_to_text, native_to_timestamp, parse_temporal};

#[derive(Debug, Arbitrary)]
struct TemporalInput {
    text: Vec<u8>,
    interval: bool,
}

fuzz_target!(|input: TemporalInput| {
    if let Ok((tm, _)) = parse_temporal(&input.text, input.interval) {
        let _ = native_to_timestamp(&tm);
        let _ = native_to_text(&tm);
    }
});
