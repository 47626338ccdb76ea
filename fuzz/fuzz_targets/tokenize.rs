//! Tokenizing and classifying arbitrary statement text.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odbc_query::{ParseOptions, Query};

#[derive(Debug, Arbitrary)]
struct TokenizeInput {
    sql: String,
    batch_allowed: bool,
    escape_processing: bool,
}

fuzz_target!(|input: TokenizeInput| {
    let options = ParseOptions::default()
        .batch_allowed(input.batch_allowed)
        .escape_processing(input.escape_processing);
    let Ok(query) = Query::prepare(&input.sql, options) else {
        return;
    };

    let len = query.refined_bytes().len();
    assert!(query.token_offsets().iter().all(|&t| t < len));
    assert!(query.param_offsets().iter().all(|&p| query.refined_bytes()[p] == b'?'));
    for i in 0..query.sub_statements().len() {
        let _ = query.sub_statement_text(i);
    }
    let _ = query.cursor_name();
    let _ = query.returns_result();
});
