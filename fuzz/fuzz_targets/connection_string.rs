//! Connection string parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use odbc_client::{Config, Statement};

fuzz_target!(|data: &[u8]| {
    let Ok(conn_str) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = Config::from_connection_string(conn_str) {
        // A parsed configuration always yields a usable statement.
        assert!(Statement::new(&config).is_ok());
    }
});
