//! # odbc-query
//!
//! Client-side statement preparation for an ODBC driver talking to
//! SingleStore/MariaDB servers.
//!
//! This crate has no I/O. It turns application SQL into a form the server
//! accepts and records the structure the statement layer needs.
//!
//! ## Features
//!
//! - **Escape rewriting**: `{d ...}`, `{fn ...}`, `{call ...}` and friends,
//!   nested to any configured depth, with quoted text left untouched
//! - **Tokenization**: token and `?` parameter positions in one pass
//! - **Classification**: statement kind, result-set expectation and
//!   multi-statement batch splitting
//! - **Positioned updates**: `WHERE CURRENT OF <cursor>` detection
//!
//! ## Example
//!
//! ```rust
//! use odbc_query::{ParseOptions, Query, QueryKind};
//!
//! let query = Query::prepare(
//!     "SELECT * FROM orders WHERE placed > {d '2024-01-01'} AND id = ?",
//!     ParseOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(query.kind(), QueryKind::Select);
//! assert_eq!(query.param_count(), 1);
//! assert!(query.original().contains("DATE '2024-01-01'"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod command;
pub mod error;
pub mod escape;
pub mod query;
pub mod scanner;
pub mod tokenizer;

pub use command::{QueryKind, classify};
pub use error::ParseError;
pub use escape::{DEFAULT_MAX_DEPTH, EscapeTranslator, OdbcEscapes, Rewriter, rewrite};
pub use query::{ParseOptions, Query};
pub use tokenizer::{SubStatement, TokenIndex, tokenize};
