//! # odbc-client
//!
//! Statement handling for an ODBC driver talking to SingleStore/MariaDB
//! servers, built on [`odbc_query`] and [`odbc_types`].
//!
//! A [`Statement`] prepares text (escape rewriting, tokenizing,
//! classification), marshals bound parameters through the conversion
//! engine, interpolates them into executable text, and converts fetched
//! result values into application buffers. Sending the text and reading
//! rows is left to the connection layer.
//!
//! ## Example
//!
//! ```rust
//! use odbc_client::{BoundValue, Config, Indicator, ParameterDescriptor, Statement};
//! use odbc_types::{ClientType, ClientValue, SqlType};
//!
//! let config = Config::from_connection_string("DSN=test;CHARSET=utf8mb4").unwrap();
//! let mut stmt = Statement::new(&config).unwrap();
//! stmt.prepare("SELECT {fn UCASE(name)} FROM t WHERE id = ?").unwrap();
//! stmt.bind_parameter(
//!     0,
//!     ParameterDescriptor::new(ClientType::SLong, SqlType::Integer)
//!         .value(BoundValue::new(ClientValue::Long(42), Indicator::Length(4))),
//! )
//! .unwrap();
//!
//! let execution = stmt.execute().unwrap();
//! let sql = execution.executable().next().unwrap();
//! assert_eq!(sql, b"SELECT UCASE(name) FROM t WHERE id = 42");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod interpolate;
pub mod marshal;
pub mod statement;

pub use config::{Config, DsnOptions};
pub use descriptor::{BoundValue, ColumnBinding, Indicator, ParameterDescriptor};
pub use error::{Error, Result};
pub use interpolate::{interpolate, render_literal};
pub use marshal::{BatchOutcome, Marshalled, MarshalledRow, marshal_parameter, marshal_row};
pub use statement::{ColumnData, Execution, RowFetch, Statement, StatementState};
