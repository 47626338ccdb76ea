//! Driver error type.

use odbc_query::ParseError;
use odbc_types::ConversionError;
use thiserror::Error;

/// Errors returned by statement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The statement text could not be prepared.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A value could not be converted.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Invalid connection configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No statement text is available.
    #[error("no query has been prepared")]
    NoQuery,

    /// A parameter or column number is out of range.
    #[error("invalid descriptor index: {index}")]
    InvalidDescriptorIndex {
        /// The offending index.
        index: usize,
    },

    /// Not every parameter marker has a bound value.
    #[error("statement has {expected} parameter markers but {bound} are bound")]
    ParameterCountMismatch {
        /// Number of parameter markers.
        expected: usize,
        /// Number of bound parameters.
        bound: usize,
    },

    /// A data-at-execution parameter has not been supplied yet.
    #[error("parameter {index} needs data")]
    NeedData {
        /// The parameter waiting for data.
        index: usize,
    },

    /// A buffer could not be grown.
    #[error("memory allocation failure")]
    OutOfMemory,
}

impl Error {
    /// The SQLSTATE for this error.
    ///
    /// [`Error::NeedData`] is a status rather than a diagnostic and has none.
    #[must_use]
    pub fn sqlstate(&self) -> Option<&'static str> {
        match self {
            Self::Parse(e) => Some(e.sqlstate()),
            Self::Conversion(e) => Some(e.sqlstate()),
            Self::Config(_) => Some("HY000"),
            Self::NoQuery => Some("HY010"),
            Self::InvalidDescriptorIndex { .. } => Some("07009"),
            Self::ParameterCountMismatch { .. } => Some("07002"),
            Self::NeedData { .. } => None,
            Self::OutOfMemory => Some("HY001"),
        }
    }

    /// Whether the statement is waiting for deferred parameter data.
    #[must_use]
    pub fn is_need_data(&self) -> bool {
        matches!(self, Self::NeedData { .. })
    }
}

/// Result type for statement operations.
pub type Result<T> = std::result::Result<T, Error>;
