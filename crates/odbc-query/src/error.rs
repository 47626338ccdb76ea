//! Query parsing error types.

use thiserror::Error;

/// Errors that can occur while rewriting escape sequences or preparing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A `}` was found with no open escape clause.
    #[error("failed to find a pair for a closing curly bracket at offset {position}")]
    UnmatchedClosingBrace {
        /// Byte offset of the stray brace in the submitted text.
        position: usize,
    },

    /// The text ended while an escape clause was still open.
    #[error("failed to find a pair for an opening curly bracket")]
    UnmatchedOpeningBrace,

    /// Escape clauses are nested deeper than the configured limit.
    #[error("escape sequences nested deeper than {max} levels")]
    NestingTooDeep {
        /// Configured maximum nesting depth.
        max: usize,
    },

    /// The escape-clause translator did not recognize a clause.
    #[error("invalid escape sequence: {{{0}}}")]
    InvalidEscape(String),

    /// A buffer could not be grown.
    #[error("failed to allocate memory for the query string")]
    OutOfMemory,
}

impl ParseError {
    /// The SQLSTATE the statement layer reports for this error.
    #[must_use]
    pub fn sqlstate(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "HY001",
            _ => "42000",
        }
    }

    /// Whether this error is a syntax-class condition (as opposed to resource exhaustion).
    #[must_use]
    pub fn is_syntax_error(&self) -> bool {
        !matches!(self, Self::OutOfMemory)
    }
}
