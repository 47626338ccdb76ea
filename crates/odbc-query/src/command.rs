//! Statement classification from leading keywords.

use std::fmt;

/// The kind of a (sub-)statement, decided from its first two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum QueryKind {
    /// Statement that produces no result set.
    #[default]
    NoResult,
    /// `SELECT` or `WITH`.
    Select,
    /// `SELECT ... INTO`.
    SelectInto,
    /// `INSERT` or `REPLACE`.
    Insert,
    /// `UPDATE`.
    Update,
    /// `DELETE`.
    Delete,
    /// `CALL`.
    Call,
    /// `SHOW`.
    Show,
    /// `ANALYZE`.
    Analyze,
    /// `EXPLAIN`.
    Explain,
    /// `CHECK`.
    Check,
    /// `EXECUTE`.
    Execute,
    /// `DESC` / `DESCRIBE`.
    Describe,
    /// `CREATE PROCEDURE`.
    CreateProc,
    /// `CREATE FUNCTION`.
    CreateFunc,
    /// `CREATE DEFINER=...`.
    CreateDefiner,
    /// `SET`.
    Set,
    /// `SET NAMES`.
    SetNames,
    /// `DO` anonymous code block.
    AnonymousCodeBlock,
    /// `BEGIN NOT ATOMIC` compound statement.
    NotAtomicBlock,
}

impl QueryKind {
    /// Whether executing a statement of this kind yields a result set.
    #[must_use]
    pub fn returns_result(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Call
                | Self::Show
                | Self::Analyze
                | Self::Explain
                | Self::Check
                | Self::Execute
                | Self::Describe
        )
    }

    /// Whether a `;` inside a statement of this kind separates statements.
    ///
    /// Routine definitions and compound blocks carry `;` in their bodies.
    #[must_use]
    pub fn splits_on_semicolon(self) -> bool {
        !matches!(
            self,
            Self::CreateProc
                | Self::CreateFunc
                | Self::CreateDefiner
                | Self::AnonymousCodeBlock
                | Self::NotAtomicBlock
        )
    }

    /// Short upper-case label used in log output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResult => "NO_RESULT",
            Self::Select => "SELECT",
            Self::SelectInto => "SELECT_INTO",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Call => "CALL",
            Self::Show => "SHOW",
            Self::Analyze => "ANALYZE",
            Self::Explain => "EXPLAIN",
            Self::Check => "CHECK",
            Self::Execute => "EXECUTE",
            Self::Describe => "DESCRIBE",
            Self::CreateProc => "CREATE_PROC",
            Self::CreateFunc => "CREATE_FUNC",
            Self::CreateDefiner => "CREATE_DEFINER",
            Self::Set => "SET",
            Self::SetNames => "SET_NAMES",
            Self::AnonymousCodeBlock => "ANONYMOUS_CODE_BLOCK",
            Self::NotAtomicBlock => "NOT_ATOMIC_BLOCK",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn starts_with_ignore_case(text: &[u8], prefix: &[u8]) -> bool {
    text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Classifies a statement from the text at its first and second tokens.
///
/// Both arguments run to the end of the statement buffer; only their
/// prefixes are compared, case-insensitively. Leading non-alphabetic bytes of
/// the first token are ignored.
#[must_use]
pub fn classify(first: &[u8], second: &[u8]) -> QueryKind {
    let skip = first.iter().position(u8::is_ascii_alphabetic).unwrap_or(first.len());
    let first = &first[skip..];
    let is = |kw: &[u8]| starts_with_ignore_case(first, kw);
    let next = |kw: &[u8]| starts_with_ignore_case(second, kw);

    if is(b"DO") {
        QueryKind::AnonymousCodeBlock
    } else if is(b"SELECT") || is(b"WITH") {
        QueryKind::Select
    } else if is(b"INSERT") || is(b"REPLACE") {
        QueryKind::Insert
    } else if is(b"UPDATE") {
        QueryKind::Update
    } else if is(b"DELETE") {
        QueryKind::Delete
    } else if is(b"CALL") {
        QueryKind::Call
    } else if is(b"SHOW") {
        QueryKind::Show
    } else if is(b"ANALYZE") {
        QueryKind::Analyze
    } else if is(b"EXPLAIN") {
        QueryKind::Explain
    } else if is(b"CHECK") {
        QueryKind::Check
    } else if is(b"EXECUTE") {
        QueryKind::Execute
    } else if is(b"CREATE") && next(b"PROCEDURE") {
        QueryKind::CreateProc
    } else if is(b"CREATE") && next(b"FUNCTION") {
        QueryKind::CreateFunc
    } else if is(b"CREATE") && next(b"DEFINER") {
        QueryKind::CreateDefiner
    } else if is(b"SET") {
        if next(b"NAMES") { QueryKind::SetNames } else { QueryKind::Set }
    } else if is(b"DESC") {
        QueryKind::Describe
    } else if is(b"BEGIN") && next(b"NOT") {
        QueryKind::NotAtomicBlock
    } else {
        QueryKind::NoResult
    }
}
