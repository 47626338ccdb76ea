//! ODBC escape-sequence rewriting.
//!
//! Applications may embed `{ ... }` clauses such as `{d '2024-01-31'}`,
//! `{fn UCASE(name)}` or `{call proc(?)}` in their SQL. The [`Rewriter`]
//! finds every clause (innermost first), hands its body to an
//! [`EscapeTranslator`], and splices the translation back into the text.
//! Braces inside quoted strings and backtick identifiers are left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::scanner::{QuoteEscapes, is_quote, skip_quoted_run};

/// Default limit on escape-clause nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Translates the body of one escape clause into native SQL.
pub trait EscapeTranslator {
    /// Translate `clause`, the text between `{` and `}` with nested clauses
    /// already translated.
    fn translate(&self, clause: &str) -> Result<String, ParseError>;
}

impl<F> EscapeTranslator for F
where
    F: Fn(&str) -> Result<String, ParseError>,
{
    fn translate(&self, clause: &str) -> Result<String, ParseError> {
        self(clause)
    }
}

/// Rewrites every escape clause in a statement.
///
/// # Example
///
/// ```
/// use odbc_query::{OdbcEscapes, Rewriter};
///
/// let sql = Rewriter::new("SELECT {fn UCASE('a{b}')}", &OdbcEscapes).rewrite().unwrap();
/// assert_eq!(sql, "SELECT UCASE('a{b}')");
/// ```
pub struct Rewriter<'a, T: EscapeTranslator + ?Sized> {
    input: &'a str,
    pos: usize,
    translator: &'a T,
    max_depth: usize,
}

impl<'a, T: EscapeTranslator + ?Sized> Rewriter<'a, T> {
    /// Create a rewriter over `input`.
    pub fn new(input: &'a str, translator: &'a T) -> Self {
        Self {
            input,
            pos: 0,
            translator,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum escape-clause nesting depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Produce the rewritten statement.
    pub fn rewrite(mut self) -> Result<String, ParseError> {
        self.rewrite_level(0)
    }

    fn rewrite_level(&mut self, depth: usize) -> Result<String, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                max: self.max_depth,
            });
        }

        let input = self.input;
        let bytes = input.as_bytes();
        let mut out = String::new();
        if depth == 0 {
            out.try_reserve(bytes.len())
                .map_err(|_| ParseError::OutOfMemory)?;
        }
        let mut run_start = self.pos;

        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'{' => {
                    append(&mut out, &input[run_start..self.pos])?;
                    self.pos += 1;
                    let nested = self.rewrite_level(depth + 1)?;
                    append(&mut out, &nested)?;
                    run_start = self.pos;
                }
                b'}' => {
                    if depth == 0 {
                        return Err(ParseError::UnmatchedClosingBrace { position: self.pos });
                    }
                    append(&mut out, &input[run_start..self.pos])?;
                    self.pos += 1;
                    let translated = self.translator.translate(&out)?;
                    tracing::trace!(clause = %out, translated = %translated, depth, "translated escape clause");
                    return Ok(translated);
                }
                quote if is_quote(quote) => {
                    let close = skip_quoted_run(
                        bytes,
                        self.pos + 1,
                        bytes.len(),
                        quote,
                        QuoteEscapes::for_quote(quote),
                    );
                    self.pos = close.map_or(bytes.len(), |c| c + 1);
                }
                _ => self.pos += 1,
            }
        }

        if depth > 0 {
            return Err(ParseError::UnmatchedOpeningBrace);
        }
        append(&mut out, &input[run_start..])?;
        Ok(out)
    }
}

fn append(out: &mut String, s: &str) -> Result<(), ParseError> {
    out.try_reserve(s.len()).map_err(|_| ParseError::OutOfMemory)?;
    out.push_str(s);
    Ok(())
}

/// Rewrite `sql` with the standard ODBC translator and default depth limit.
pub fn rewrite(sql: &str) -> Result<String, ParseError> {
    Rewriter::new(sql, &OdbcEscapes).rewrite()
}

/// Translator for the standard ODBC escape clauses.
///
/// | Clause                | Translation            |
/// |-----------------------|------------------------|
/// | `d 'lit'`             | `DATE 'lit'`           |
/// | `t 'lit'`             | `TIME 'lit'`           |
/// | `ts 'lit'`            | `TIMESTAMP 'lit'`      |
/// | `fn f(...)`           | `f(...)`               |
/// | `oj ...`              | `...`                  |
/// | `call p(...)`         | `CALL p(...)`          |
/// | `?= call p(...)`      | `CALL p(...)`          |
/// | `escape 'c'`          | `ESCAPE 'c'`           |
/// | `interval ...`        | `INTERVAL ...`         |
/// | `guid 'lit'`          | `'lit'`                |
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcEscapes;

impl EscapeTranslator for OdbcEscapes {
    fn translate(&self, clause: &str) -> Result<String, ParseError> {
        let body = clause.trim();
        if let Some(rest) = body.strip_prefix('?') {
            if let Some(call) = rest.trim_start().strip_prefix('=') {
                return translate_call(body, call.trim_start());
            }
        }

        let (keyword, rest) = split_keyword(body);
        let invalid = || ParseError::InvalidEscape(body.to_string());
        match keyword.to_ascii_lowercase().as_str() {
            "d" => typed_literal("DATE", rest).ok_or_else(invalid),
            "t" => typed_literal("TIME", rest).ok_or_else(invalid),
            "ts" => typed_literal("TIMESTAMP", rest).ok_or_else(invalid),
            "guid" => is_string_literal(rest)
                .then(|| rest.to_string())
                .ok_or_else(invalid),
            "fn" if !rest.is_empty() => Ok(translate_function(rest)),
            "oj" if !rest.is_empty() => Ok(rest.to_string()),
            "call" if !rest.is_empty() => Ok(format!("CALL {rest}")),
            "escape" if !rest.is_empty() => Ok(format!("ESCAPE {rest}")),
            "interval" if !rest.is_empty() => Ok(format!("INTERVAL {rest}")),
            _ => Err(invalid()),
        }
    }
}

fn split_keyword(body: &str) -> (&str, &str) {
    let end = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    (&body[..end], body[end..].trim_start())
}

fn translate_call(body: &str, call: &str) -> Result<String, ParseError> {
    let (keyword, rest) = split_keyword(call);
    if keyword.eq_ignore_ascii_case("call") && !rest.is_empty() {
        Ok(format!("CALL {rest}"))
    } else {
        Err(ParseError::InvalidEscape(body.to_string()))
    }
}

fn is_string_literal(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'')
}

fn typed_literal(kind: &str, literal: &str) -> Option<String> {
    is_string_literal(literal).then(|| format!("{kind} {literal}"))
}

#[allow(clippy::expect_used)]
static TSI_INTERVAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bSQL_TSI_(FRAC_SECOND|SECOND|MINUTE|HOUR|DAY|WEEK|MONTH|QUARTER|YEAR)\b")
        .expect("interval pattern is valid")
});

#[allow(clippy::expect_used)]
static CONVERT_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^CONVERT\s*\((.*),\s*(SQL_[A-Z_]+)\s*\)$").expect("convert pattern is valid")
});

fn translate_function(call: &str) -> String {
    let call = TSI_INTERVAL.replace_all(call, |caps: &Captures<'_>| {
        let unit = caps[1].to_ascii_uppercase();
        if unit == "FRAC_SECOND" { "MICROSECOND".to_string() } else { unit }
    });

    if let Some(caps) = CONVERT_CALL.captures(&call) {
        if let Some(target) = cast_target(&caps[2]) {
            return format!("CONVERT({}, {target})", caps[1].trim_end());
        }
    }
    call.into_owned()
}

/// Native cast target for an ODBC `SQL_*` type name used in `{fn CONVERT(...)}`.
fn cast_target(odbc_type: &str) -> Option<&'static str> {
    let target = match odbc_type.to_ascii_uppercase().as_str() {
        "SQL_BIGINT" | "SQL_INTEGER" | "SQL_SMALLINT" | "SQL_TINYINT" | "SQL_BIT" => "SIGNED",
        "SQL_CHAR" | "SQL_VARCHAR" | "SQL_LONGVARCHAR" | "SQL_WCHAR" | "SQL_WVARCHAR"
        | "SQL_WLONGVARCHAR" => "CHAR",
        "SQL_DATE" | "SQL_TYPE_DATE" => "DATE",
        "SQL_TIME" | "SQL_TYPE_TIME" => "TIME",
        "SQL_TIMESTAMP" | "SQL_TYPE_TIMESTAMP" => "DATETIME",
        "SQL_DECIMAL" | "SQL_NUMERIC" => "DECIMAL",
        "SQL_DOUBLE" | "SQL_FLOAT" | "SQL_REAL" => "DOUBLE",
        "SQL_BINARY" | "SQL_VARBINARY" | "SQL_LONGVARBINARY" => "BINARY",
        _ => return None,
    };
    Some(target)
}
