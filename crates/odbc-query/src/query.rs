//! The prepared query model.

use crate::command::QueryKind;
use crate::error::ParseError;
use crate::escape::{DEFAULT_MAX_DEPTH, EscapeTranslator, OdbcEscapes, Rewriter};
use crate::scanner::{skip_spaces_and_comments, trimmed_end, trimmed_start};
use crate::tokenizer::{SubStatement, TokenIndex, token_end, tokenize};

/// Options controlling how a statement is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether `;`-separated statements may be sent as one batch.
    pub batch_allowed: bool,
    /// Whether ODBC escape clauses are rewritten.
    pub escape_processing: bool,
    /// Maximum escape-clause nesting depth.
    pub max_escape_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            batch_allowed: false,
            escape_processing: true,
            max_escape_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Allow or forbid multi-statement batches.
    #[must_use]
    pub fn batch_allowed(mut self, allowed: bool) -> Self {
        self.batch_allowed = allowed;
        self
    }

    /// Enable or disable escape-clause rewriting.
    #[must_use]
    pub fn escape_processing(mut self, enabled: bool) -> Self {
        self.escape_processing = enabled;
        self
    }

    /// Set the maximum escape-clause nesting depth.
    #[must_use]
    pub fn max_escape_depth(mut self, depth: usize) -> Self {
        self.max_escape_depth = depth;
        self
    }
}

/// A statement after escape rewriting and tokenization.
///
/// All offsets (tokens, sub-statements, parameter markers) index into
/// [`Query::refined_bytes`]. The refined text has comments blanked and, when
/// batching is allowed, statement separators replaced by NUL bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    original: String,
    refined: Vec<u8>,
    index: TokenIndex,
    batch_allowed: bool,
}

impl Query {
    /// Rewrite and tokenize `sql` using the standard ODBC escape translator.
    pub fn prepare(sql: &str, options: ParseOptions) -> Result<Self, ParseError> {
        Self::prepare_with(sql, options, &OdbcEscapes)
    }

    /// Rewrite and tokenize `sql` using a custom escape translator.
    pub fn prepare_with<T: EscapeTranslator + ?Sized>(
        sql: &str,
        options: ParseOptions,
        translator: &T,
    ) -> Result<Self, ParseError> {
        let rewritten = if options.escape_processing {
            Rewriter::new(sql, translator)
                .max_depth(options.max_escape_depth)
                .rewrite()?
        } else {
            sql.to_string()
        };

        let bytes = rewritten.as_bytes();
        let end = trimmed_end(bytes);
        let start = trimmed_start(&bytes[..end]);
        let original = &rewritten[start..end];

        let query = Self::tokenize(original, options.batch_allowed)?;
        tracing::debug!(
            kind = %query.kind(),
            params = query.param_count(),
            statements = query.sub_statements().len(),
            "prepared query"
        );
        Ok(query)
    }

    /// Tokenize already-rewritten statement text.
    pub fn tokenize(text: &str, batch_allowed: bool) -> Result<Self, ParseError> {
        let bytes = text.as_bytes();
        let skip = skip_spaces_and_comments(bytes, 0);
        let mut refined = Vec::new();
        refined
            .try_reserve_exact(bytes.len() - skip)
            .map_err(|_| ParseError::OutOfMemory)?;
        refined.extend_from_slice(&bytes[skip..]);

        let index = tokenize(&mut refined, batch_allowed);
        Ok(Self {
            original: text.to_string(),
            refined,
            index,
            batch_allowed,
        })
    }

    /// The trimmed, rewritten statement text before tokenization.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The refined statement buffer.
    #[must_use]
    pub fn refined_bytes(&self) -> &[u8] {
        &self.refined
    }

    /// The refined statement text, with separators (if any) shown as NUL characters.
    #[must_use]
    pub fn refined_text(&self) -> &str {
        // Tokenization only overwrites ASCII bytes, so the buffer stays UTF-8.
        std::str::from_utf8(&self.refined).unwrap_or_default()
    }

    /// Whether the statement text is empty after trimming and comment removal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.tokens.is_empty()
    }

    /// Kind of the first sub-statement.
    #[must_use]
    pub fn kind(&self) -> QueryKind {
        self.index
            .sub_statements
            .first()
            .map(|s| s.kind)
            .unwrap_or_default()
    }

    /// Whether the text holds more than one statement.
    #[must_use]
    pub fn is_multi_statement(&self) -> bool {
        self.index.sub_statements.len() > 1
    }

    /// Whether separators were terminated for batch execution.
    #[must_use]
    pub fn batch_allowed(&self) -> bool {
        self.batch_allowed
    }

    /// Whether any sub-statement produces a result set.
    #[must_use]
    pub fn returns_result(&self) -> bool {
        self.index
            .sub_statements
            .iter()
            .any(|s| s.kind.returns_result())
    }

    /// All sub-statements in order.
    #[must_use]
    pub fn sub_statements(&self) -> &[SubStatement] {
        &self.index.sub_statements
    }

    /// Text of sub-statement `i`, up to its terminator.
    #[must_use]
    pub fn sub_statement_text(&self, i: usize) -> Option<&str> {
        let start = self.index.sub_statements.get(i)?.start;
        let end = match self.index.sub_statements.get(i + 1) {
            Some(next) => next.start,
            None => self.refined.len(),
        };
        let body = &self.refined[start..end];
        let body = match body.iter().position(|&b| b == 0) {
            Some(nul) => &body[..nul],
            None => body,
        };
        let body = &body[..trimmed_end(body)];
        std::str::from_utf8(body).ok()
    }

    /// Start offsets of all tokens.
    #[must_use]
    pub fn token_offsets(&self) -> &[usize] {
        &self.index.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.index.tokens.len()
    }

    /// Text of token `i`.
    #[must_use]
    pub fn token(&self, i: usize) -> Option<&str> {
        let start = *self.index.tokens.get(i)?;
        let end = token_end(&self.refined, start);
        std::str::from_utf8(&self.refined[start..end]).ok()
    }

    /// Whether token `i` equals `word`, ignoring ASCII case.
    #[must_use]
    pub fn token_eq(&self, i: usize, word: &str) -> bool {
        self.token(i).is_some_and(|t| t.eq_ignore_ascii_case(word))
    }

    /// Index of the first token equal to `word` at or after token `from`.
    #[must_use]
    pub fn find_token(&self, word: &str, from: usize) -> Option<usize> {
        (from..self.token_count()).find(|&i| self.token_eq(i, word))
    }

    /// Offsets of all `?` parameter markers.
    #[must_use]
    pub fn param_offsets(&self) -> &[usize] {
        &self.index.params
    }

    /// Number of `?` parameter markers.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.index.params.len()
    }

    /// Whether the statement has any parameter markers.
    #[must_use]
    pub fn has_parameters(&self) -> bool {
        !self.index.params.is_empty()
    }

    /// Cursor named by a `WHERE CURRENT OF <name>` clause.
    #[must_use]
    pub fn cursor_name(&self) -> Option<&str> {
        self.positioned_clause().map(|(_, name)| name)
    }

    /// Byte offset of the first `WHERE CURRENT OF` together with the cursor
    /// name.
    #[must_use]
    pub fn positioned_clause(&self) -> Option<(usize, &str)> {
        let n = self.token_count();
        (0..n.saturating_sub(3)).find_map(|w| {
            if self.token_eq(w, "WHERE") && self.token_eq(w + 1, "CURRENT") && self.token_eq(w + 2, "OF") {
                Some((self.index.tokens[w], self.token(w + 3)?))
            } else {
                None
            }
        })
    }
}
