//! Statement tokenizer.
//!
//! A single pass over the statement text records where every token starts,
//! where each sub-statement of a batch starts and what kind it is, and where
//! the `?` parameter markers are. Comments are blanked in place. When
//! batching is allowed, each statement-separating `;` is overwritten with a
//! NUL byte so every sub-statement can be read as a terminated string.

use crate::command::{QueryKind, classify};
use crate::scanner::{QuoteEscapes, blank_spaces_and_comments, is_quote, is_space, skip_quoted_run};

/// One statement of a (possibly multi-statement) batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubStatement {
    /// Byte offset of the statement's first token.
    pub start: usize,
    /// Classification of the statement.
    pub kind: QueryKind,
}

/// Positions recorded by [`tokenize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenIndex {
    /// Start offset of every token, in order.
    pub tokens: Vec<usize>,
    /// Every classified sub-statement, in order.
    pub sub_statements: Vec<SubStatement>,
    /// Offset of every `?` parameter marker, in order.
    pub params: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between tokens.
    Gap,
    /// Inside a token.
    Token,
}

/// Bytes that end an unquoted token.
pub(crate) const fn ends_token(b: u8) -> bool {
    matches!(b, b'?' | b'"' | b'\'' | b'`' | b'-' | b'#' | b'/' | b';') || is_space(b)
}

/// Position one past the end of the token starting at `start`.
pub(crate) fn token_end(text: &[u8], start: usize) -> usize {
    let Some(&first) = text.get(start) else {
        return start;
    };
    if is_quote(first) {
        return skip_quoted_run(text, start + 1, text.len(), first, QuoteEscapes::for_quote(first))
            .map_or(text.len(), |close| close + 1);
    }
    if matches!(first, b'?' | b';') {
        return start + 1;
    }
    let mut pos = start + 1;
    while pos < text.len() && text[pos] != 0 && !ends_token(text[pos]) {
        pos += 1;
    }
    pos
}

struct Tokenizer<'t> {
    text: &'t mut [u8],
    batch_allowed: bool,
    index: TokenIndex,
    stmt_tokens: usize,
    stmt_start: usize,
}

impl Tokenizer<'_> {
    fn current_kind(&self) -> Option<QueryKind> {
        if self.stmt_tokens >= 2 {
            self.index.sub_statements.last().map(|s| s.kind)
        } else {
            None
        }
    }

    /// Text from `start` up to the end of the current statement.
    fn statement_from(&self, start: usize) -> &[u8] {
        let rest = &self.text[start..];
        let end = rest.iter().position(|&b| b == b';' || b == 0).unwrap_or(rest.len());
        &rest[..end]
    }

    fn record_token(&mut self, pos: usize) {
        self.index.tokens.push(pos);
        self.stmt_tokens += 1;
        match self.stmt_tokens {
            1 => self.stmt_start = pos,
            2 => {
                let second = &self.text[pos..token_end(self.text, pos)];
                let kind = classify(self.statement_from(self.stmt_start), second);
                self.index.sub_statements.push(SubStatement {
                    start: self.stmt_start,
                    kind,
                });
            }
            _ => {
                let is_into = self.text[pos..token_end(self.text, pos)].eq_ignore_ascii_case(b"INTO");
                if let Some(last) = self.index.sub_statements.last_mut() {
                    if last.kind == QueryKind::Select && is_into {
                        last.kind = QueryKind::SelectInto;
                    }
                }
            }
        }
    }

    /// Records a statement that ended after its first token. A lone
    /// separator is an empty statement and is not recorded.
    fn finish_statement(&mut self) {
        let separator_only = matches!(self.text.get(self.stmt_start), Some(b';' | 0));
        if self.stmt_tokens == 1 && !separator_only {
            let kind = classify(self.statement_from(self.stmt_start), &[]);
            self.index.sub_statements.push(SubStatement {
                start: self.stmt_start,
                kind,
            });
        }
        self.stmt_tokens = 0;
    }

    fn run(mut self) -> TokenIndex {
        let end = self.text.len();
        let mut pos = 0;
        let mut state = State::Gap;

        while pos < end {
            if state == State::Token {
                if ends_token(self.text[pos]) {
                    state = State::Gap;
                } else {
                    pos += 1;
                }
                continue;
            }

            pos = blank_spaces_and_comments(self.text, pos);
            if pos >= end {
                break;
            }
            self.record_token(pos);
            state = State::Token;

            match self.text[pos] {
                quote if is_quote(quote) => {
                    match skip_quoted_run(self.text, pos + 1, end, quote, QuoteEscapes::for_quote(quote)) {
                        Some(close) => pos = close + 1,
                        None => {
                            // Unterminated: resume scanning right after the quote.
                            pos += 1;
                            state = State::Gap;
                        }
                    }
                }
                b'?' => {
                    self.index.params.push(pos);
                    state = State::Gap;
                    pos += 1;
                }
                b';' => {
                    if self.current_kind().is_none_or(QueryKind::splits_on_semicolon) {
                        if self.batch_allowed {
                            self.text[pos] = 0;
                        }
                        self.finish_statement();
                    }
                    state = State::Gap;
                    pos += 1;
                }
                _ => pos += 1,
            }
        }

        self.finish_statement();
        self.index
    }
}

/// Tokenizes `text` in place.
///
/// Comments are overwritten with spaces. When `batch_allowed` is set, every
/// `;` that separates statements is overwritten with a NUL byte. A `;` inside
/// a routine definition or compound block never separates statements.
pub fn tokenize(text: &mut [u8], batch_allowed: bool) -> TokenIndex {
    Tokenizer {
        text,
        batch_allowed,
        index: TokenIndex::default(),
        stmt_tokens: 0,
        stmt_start: 0,
    }
    .run()
}
