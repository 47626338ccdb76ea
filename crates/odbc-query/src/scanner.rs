//! Byte-level scanning primitives shared by the escape rewriter and the tokenizer.
//!
//! Every delimiter recognised here is ASCII, so positions returned by these
//! functions never fall inside a multi-byte UTF-8 sequence.

/// How backslashes are treated inside a quoted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteEscapes {
    /// A backslash makes the following byte literal.
    Backslash,
    /// Backslashes are ordinary bytes (backtick identifiers).
    None,
}

impl QuoteEscapes {
    /// Escape rules for a run opened by `quote`.
    #[must_use]
    pub const fn for_quote(quote: u8) -> Self {
        if quote == b'`' { Self::None } else { Self::Backslash }
    }
}

/// Whether `b` opens a quoted run.
#[must_use]
pub const fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

/// Whitespace as classified by the C locale.
#[must_use]
pub const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Scans a quoted run whose opening quote sits just before `start`.
///
/// Returns the position of the closing quote, or `None` if `end` is reached
/// first. A trailing backslash at the very end is tolerated.
#[must_use]
pub fn skip_quoted_run(
    text: &[u8],
    start: usize,
    end: usize,
    quote: u8,
    escapes: QuoteEscapes,
) -> Option<usize> {
    let end = end.min(text.len());
    let mut pos = start;
    while pos < end {
        let b = text[pos];
        if b == quote {
            return Some(pos);
        }
        if b == b'\\' && escapes == QuoteEscapes::Backslash {
            pos += 1;
            if pos == end {
                break;
            }
        }
        pos += 1;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns the position just past a comment that starts at `pos`, or `pos`
/// unchanged when no comment starts there.
///
/// `--` and `#` comments end after the next newline, `/* */` comments after
/// the closing marker. An unterminated comment extends to the end of text.
#[must_use]
pub fn skip_comment(text: &[u8], pos: usize) -> usize {
    let Some(rest) = text.get(pos..) else {
        return pos;
    };
    let (open, close): (usize, &[u8]) = if rest.starts_with(b"--") {
        (2, b"\n")
    } else if rest.starts_with(b"#") {
        (1, b"\n")
    } else if rest.starts_with(b"/*") {
        (2, b"*/")
    } else {
        return pos;
    };
    match find(&rest[open..], close) {
        Some(i) => pos + open + i + close.len(),
        None => text.len(),
    }
}

/// Returns the first non-whitespace position at or after `pos`.
#[must_use]
pub fn skip_whitespace(text: &[u8], mut pos: usize) -> usize {
    while pos < text.len() && is_space(text[pos]) {
        pos += 1;
    }
    pos
}

/// Skips any interleaving of whitespace and comments starting at `pos`.
#[must_use]
pub fn skip_spaces_and_comments(text: &[u8], mut pos: usize) -> usize {
    loop {
        let before = pos;
        pos = skip_comment(text, pos);
        pos = skip_whitespace(text, pos);
        if pos == before || pos >= text.len() {
            return pos.min(text.len());
        }
    }
}

/// Like [`skip_spaces_and_comments`], but overwrites every skipped comment
/// with spaces so later scans see plain whitespace.
pub fn blank_spaces_and_comments(text: &mut [u8], mut pos: usize) -> usize {
    loop {
        let before = pos;
        let after_comment = skip_comment(text, pos);
        if after_comment > pos {
            text[pos..after_comment].fill(b' ');
        }
        pos = skip_whitespace(text, after_comment);
        if pos == before || pos >= text.len() {
            return pos.min(text.len());
        }
    }
}

/// Length of `text` once trailing whitespace and statement terminators are removed.
#[must_use]
pub fn trimmed_end(text: &[u8]) -> usize {
    let mut end = text.len();
    while end > 0 && (is_space(text[end - 1]) || text[end - 1] == b';') {
        end -= 1;
    }
    end
}

/// Position of the first non-whitespace byte.
#[must_use]
pub fn trimmed_start(text: &[u8]) -> usize {
    skip_whitespace(text, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_run_with_escapes() {
        let text = br"'it\'s' rest";
        assert_eq!(skip_quoted_run(text, 1, text.len(), b'\'', QuoteEscapes::Backslash), Some(6));
    }

    #[test]
    fn test_backtick_run_ignores_backslash() {
        let text = br"`a\` x";
        assert_eq!(skip_quoted_run(text, 1, text.len(), b'`', QuoteEscapes::None), Some(3));
    }

    #[test]
    fn test_unterminated_run_with_trailing_backslash() {
        let text = br"'abc\";
        assert_eq!(skip_quoted_run(text, 1, text.len(), b'\'', QuoteEscapes::Backslash), None);
    }

    #[test]
    fn test_comment_kinds() {
        assert_eq!(skip_comment(b"-- x\nSELECT", 0), 5);
        assert_eq!(skip_comment(b"# x\nSELECT", 0), 4);
        assert_eq!(skip_comment(b"/* x */SELECT", 0), 7);
        assert_eq!(skip_comment(b"/* open", 0), 7);
        assert_eq!(skip_comment(b"SELECT", 0), 0);
        assert_eq!(skip_comment(b"- 1", 0), 0);
    }

    #[test]
    fn test_skip_spaces_and_comments_interleaved() {
        let text = b"  /* a */ -- b\n  # c\n SELECT";
        let pos = skip_spaces_and_comments(text, 0);
        assert_eq!(&text[pos..], b"SELECT");
    }

    #[test]
    fn test_blank_overwrites_comments() {
        let mut text = b"/*x*/ SELECT".to_vec();
        let pos = blank_spaces_and_comments(&mut text, 0);
        assert_eq!(pos, 6);
        assert_eq!(&text, b"      SELECT");
    }

    #[test]
    fn test_trim() {
        assert_eq!(trimmed_end(b"SELECT 1 ;; \n"), 8);
        assert_eq!(trimmed_start(b" \t SELECT"), 3);
        assert_eq!(trimmed_end(b" ; "), 0);
    }
}
