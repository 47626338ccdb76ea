//! Client-side parameter interpolation.
//!
//! Converted parameters are rendered as SQL literals and spliced into the
//! statement text at the parameter marker offsets found by the tokenizer.

use bytes::Bytes;
use odbc_query::Query;
use odbc_types::temporal::native_to_text;
use odbc_types::{Charset, ConversionError, NativeBinding, NativeType, NativeValue};

use crate::error::Error;

fn push_hex(bytes: &[u8], out: &mut Vec<u8>) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.extend_from_slice(b"X'");
    for b in bytes {
        out.push(HEX[usize::from(b >> 4)]);
        out.push(HEX[usize::from(b & 0x0f)]);
    }
    out.push(b'\'');
}

/// Append `bytes` as a quoted string literal, escaping the characters the
/// server treats specially inside quotes.
///
/// Multibyte characters of `charset` are copied whole, so a trail byte that
/// happens to equal a backslash is never escaped.
pub fn push_quoted(bytes: &[u8], charset: &Charset, out: &mut Vec<u8>) {
    out.push(b'\'');
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        let len = charset.ascii_trail_len(&bytes[i..]);
        if len > 1 {
            out.extend_from_slice(&bytes[i..i + len]);
            i += len;
            continue;
        }
        i += 1;
        match b {
            0 => out.extend_from_slice(b"\\0"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            0x1a => out.extend_from_slice(b"\\Z"),
            b'\\' | b'\'' | b'"' => {
                out.push(b'\\');
                out.push(b);
            }
            _ => out.push(b),
        }
    }
    out.push(b'\'');
}

fn push_bytes(native_type: NativeType, bytes: &[u8], charset: &Charset, out: &mut Vec<u8>) {
    match native_type {
        NativeType::NewDecimal | NativeType::Decimal => out.extend_from_slice(bytes),
        t if t.is_blob() || t == NativeType::Geometry => push_hex(bytes, out),
        _ => push_quoted(bytes, charset, out),
    }
}

/// Append the SQL literal for `binding`.
///
/// `long_data` is the deferred data of a data-at-execution parameter.
/// Text is escaped for the connection `charset`.
///
/// # Errors
///
/// [`ConversionError::NumericValueOutOfRange`] for NaN and infinite reals,
/// which have no literal form.
pub fn render_literal(
    binding: &NativeBinding<'_>,
    long_data: Option<&[u8]>,
    charset: &Charset,
    out: &mut Vec<u8>,
) -> Result<(), ConversionError> {
    match binding.value {
        NativeValue::Null => out.extend_from_slice(b"NULL"),
        NativeValue::Int(v) => out.extend_from_slice(v.to_string().as_bytes()),
        NativeValue::UInt(v) => out.extend_from_slice(v.to_string().as_bytes()),
        NativeValue::Float(v) if v.is_finite() => out.extend_from_slice(v.to_string().as_bytes()),
        NativeValue::Double(v) if v.is_finite() => out.extend_from_slice(v.to_string().as_bytes()),
        NativeValue::Float(_) | NativeValue::Double(_) => return Err(ConversionError::NumericValueOutOfRange),
        NativeValue::Time(tm) => push_quoted(native_to_text(&tm).as_bytes(), charset, out),
        NativeValue::Bytes(bytes) => push_bytes(binding.native_type, bytes, charset, out),
        NativeValue::LongData => match long_data {
            Some(bytes) => push_bytes(binding.native_type, bytes, charset, out),
            None => out.extend_from_slice(b"NULL"),
        },
    }
    Ok(())
}

/// Splice rendered `literals` into the statement at its parameter markers.
///
/// Statement separators terminated for batching are restored to `;`, so
/// the result is a single executable text.
///
/// # Errors
///
/// [`Error::ParameterCountMismatch`] unless there is exactly one literal
/// per marker.
pub fn interpolate(query: &Query, literals: &[Vec<u8>]) -> Result<Bytes, Error> {
    let markers = query.param_offsets();
    if markers.len() != literals.len() {
        return Err(Error::ParameterCountMismatch {
            expected: markers.len(),
            bound: literals.len(),
        });
    }

    let text = query.refined_bytes();
    let extra: usize = literals.iter().map(Vec::len).sum();
    let mut out = Vec::new();
    out.try_reserve(text.len() + extra).map_err(|_| Error::OutOfMemory)?;

    let mut pos = 0;
    for (&marker, literal) in markers.iter().zip(literals) {
        out.extend_from_slice(&text[pos..marker]);
        out.extend_from_slice(literal);
        pos = marker + 1;
    }
    out.extend_from_slice(&text[pos..]);

    if query.batch_allowed() {
        restore_separators(query, text, &mut out, markers, literals);
    }
    Ok(Bytes::from(out))
}

/// Put `;` back where sub-statements were terminated.
///
/// Terminators are the separator tokens the tokenizer overwrote with NUL.
/// Works on the spliced output, so each position is shifted by the length
/// change of every literal before it.
fn restore_separators(query: &Query, text: &[u8], out: &mut [u8], markers: &[usize], literals: &[Vec<u8>]) {
    let mut spliced = markers.iter().zip(literals).peekable();
    let mut shift: isize = 0;
    for &t in query.token_offsets() {
        if text.get(t) != Some(&0) {
            continue;
        }
        while let Some((_, literal)) = spliced.next_if(|&(&m, _)| m < t) {
            shift += literal.len() as isize - 1;
        }
        if let Some(slot) = t.checked_add_signed(shift).and_then(|p| out.get_mut(p)) {
            *slot = b';';
        }
    }
}
