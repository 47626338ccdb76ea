//! Integer and real number extraction from native field values.
//!
//! Parsing follows the C library contract the engine's text protocol was
//! designed around: leading whitespace and a sign are skipped, the longest
//! digit prefix is consumed, and anything after it is reported, not rejected.
//! Out-of-range results are narrowed by truncation, never saturated.

use crate::error::{Classification, ConversionError};
use crate::sql_type::ClientType;
use crate::value::ClientValue;

fn skip_space(text: &[u8]) -> usize {
    text.iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(text.len())
}

/// Parse a leading integer with `strtoll`/`strtoull` semantics.
///
/// Returns the value and the number of bytes consumed (zero when no digits
/// were found). Signed parsing clamps to `i64` bounds; unsigned parsing wraps
/// a leading `-` and clamps to `u64::MAX`, then reinterprets the bits as `i64`.
#[must_use]
pub fn parse_integer_prefix(text: &[u8], unsigned: bool) -> (i64, usize) {
    let mut pos = skip_space(text);
    let negative = match text.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut magnitude: u64 = 0;
    let mut overflow = false;
    while let Some(b) = text.get(pos).filter(|b| b.is_ascii_digit()) {
        match magnitude.checked_mul(10).and_then(|m| m.checked_add(u64::from(b - b'0'))) {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
        pos += 1;
    }
    if pos == digits_start {
        return (0, 0);
    }

    let value = if unsigned {
        let m = if overflow { u64::MAX } else { magnitude };
        let m = if negative && !overflow { m.wrapping_neg() } else { m };
        m as i64
    } else if negative {
        if overflow || magnitude > i64::MIN.unsigned_abs() {
            i64::MIN
        } else {
            0i64.wrapping_sub_unsigned(magnitude)
        }
    } else if overflow || magnitude > i64::MAX as u64 {
        i64::MAX
    } else {
        magnitude as i64
    };
    (value, pos)
}

/// Parse a leading real number with `strtod` semantics.
///
/// Returns the value and the number of bytes consumed (zero when nothing
/// numeric was found).
#[must_use]
pub fn parse_float_prefix(text: &[u8]) -> (f64, usize) {
    let start = skip_space(text);
    let mut pos = start;
    if matches!(text.get(pos), Some(b'-' | b'+')) {
        pos += 1;
    }
    let digit_run = |mut p: usize| {
        while text.get(p).is_some_and(u8::is_ascii_digit) {
            p += 1;
        }
        p
    };

    let int_end = digit_run(pos);
    let mut end = int_end;
    let mut mantissa_digits = int_end - pos;
    if text.get(end) == Some(&b'.') {
        let frac_end = digit_run(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return (0.0, 0);
    }
    if matches!(text.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(text.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_end = digit_run(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    let value = std::str::from_utf8(&text[start..end])
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    (value, end)
}

/// Narrow `value` into the integer client type `target`.
///
/// Returns the stored value and whether `value` was inside the target's
/// range. 64-bit targets are never range-checked.
///
/// # Errors
///
/// [`ConversionError::InvalidTypeForConversion`] if `target` is not an
/// integer type.
pub fn narrow_integer(value: i64, target: ClientType) -> Result<(ClientValue, bool), ConversionError> {
    let (stored, in_range) = match target {
        ClientType::STinyInt => (ClientValue::TinyInt(value as i8), i8::try_from(value).is_ok()),
        ClientType::UTinyInt => (ClientValue::UTinyInt(value as u8), u8::try_from(value).is_ok()),
        ClientType::Bit => (ClientValue::Bit(value as u8), u8::try_from(value).is_ok()),
        ClientType::SShort => (ClientValue::Short(value as i16), i16::try_from(value).is_ok()),
        ClientType::UShort => (ClientValue::UShort(value as u16), u16::try_from(value).is_ok()),
        ClientType::SLong => (ClientValue::Long(value as i32), i32::try_from(value).is_ok()),
        ClientType::ULong => (ClientValue::ULong(value as u32), u32::try_from(value).is_ok()),
        ClientType::SBigInt => (ClientValue::BigInt(value), true),
        ClientType::UBigInt => (ClientValue::UBigInt(value as u64), true),
        other => {
            return Err(ConversionError::InvalidTypeForConversion(format!(
                "{} is not an integer type",
                other.name()
            )));
        }
    };
    Ok((stored, in_range))
}

/// Convert native integer text into `target`.
///
/// Trailing characters after the number are
/// [`Classification::FractionalTruncation`]; a value outside the target
/// range is [`Classification::NumericValueOutOfRange`]. In both cases the
/// narrowed value is still produced.
///
/// # Errors
///
/// [`ConversionError::InvalidTypeForConversion`] for a non-integer target.
pub fn char_to_integer(
    text: &[u8],
    target: ClientType,
) -> Result<(ClientValue, Classification), ConversionError> {
    let unsigned = target.integer_layout().is_some_and(|(_, signed)| !signed);
    let (value, consumed) = parse_integer_prefix(text, unsigned);

    let mut classification = Classification::Success;
    if consumed < text.len() {
        classification = Classification::FractionalTruncation;
    }
    let (stored, in_range) = narrow_integer(value, target)?;
    if !in_range {
        classification = classification.worst(Classification::NumericValueOutOfRange);
    }
    Ok((stored, classification))
}

/// Copy raw little-endian bytes starting at `offset` into `target`.
///
/// At most the target's width is copied; more remaining bytes than that is
/// [`Classification::StringDataTruncated`].
///
/// # Errors
///
/// [`ConversionError::InvalidTypeForConversion`] for a non-integer target.
pub fn binary_to_integer(
    bytes: &[u8],
    offset: usize,
    target: ClientType,
) -> Result<(ClientValue, Classification), ConversionError> {
    let (width, _) = target.integer_layout().ok_or_else(|| {
        ConversionError::InvalidTypeForConversion(format!("{} is not an integer type", target.name()))
    })?;
    let remaining = bytes.get(offset..).unwrap_or_default();
    let copy = remaining.len().min(width);
    let mut raw = [0u8; 8];
    raw[..copy].copy_from_slice(&remaining[..copy]);

    let classification = if remaining.len() > width {
        Classification::StringDataTruncated
    } else {
        Classification::Success
    };
    let value = i64::from_le_bytes(raw);
    let (stored, _) = narrow_integer(value, target)?;
    Ok((stored, classification))
}

/// Reduce character text to a single bit value.
///
/// The text is read as a real number: outside `[0, 1]` is
/// [`Classification::NumericValueOutOfRange`], strictly between 0 and 1 is
/// [`Classification::FractionalTruncation`], and trailing characters are
/// [`Classification::InvalidCharacterValue`]. Any non-zero number yields 1.
#[must_use]
pub fn char_to_bit(text: &[u8]) -> (u8, Classification) {
    let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
    let text = &text[..end];
    let (number, consumed) = parse_float_prefix(text);

    let classification = if !(0.0..=1.0).contains(&number) {
        Classification::NumericValueOutOfRange
    } else if number != 0.0 && number != 1.0 {
        Classification::FractionalTruncation
    } else if consumed < text.len() {
        Classification::InvalidCharacterValue
    } else {
        Classification::Success
    };
    (u8::from(number != 0.0), classification)
}

/// Render an integer client value as decimal text.
#[must_use]
pub fn integer_to_text(value: &ClientValue) -> Option<String> {
    let text = match value {
        ClientValue::Bit(v) | ClientValue::UTinyInt(v) => v.to_string(),
        ClientValue::TinyInt(v) => v.to_string(),
        ClientValue::Short(v) => v.to_string(),
        ClientValue::UShort(v) => v.to_string(),
        ClientValue::Long(v) => v.to_string(),
        ClientValue::ULong(v) => v.to_string(),
        ClientValue::BigInt(v) => v.to_string(),
        ClientValue::UBigInt(v) => v.to_string(),
        _ => return None,
    };
    Some(text)
}
