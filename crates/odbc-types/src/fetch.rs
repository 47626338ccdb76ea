//! Native-to-client column conversion.
//!
//! Fetched values arrive as the engine's text (or, for BIT and BLOB columns,
//! raw bytes) and are stored into the application's bound buffer. The true
//! remaining length is always reported, even when the buffer was too small.

use crate::charset::Charset;
use crate::error::{Classification, ConversionError};
use crate::integer::{binary_to_integer, char_to_integer, parse_float_prefix};
use crate::native::{FieldMetadata, NativeTime, NativeTimeKind, NativeType};
use crate::numeric::numeric_from_text;
use crate::sql_type::ClientType;
use crate::temporal::{native_to_timestamp, parse_temporal};
use crate::value::{ClientValue, IntervalKind, IntervalStruct};

/// Where a fetched value is written.
#[derive(Debug)]
pub enum ColumnBuffer<'b> {
    /// Narrow text or binary bytes.
    Bytes(&'b mut [u8]),
    /// UTF-16 text.
    Wide(&'b mut [u16]),
    /// A fixed-size value.
    Value(&'b mut Option<ClientValue>),
}

/// What the application asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Client type to convert to.
    pub c_type: ClientType,
    /// Precision for NUMERIC targets.
    pub precision: u8,
    /// Scale for NUMERIC targets.
    pub scale: i8,
    /// Position already consumed by earlier chunked reads (bytes, or code
    /// units for wide text).
    pub offset: usize,
}

impl FetchRequest {
    /// A request for `c_type` from the start of the value.
    #[must_use]
    pub fn new(c_type: ClientType) -> Self {
        Self {
            c_type,
            precision: 0,
            scale: 0,
            offset: 0,
        }
    }

    /// Set precision and scale.
    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: i8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Set the read offset.
    #[must_use]
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Result of storing one fetched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// How the conversion went.
    pub classification: Classification,
    /// Length in bytes of the value from the requested offset on, before truncation.
    pub length: usize,
    /// Bytes (code units for wide text) of value data written, excluding any terminator.
    pub written: usize,
}

impl FetchOutcome {
    fn fixed(classification: Classification, length: usize) -> Self {
        Self {
            classification,
            length,
            written: length,
        }
    }
}

fn wrong_buffer(c_type: ClientType) -> ConversionError {
    ConversionError::InvalidTypeForConversion(format!("buffer does not match {}", c_type.name()))
}

/// Reverse the low (at most eight) bytes of a big-endian BIT value.
fn bit_to_le(value: &[u8]) -> Vec<u8> {
    value.iter().rev().take(8).copied().collect()
}

fn copy_bytes(value: &[u8], offset: usize, out: &mut [u8], terminate: bool) -> FetchOutcome {
    let remaining = value.get(offset..).unwrap_or_default();
    let room = if terminate { out.len().saturating_sub(1) } else { out.len() };
    let copy = remaining.len().min(room);
    out[..copy].copy_from_slice(&remaining[..copy]);
    if terminate && copy < out.len() {
        out[copy] = 0;
    }
    FetchOutcome {
        classification: if remaining.len() > room {
            Classification::StringDataTruncated
        } else {
            Classification::Success
        },
        length: remaining.len(),
        written: copy,
    }
}

fn copy_wide(units: &[u16], offset: usize, out: &mut [u16]) -> FetchOutcome {
    let remaining = units.get(offset..).unwrap_or_default();
    let room = out.len().saturating_sub(1);
    let copy = remaining.len().min(room);
    out[..copy].copy_from_slice(&remaining[..copy]);
    if copy < out.len() {
        out[copy] = 0;
    }
    FetchOutcome {
        classification: if remaining.len() > room {
            Classification::StringDataTruncated
        } else {
            Classification::Success
        },
        length: remaining.len() * 2,
        written: copy,
    }
}

fn temporal_value(tm: &NativeTime, c_type: ClientType) -> Result<(ClientValue, Classification), ConversionError> {
    let ts = native_to_timestamp(tm);
    if tm.year > i16::MAX as u32 {
        return Err(ConversionError::field_overflow("year"));
    }
    let converted = match c_type {
        ClientType::Date => {
            let dropped = tm.hour != 0 || tm.minute != 0 || tm.second != 0 || tm.microsecond != 0;
            let classification = if dropped {
                Classification::FractionalTruncation
            } else {
                Classification::Success
            };
            (ClientValue::Date(ts.date()), classification)
        }
        ClientType::Time => {
            let classification = if tm.microsecond != 0 {
                Classification::FractionalTruncation
            } else {
                Classification::Success
            };
            (ClientValue::Time(ts.time()), classification)
        }
        _ => (ClientValue::Timestamp(ts), Classification::Success),
    };
    Ok(converted)
}

fn interval_value(tm: &NativeTime, c_type: ClientType) -> (ClientValue, Classification) {
    let kind = if c_type == ClientType::IntervalHourToMinute {
        IntervalKind::HourToMinute
    } else {
        IntervalKind::HourToSecond
    };
    let mut classification = Classification::Success;
    let (second, fraction) = match kind {
        IntervalKind::HourToMinute => {
            if tm.second != 0 || tm.microsecond != 0 {
                classification = Classification::FractionalTruncation;
            }
            (0, 0)
        }
        IntervalKind::HourToSecond => (tm.second, tm.microsecond.saturating_mul(1000)),
    };
    let value = IntervalStruct {
        kind,
        negative: tm.negative,
        hour: tm.hour,
        minute: tm.minute,
        second,
        fraction,
    };
    (ClientValue::Interval(value), classification)
}

/// Convert one fetched column value into the application's buffer.
///
/// `value` holds the native bytes of the whole field; `request.offset`
/// selects where a chunked read resumes.
///
/// # Errors
///
/// [`ConversionError::InvalidTypeForConversion`] when `buffer` does not suit
/// `request.c_type`; parse failures of NUMERIC and temporal text.
pub fn fetch_value(
    field: &FieldMetadata,
    value: &[u8],
    request: &FetchRequest,
    charset: &Charset,
    buffer: ColumnBuffer<'_>,
) -> Result<FetchOutcome, ConversionError> {
    let c_type = request.c_type;
    let outcome = match (c_type, buffer) {
        (ClientType::Char, ColumnBuffer::Bytes(out)) => copy_bytes(value, request.offset, out, true),
        (ClientType::Binary, ColumnBuffer::Bytes(out)) => copy_bytes(value, request.offset, out, false),
        (ClientType::WChar, ColumnBuffer::Wide(out)) => {
            let units = charset.decode_to_utf16(value);
            copy_wide(&units, request.offset, out)
        }
        (ClientType::Char | ClientType::Binary | ClientType::WChar, _) => return Err(wrong_buffer(c_type)),
        (_, ColumnBuffer::Value(slot)) => {
            let (converted, classification) = fetch_fixed(field, value, request)?;
            let length = converted.octet_length();
            *slot = Some(converted);
            FetchOutcome::fixed(classification, length)
        }
        _ => return Err(wrong_buffer(c_type)),
    };

    tracing::trace!(
        native_type = ?field.native_type,
        c_type = c_type.name(),
        length = outcome.length,
        classification = ?outcome.classification,
        "fetched column"
    );
    Ok(outcome)
}

fn fetch_fixed(
    field: &FieldMetadata,
    value: &[u8],
    request: &FetchRequest,
) -> Result<(ClientValue, Classification), ConversionError> {
    let c_type = request.c_type;
    if c_type.integer_layout().is_some() {
        return match field.native_type {
            NativeType::Bit => binary_to_integer(&bit_to_le(value), request.offset, c_type),
            t if t.is_binary_encoded() => binary_to_integer(value, request.offset, c_type),
            _ => char_to_integer(value, c_type),
        };
    }
    match c_type {
        ClientType::Float => {
            let (v, _) = parse_float_prefix(value);
            Ok((ClientValue::Float(v as f32), Classification::Success))
        }
        ClientType::Double => {
            let (v, _) = parse_float_prefix(value);
            Ok((ClientValue::Double(v), Classification::Success))
        }
        ClientType::Numeric => {
            let text = std::str::from_utf8(value).map_err(|_| ConversionError::InvalidCharacterValue)?;
            let (n, classification) = numeric_from_text(text, request.precision, request.scale)?;
            Ok((ClientValue::Numeric(n), classification))
        }
        ClientType::Date | ClientType::Time | ClientType::Timestamp => {
            let (tm, _) = parse_temporal(value, false)?;
            temporal_value(&tm, c_type)
        }
        ClientType::IntervalHourToMinute | ClientType::IntervalHourToSecond => {
            let (tm, _) = parse_temporal(value, true)?;
            if matches!(tm.kind, NativeTimeKind::Date | NativeTimeKind::DateTime) {
                return Err(ConversionError::InvalidCharacterValue);
            }
            Ok(interval_value(&tm, c_type))
        }
        other => Err(wrong_buffer(other)),
    }
}
