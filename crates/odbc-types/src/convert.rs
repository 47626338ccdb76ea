//! Client-to-native parameter conversion.
//!
//! A bound client value is turned into the native representation sent to
//! the engine. Values that need reformatting (wide text, numerics, temporal
//! text) are rendered into the parameter's [`ScratchBuffer`]; everything else
//! is borrowed from the client value directly.

use crate::charset::Charset;
use crate::error::{Classification, ConversionError};
use crate::integer::char_to_bit;
use crate::native::{NativeTime, NativeTimeKind, NativeType};
use crate::numeric::numeric_to_text;
use crate::sql_type::{ClientType, SqlType};
use crate::temporal::{
    date_to_text, native_to_timestamp, parse_temporal, time_to_text, timestamp_to_native,
    timestamp_to_text, validate_for_target,
};
use crate::value::{ClientValue, DateStruct, IntervalKind, TimestampStruct};

/// Driver-owned buffer holding a reformatted parameter value.
///
/// The buffer is replaced, never leaked, when a larger size is needed or a
/// rebind is requested.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, size: usize, rebind: bool) -> Result<(), ConversionError> {
        if rebind || self.buf.capacity() < size {
            let mut fresh = Vec::new();
            fresh
                .try_reserve_exact(size)
                .map_err(|_| ConversionError::OutOfMemory)?;
            self.buf = fresh;
        }
        self.buf.clear();
        Ok(())
    }

    /// Replace the contents with `bytes`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::OutOfMemory`] if the buffer cannot be grown.
    pub fn store(&mut self, bytes: &[u8], rebind: bool) -> Result<&[u8], ConversionError> {
        self.prepare(bytes.len(), rebind)?;
        self.buf.extend_from_slice(bytes);
        Ok(&self.buf)
    }

    /// Current contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Allocated capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Free the allocation.
    pub fn release(&mut self) {
        self.buf = Vec::new();
    }
}

/// Declared SQL type of the parameter being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamTarget {
    /// SQL type.
    pub sql_type: SqlType,
    /// Precision (numeric targets).
    pub precision: u8,
    /// Scale (numeric targets).
    pub scale: i8,
}

impl ParamTarget {
    /// A target of `sql_type` with zero precision and scale.
    #[must_use]
    pub fn new(sql_type: SqlType) -> Self {
        Self {
            sql_type,
            precision: 0,
            scale: 0,
        }
    }

    /// Set precision and scale.
    #[must_use]
    pub fn with_precision(mut self, precision: u8, scale: i8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }
}

/// Native representation of one parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeValue<'a> {
    /// SQL NULL.
    Null,
    /// Text or binary bytes.
    Bytes(&'a [u8]),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Single-precision real.
    Float(f32),
    /// Double-precision real.
    Double(f64),
    /// Date, time or date-time.
    Time(NativeTime),
    /// Value supplied later in pieces.
    LongData,
}

/// A native value together with the type it is sent as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeBinding<'a> {
    /// Native type tag.
    pub native_type: NativeType,
    /// Whether integer values are unsigned.
    pub is_unsigned: bool,
    /// The value.
    pub value: NativeValue<'a>,
}

impl<'a> NativeBinding<'a> {
    /// SQL NULL.
    #[must_use]
    pub fn null() -> Self {
        Self {
            native_type: NativeType::Null,
            is_unsigned: false,
            value: NativeValue::Null,
        }
    }

    /// Text sent as a string.
    #[must_use]
    pub fn text(bytes: &'a [u8]) -> Self {
        Self {
            native_type: NativeType::String,
            is_unsigned: false,
            value: NativeValue::Bytes(bytes),
        }
    }

    /// Deferred data for a parameter of client type `c_type`.
    #[must_use]
    pub fn long_data(c_type: ClientType) -> Self {
        let (native_type, is_unsigned) = native_type_for(c_type);
        Self {
            native_type,
            is_unsigned,
            value: NativeValue::LongData,
        }
    }

    /// Length in bytes of the bound value.
    #[must_use]
    pub fn length(&self) -> usize {
        match self.value {
            NativeValue::Null | NativeValue::LongData => 0,
            NativeValue::Bytes(b) => b.len(),
            NativeValue::Int(_) | NativeValue::UInt(_) => self.native_type.fixed_width().unwrap_or(8),
            NativeValue::Float(_) => 4,
            NativeValue::Double(_) => 8,
            NativeValue::Time(_) => std::mem::size_of::<NativeTime>(),
        }
    }
}

/// A converted parameter with its outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion<'a> {
    /// What to send.
    pub binding: NativeBinding<'a>,
    /// How the conversion went.
    pub classification: Classification,
}

/// Connection-level settings a conversion depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionContext {
    /// Character set wide text is transcoded to.
    pub charset: Charset,
    /// Date used when a time-only value is bound to a TIMESTAMP target.
    pub default_date: DateStruct,
}

impl ConversionContext {
    /// A context for `charset`, with today's date as the default date.
    #[must_use]
    pub fn new(charset: Charset) -> Self {
        Self {
            charset,
            default_date: today(),
        }
    }

    /// Set the default date.
    #[must_use]
    pub fn default_date(mut self, date: DateStruct) -> Self {
        self.default_date = date;
        self
    }
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::new(Charset::utf8())
    }
}

#[cfg(feature = "chrono")]
fn today() -> DateStruct {
    DateStruct::try_from(chrono::Local::now().date_naive()).unwrap_or_default()
}

#[cfg(not(feature = "chrono"))]
fn today() -> DateStruct {
    DateStruct::default()
}

/// Native type and signedness used to send values of `c_type`.
#[must_use]
pub fn native_type_for(c_type: ClientType) -> (NativeType, bool) {
    match c_type {
        ClientType::Char | ClientType::WChar => (NativeType::String, false),
        ClientType::Binary => (NativeType::Blob, false),
        ClientType::Bit | ClientType::UTinyInt => (NativeType::Tiny, true),
        ClientType::STinyInt => (NativeType::Tiny, false),
        ClientType::SShort => (NativeType::Short, false),
        ClientType::UShort => (NativeType::Short, true),
        ClientType::SLong => (NativeType::Long, false),
        ClientType::ULong => (NativeType::Long, true),
        ClientType::SBigInt => (NativeType::LongLong, false),
        ClientType::UBigInt => (NativeType::LongLong, true),
        ClientType::Float => (NativeType::Float, false),
        ClientType::Double => (NativeType::Double, false),
        ClientType::Numeric => (NativeType::NewDecimal, false),
        ClientType::Date => (NativeType::Date, false),
        ClientType::Time | ClientType::IntervalHourToMinute | ClientType::IntervalHourToSecond => {
            (NativeType::Time, false)
        }
        ClientType::Timestamp => (NativeType::Timestamp, false),
    }
}

/// Check that values of `source` may be bound to a column of `target` at all.
///
/// # Errors
///
/// [`ConversionError::RestrictedDataType`] for date/time sources bound to
/// interval targets.
pub fn conversion_supported(source: ClientType, target: SqlType) -> Result<(), ConversionError> {
    if source.is_datetime() && target.is_interval() {
        return Err(ConversionError::RestrictedDataType {
            from: source.name(),
            to: "SQL_INTERVAL",
        });
    }
    Ok(())
}

fn scalar(c_type: ClientType, value: NativeValue<'_>) -> NativeBinding<'_> {
    let (native_type, is_unsigned) = native_type_for(c_type);
    NativeBinding {
        native_type,
        is_unsigned,
        value,
    }
}

fn rendered<'a>(
    native_type: NativeType,
    text: &str,
    scratch: &'a mut ScratchBuffer,
    rebind: bool,
) -> Result<NativeBinding<'a>, ConversionError> {
    Ok(NativeBinding {
        native_type,
        is_unsigned: false,
        value: NativeValue::Bytes(scratch.store(text.as_bytes(), rebind)?),
    })
}

fn timestamp_binding(ts: &TimestampStruct, target: SqlType) -> NativeTime {
    let mut tm = timestamp_to_native(ts);
    match target {
        SqlType::Date => {
            tm.kind = NativeTimeKind::Date;
            tm.hour = 0;
            tm.minute = 0;
            tm.second = 0;
            tm.microsecond = 0;
        }
        SqlType::Time => {
            tm.kind = NativeTimeKind::Time;
            tm.year = 0;
            tm.month = 0;
            tm.day = 0;
            tm.microsecond = 0;
        }
        _ => {}
    }
    tm
}

/// Convert one bound parameter value for `target`.
///
/// `rebind` forces the scratch buffer to be reallocated.
///
/// # Errors
///
/// Numeric overflow and temporal validity failures abort the conversion;
/// see [`ConversionError`]. Text and binary sources never fail here.
pub fn convert_parameter<'a>(
    value: &'a ClientValue,
    target: &ParamTarget,
    ctx: &ConversionContext,
    scratch: &'a mut ScratchBuffer,
    rebind: bool,
) -> Result<Conversion<'a>, ConversionError> {
    let c_type = value.client_type();
    conversion_supported(c_type, target.sql_type)?;
    let sql_type = target.sql_type;
    let mut classification = Classification::Success;

    let binding = match value {
        ClientValue::WChar(units) => {
            let bytes = ctx.charset.encode_utf16(units)?;
            NativeBinding {
                native_type: NativeType::String,
                is_unsigned: false,
                value: NativeValue::Bytes(scratch.store(&bytes, rebind)?),
            }
        }
        ClientValue::Char(bytes) | ClientValue::Binary(bytes) if sql_type == SqlType::Bit => {
            let (bit, outcome) = char_to_bit(bytes);
            classification = outcome;
            NativeBinding {
                native_type: NativeType::Tiny,
                is_unsigned: true,
                value: NativeValue::UInt(u64::from(bit)),
            }
        }
        ClientValue::Char(bytes) | ClientValue::Binary(bytes) if sql_type.is_datetime() => {
            let (tm, time_only) = parse_temporal(bytes, false)?;
            validate_for_target(
                &native_to_timestamp(&tm),
                sql_type,
                time_only,
                ConversionError::InvalidCharacterValue,
            )?;
            NativeBinding::text(bytes)
        }
        ClientValue::Char(bytes) => NativeBinding::text(bytes),
        ClientValue::Binary(bytes) => scalar(c_type, NativeValue::Bytes(bytes)),
        ClientValue::Numeric(n) => {
            let (text, outcome) = numeric_to_text(n, target.precision, target.scale)?;
            classification = outcome;
            rendered(NativeType::NewDecimal, &text, scratch, rebind)?
        }
        ClientValue::Timestamp(ts) if sql_type.is_character() => {
            rendered(NativeType::String, &timestamp_to_text(ts, SqlType::Timestamp)?, scratch, rebind)?
        }
        ClientValue::Timestamp(ts) => {
            validate_for_target(
                ts,
                sql_type,
                false,
                ConversionError::datetime_format("date fields are missing"),
            )?;
            let tm = timestamp_binding(ts, sql_type);
            NativeBinding {
                native_type: tm.native_type(),
                is_unsigned: false,
                value: NativeValue::Time(tm),
            }
        }
        ClientValue::Time(t) if sql_type.is_character() => {
            rendered(NativeType::String, &time_to_text(t)?, scratch, rebind)?
        }
        ClientValue::Time(t) => {
            if matches!(sql_type, SqlType::Time | SqlType::Timestamp) && !t.is_valid() {
                return Err(ConversionError::datetime_format("invalid time"));
            }
            let mut tm = NativeTime {
                hour: u32::from(t.hour),
                minute: u32::from(t.minute),
                second: u32::from(t.second),
                kind: NativeTimeKind::Time,
                ..NativeTime::default()
            };
            if sql_type == SqlType::Timestamp {
                let d = ctx.default_date;
                tm.year = u32::from(d.year.unsigned_abs());
                tm.month = u32::from(d.month);
                tm.day = u32::from(d.day);
                tm.kind = NativeTimeKind::DateTime;
            }
            NativeBinding {
                native_type: tm.native_type(),
                is_unsigned: false,
                value: NativeValue::Time(tm),
            }
        }
        ClientValue::Date(d) if sql_type.is_character() => {
            rendered(NativeType::String, &date_to_text(d), scratch, rebind)?
        }
        ClientValue::Date(d) => {
            let tm = NativeTime {
                year: u32::from(d.year.unsigned_abs()),
                month: u32::from(d.month),
                day: u32::from(d.day),
                kind: NativeTimeKind::Date,
                ..NativeTime::default()
            };
            scalar(c_type, NativeValue::Time(tm))
        }
        ClientValue::Interval(iv) => {
            let tm = NativeTime {
                hour: iv.hour,
                minute: iv.minute,
                second: if iv.kind == IntervalKind::HourToSecond { iv.second } else { 0 },
                negative: iv.negative,
                kind: NativeTimeKind::Time,
                ..NativeTime::default()
            };
            scalar(c_type, NativeValue::Time(tm))
        }
        ClientValue::Bit(v) | ClientValue::UTinyInt(v) => scalar(c_type, NativeValue::UInt(u64::from(*v))),
        ClientValue::TinyInt(v) => scalar(c_type, NativeValue::Int(i64::from(*v))),
        ClientValue::Short(v) => scalar(c_type, NativeValue::Int(i64::from(*v))),
        ClientValue::UShort(v) => scalar(c_type, NativeValue::UInt(u64::from(*v))),
        ClientValue::Long(v) => scalar(c_type, NativeValue::Int(i64::from(*v))),
        ClientValue::ULong(v) => scalar(c_type, NativeValue::UInt(u64::from(*v))),
        ClientValue::BigInt(v) => scalar(c_type, NativeValue::Int(*v)),
        ClientValue::UBigInt(v) => scalar(c_type, NativeValue::UInt(*v)),
        ClientValue::Float(v) => scalar(c_type, NativeValue::Float(*v)),
        ClientValue::Double(v) => scalar(c_type, NativeValue::Double(*v)),
    };

    tracing::trace!(
        c_type = c_type.name(),
        sql_type = ?sql_type,
        native_type = ?binding.native_type,
        length = binding.length(),
        ?classification,
        "converted parameter"
    );
    Ok(Conversion {
        binding,
        classification,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::value::{IntervalStruct, NumericStruct, TimeStruct};

    fn ctx() -> ConversionContext {
        ConversionContext::default().default_date(DateStruct {
            year: 2024,
            month: 6,
            day: 30,
        })
    }

    fn convert<'a>(
        value: &'a ClientValue,
        target: ParamTarget,
        scratch: &'a mut ScratchBuffer,
    ) -> Result<Conversion<'a>, ConversionError> {
        convert_parameter(value, &target, &ctx(), scratch, false)
    }

    #[test]
    fn test_scratch_reallocation() {
        let mut s = ScratchBuffer::new();
        s.store(b"abc", false).unwrap();
        let cap = s.capacity();
        s.store(b"x", false).unwrap();
        assert_eq!(s.capacity(), cap);
        assert_eq!(s.as_bytes(), b"x");
        s.store(&[b'y'; 64], false).unwrap();
        assert!(s.capacity() >= 64);
        s.store(b"z", true).unwrap();
        assert_eq!(s.as_bytes(), b"z");
        s.release();
        assert_eq!(s.capacity(), 0);
    }

    #[test]
    fn test_numeric_rendering() {
        let v = ClientValue::Numeric(NumericStruct::from_magnitude(0, 0, true, 12345));
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Decimal).with_precision(5, 2), &mut s).unwrap();
        assert_eq!(c.binding.value, NativeValue::Bytes(b"123.45"));
        assert_eq!(c.binding.native_type, NativeType::NewDecimal);
        assert_eq!(c.classification, Classification::Success);
    }

    #[test]
    fn test_numeric_overflow_aborts() {
        let v = ClientValue::Numeric(NumericStruct::from_magnitude(0, 0, true, 123_456));
        let mut s = ScratchBuffer::new();
        let err = convert(&v, ParamTarget::new(SqlType::Decimal).with_precision(3, 2), &mut s).unwrap_err();
        assert_eq!(err, ConversionError::NumericValueOutOfRange);
    }

    #[test]
    fn test_timestamp_into_time_with_fraction() {
        let v = ClientValue::Timestamp(TimestampStruct {
            year: 2020,
            month: 1,
            day: 1,
            hour: 1,
            minute: 2,
            second: 3,
            fraction: 500,
        });
        let mut s = ScratchBuffer::new();
        assert!(matches!(
            convert(&v, ParamTarget::new(SqlType::Time), &mut s),
            Err(ConversionError::InvalidDatetimeFormat { .. })
        ));
    }

    #[test]
    fn test_timestamp_into_date_with_hour() {
        let v = ClientValue::Timestamp(TimestampStruct {
            year: 2020,
            month: 1,
            day: 1,
            hour: 1,
            ..TimestampStruct::default()
        });
        let mut s = ScratchBuffer::new();
        assert!(matches!(
            convert(&v, ParamTarget::new(SqlType::Date), &mut s),
            Err(ConversionError::InvalidDatetimeFormat { .. })
        ));
    }

    #[test]
    fn test_timestamp_shaped_by_target() {
        let v = ClientValue::Timestamp(TimestampStruct {
            year: 2020,
            month: 1,
            day: 2,
            ..TimestampStruct::default()
        });
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Date), &mut s).unwrap();
        assert_eq!(c.binding.native_type, NativeType::Date);
    }

    #[test]
    fn test_time_into_timestamp_gets_default_date() {
        let v = ClientValue::Time(TimeStruct {
            hour: 10,
            minute: 20,
            second: 30,
        });
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Timestamp), &mut s).unwrap();
        let NativeValue::Time(tm) = c.binding.value else {
            panic!("expected a temporal binding");
        };
        assert_eq!((tm.year, tm.month, tm.day), (2024, 6, 30));
        assert_eq!(tm.hour, 10);
        assert_eq!(c.binding.native_type, NativeType::Timestamp);
    }

    #[test]
    fn test_invalid_time_rejected() {
        let v = ClientValue::Time(TimeStruct {
            hour: 24,
            minute: 0,
            second: 0,
        });
        let mut s = ScratchBuffer::new();
        assert!(convert(&v, ParamTarget::new(SqlType::Time), &mut s).is_err());
    }

    #[test]
    fn test_temporal_into_interval_is_restricted() {
        let v = ClientValue::Date(DateStruct::default());
        let mut s = ScratchBuffer::new();
        assert!(matches!(
            convert(&v, ParamTarget::new(SqlType::IntervalHourToSecond), &mut s),
            Err(ConversionError::RestrictedDataType { .. })
        ));
    }

    #[test]
    fn test_temporal_into_character_renders_text() {
        let v = ClientValue::Date(DateStruct {
            year: 2021,
            month: 3,
            day: 4,
        });
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::VarChar), &mut s).unwrap();
        assert_eq!(c.binding.value, NativeValue::Bytes(b"2021-3-4"));
    }

    #[test]
    fn test_char_to_bit_target() {
        let v = ClientValue::Char(b"2".to_vec());
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Bit), &mut s).unwrap();
        assert_eq!(c.binding.value, NativeValue::UInt(1));
        assert_eq!(c.classification, Classification::NumericValueOutOfRange);
    }

    #[test]
    fn test_char_into_datetime_is_validated() {
        let mut s = ScratchBuffer::new();
        let v = ClientValue::Char(b"2020-01-01 10:00:00".to_vec());
        let c = convert(&v, ParamTarget::new(SqlType::Timestamp), &mut s).unwrap();
        assert_eq!(c.binding.native_type, NativeType::String);

        let v = ClientValue::Char(b"2020-00-01".to_vec());
        assert_eq!(
            convert(&v, ParamTarget::new(SqlType::Date), &mut s).unwrap_err(),
            ConversionError::InvalidCharacterValue
        );
    }

    #[test]
    fn test_wide_text_transcoded() {
        let v = ClientValue::WChar("héllo".encode_utf16().collect());
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::WVarChar), &mut s).unwrap();
        assert_eq!(c.binding.value, NativeValue::Bytes("héllo".as_bytes()));
    }

    #[test]
    fn test_interval_drops_seconds_for_hour_to_minute() {
        let v = ClientValue::Interval(IntervalStruct {
            kind: IntervalKind::HourToMinute,
            negative: false,
            hour: 5,
            minute: 6,
            second: 7,
            fraction: 0,
        });
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Time), &mut s).unwrap();
        let NativeValue::Time(tm) = c.binding.value else {
            panic!("expected a temporal binding");
        };
        assert_eq!((tm.hour, tm.minute, tm.second), (5, 6, 0));
    }

    #[test]
    fn test_integers_pass_through() {
        let v = ClientValue::UShort(65535);
        let mut s = ScratchBuffer::new();
        let c = convert(&v, ParamTarget::new(SqlType::Integer), &mut s).unwrap();
        assert_eq!(c.binding.value, NativeValue::UInt(65535));
        assert!(c.binding.is_unsigned);
        assert_eq!(c.binding.length(), 2);
    }
}
