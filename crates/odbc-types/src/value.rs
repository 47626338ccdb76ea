//! Client-side value representations.
//!
//! These mirror the fixed-layout structures an ODBC application binds
//! (SQL_NUMERIC_STRUCT, SQL_DATE_STRUCT, ...). [`ClientValue`] is the tagged
//! union over all of them.

use crate::sql_type::ClientType;

/// Number of magnitude bytes in a [`NumericStruct`].
pub const NUMERIC_MAGNITUDE_LEN: usize = 16;

/// Fixed-point numeric value (SQL_NUMERIC_STRUCT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NumericStruct {
    /// Total number of significant decimal digits.
    pub precision: u8,
    /// Digits after the decimal point; negative scales multiply by powers of ten.
    pub scale: i8,
    /// `true` for zero and positive values (ODBC sign 1), `false` for negative.
    pub positive: bool,
    /// Unscaled magnitude, little-endian.
    pub val: [u8; NUMERIC_MAGNITUDE_LEN],
}

impl NumericStruct {
    /// Build a numeric from its unscaled magnitude.
    #[must_use]
    pub fn from_magnitude(precision: u8, scale: i8, positive: bool, magnitude: u128) -> Self {
        Self {
            precision,
            scale,
            positive,
            val: magnitude.to_le_bytes(),
        }
    }

    /// The unscaled magnitude.
    #[must_use]
    pub fn magnitude(&self) -> u128 {
        u128::from_le_bytes(self.val)
    }

    /// Whether the value is negative and non-zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        !self.positive && self.magnitude() != 0
    }
}

/// Calendar date (SQL_DATE_STRUCT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DateStruct {
    /// Year.
    pub year: i16,
    /// Month, 1-12.
    pub month: u16,
    /// Day of month, 1-31.
    pub day: u16,
}

/// Time of day (SQL_TIME_STRUCT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeStruct {
    /// Hour, 0-23.
    pub hour: u16,
    /// Minute, 0-59.
    pub minute: u16,
    /// Second, 0-59.
    pub second: u16,
}

impl TimeStruct {
    /// Whether every clock field is in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.hour <= 23 && self.minute <= 59 && self.second <= 59
    }
}

/// Date and time of day (SQL_TIMESTAMP_STRUCT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimestampStruct {
    /// Year.
    pub year: i16,
    /// Month, 1-12.
    pub month: u16,
    /// Day of month, 1-31.
    pub day: u16,
    /// Hour, 0-23.
    pub hour: u16,
    /// Minute, 0-59.
    pub minute: u16,
    /// Second, 0-59.
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

impl TimestampStruct {
    /// The date part.
    #[must_use]
    pub fn date(&self) -> DateStruct {
        DateStruct {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    /// The time-of-day part, without the fraction.
    #[must_use]
    pub fn time(&self) -> TimeStruct {
        TimeStruct {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        }
    }

    /// Combine a date and a time of day.
    #[must_use]
    pub fn from_parts(date: DateStruct, time: TimeStruct) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            fraction: 0,
        }
    }
}

/// Which fields an [`IntervalStruct`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    /// Hours and minutes.
    HourToMinute,
    /// Hours, minutes and seconds.
    HourToSecond,
}

/// Day-time interval (SQL_INTERVAL_STRUCT, hour-to-minute/second forms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalStruct {
    /// Which fields are meaningful.
    pub kind: IntervalKind,
    /// Whether the interval is negative.
    pub negative: bool,
    /// Hours.
    pub hour: u32,
    /// Minutes.
    pub minute: u32,
    /// Seconds (zero for hour-to-minute).
    pub second: u32,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

/// A value in one of the client-side representations.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientValue {
    /// Narrow text, possibly NUL-terminated.
    Char(Vec<u8>),
    /// UTF-16 text, possibly NUL-terminated.
    WChar(Vec<u16>),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// 0 or 1.
    Bit(u8),
    /// Signed 8-bit.
    TinyInt(i8),
    /// Unsigned 8-bit.
    UTinyInt(u8),
    /// Signed 16-bit.
    Short(i16),
    /// Unsigned 16-bit.
    UShort(u16),
    /// Signed 32-bit.
    Long(i32),
    /// Unsigned 32-bit.
    ULong(u32),
    /// Signed 64-bit.
    BigInt(i64),
    /// Unsigned 64-bit.
    UBigInt(u64),
    /// Single precision.
    Float(f32),
    /// Double precision.
    Double(f64),
    /// Fixed-point numeric.
    Numeric(NumericStruct),
    /// Calendar date.
    Date(DateStruct),
    /// Time of day.
    Time(TimeStruct),
    /// Date and time.
    Timestamp(TimestampStruct),
    /// Day-time interval.
    Interval(IntervalStruct),
}

impl ClientValue {
    /// The client type this value is represented as.
    #[must_use]
    pub fn client_type(&self) -> ClientType {
        match self {
            Self::Char(_) => ClientType::Char,
            Self::WChar(_) => ClientType::WChar,
            Self::Binary(_) => ClientType::Binary,
            Self::Bit(_) => ClientType::Bit,
            Self::TinyInt(_) => ClientType::STinyInt,
            Self::UTinyInt(_) => ClientType::UTinyInt,
            Self::Short(_) => ClientType::SShort,
            Self::UShort(_) => ClientType::UShort,
            Self::Long(_) => ClientType::SLong,
            Self::ULong(_) => ClientType::ULong,
            Self::BigInt(_) => ClientType::SBigInt,
            Self::UBigInt(_) => ClientType::UBigInt,
            Self::Float(_) => ClientType::Float,
            Self::Double(_) => ClientType::Double,
            Self::Numeric(_) => ClientType::Numeric,
            Self::Date(_) => ClientType::Date,
            Self::Time(_) => ClientType::Time,
            Self::Timestamp(_) => ClientType::Timestamp,
            Self::Interval(IntervalStruct {
                kind: IntervalKind::HourToMinute,
                ..
            }) => ClientType::IntervalHourToMinute,
            Self::Interval(_) => ClientType::IntervalHourToSecond,
        }
    }

    /// Octet length of the value as stored (code units are two bytes for wide text).
    #[must_use]
    pub fn octet_length(&self) -> usize {
        match self {
            Self::Char(b) | Self::Binary(b) => b.len(),
            Self::WChar(w) => w.len() * 2,
            Self::Bit(_) | Self::TinyInt(_) | Self::UTinyInt(_) => 1,
            Self::Short(_) | Self::UShort(_) => 2,
            Self::Long(_) | Self::ULong(_) | Self::Float(_) => 4,
            Self::BigInt(_) | Self::UBigInt(_) | Self::Double(_) => 8,
            Self::Numeric(_) => 19,
            Self::Date(_) | Self::Time(_) => 6,
            Self::Timestamp(_) => 16,
            Self::Interval(_) => 28,
        }
    }

    /// Length up to the first terminator (NUL byte or NUL code unit), in octets.
    ///
    /// Fixed-size values report their full octet length.
    #[must_use]
    pub fn terminated_length(&self) -> usize {
        match self {
            Self::Char(b) | Self::Binary(b) => b.iter().position(|&c| c == 0).unwrap_or(b.len()),
            Self::WChar(w) => w.iter().position(|&c| c == 0).unwrap_or(w.len()) * 2,
            _ => self.octet_length(),
        }
    }
}
