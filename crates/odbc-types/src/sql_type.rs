//! ODBC SQL data types and client-side ("concise C") types.

/// An ODBC SQL data type, as declared for a parameter or reported for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SqlType {
    /// SQL_CHAR.
    Char,
    /// SQL_VARCHAR.
    VarChar,
    /// SQL_LONGVARCHAR.
    LongVarChar,
    /// SQL_WCHAR.
    WChar,
    /// SQL_WVARCHAR.
    WVarChar,
    /// SQL_WLONGVARCHAR.
    WLongVarChar,
    /// SQL_DECIMAL.
    Decimal,
    /// SQL_NUMERIC.
    Numeric,
    /// SQL_BIT.
    Bit,
    /// SQL_TINYINT.
    TinyInt,
    /// SQL_SMALLINT.
    SmallInt,
    /// SQL_INTEGER.
    Integer,
    /// SQL_BIGINT.
    BigInt,
    /// SQL_REAL.
    Real,
    /// SQL_FLOAT.
    Float,
    /// SQL_DOUBLE.
    Double,
    /// SQL_BINARY.
    Binary,
    /// SQL_VARBINARY.
    VarBinary,
    /// SQL_LONGVARBINARY.
    LongVarBinary,
    /// SQL_TYPE_DATE.
    Date,
    /// SQL_TYPE_TIME.
    Time,
    /// SQL_TYPE_TIMESTAMP.
    Timestamp,
    /// SQL_GUID.
    Guid,
    /// SQL_INTERVAL_YEAR.
    IntervalYear,
    /// SQL_INTERVAL_MONTH.
    IntervalMonth,
    /// SQL_INTERVAL_DAY.
    IntervalDay,
    /// SQL_INTERVAL_HOUR.
    IntervalHour,
    /// SQL_INTERVAL_MINUTE.
    IntervalMinute,
    /// SQL_INTERVAL_SECOND.
    IntervalSecond,
    /// SQL_INTERVAL_YEAR_TO_MONTH.
    IntervalYearToMonth,
    /// SQL_INTERVAL_DAY_TO_HOUR.
    IntervalDayToHour,
    /// SQL_INTERVAL_DAY_TO_MINUTE.
    IntervalDayToMinute,
    /// SQL_INTERVAL_DAY_TO_SECOND.
    IntervalDayToSecond,
    /// SQL_INTERVAL_HOUR_TO_MINUTE.
    IntervalHourToMinute,
    /// SQL_INTERVAL_HOUR_TO_SECOND.
    IntervalHourToSecond,
    /// SQL_INTERVAL_MINUTE_TO_SECOND.
    IntervalMinuteToSecond,
}

impl SqlType {
    /// The ODBC type code.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Char => 1,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Integer => 4,
            Self::SmallInt => 5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::VarChar => 12,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::LongVarChar => -1,
            Self::Binary => -2,
            Self::VarBinary => -3,
            Self::LongVarBinary => -4,
            Self::BigInt => -5,
            Self::TinyInt => -6,
            Self::Bit => -7,
            Self::WChar => -8,
            Self::WVarChar => -9,
            Self::WLongVarChar => -10,
            Self::Guid => -11,
            Self::IntervalYear => 101,
            Self::IntervalMonth => 102,
            Self::IntervalDay => 103,
            Self::IntervalHour => 104,
            Self::IntervalMinute => 105,
            Self::IntervalSecond => 106,
            Self::IntervalYearToMonth => 107,
            Self::IntervalDayToHour => 108,
            Self::IntervalDayToMinute => 109,
            Self::IntervalDayToSecond => 110,
            Self::IntervalHourToMinute => 111,
            Self::IntervalHourToSecond => 112,
            Self::IntervalMinuteToSecond => 113,
        }
    }

    /// Create a SQL type from an ODBC type code.
    ///
    /// The ODBC 2.x date/time codes (9, 10, 11) map to their 3.x equivalents.
    pub fn from_code(code: i16) -> Option<Self> {
        let ty = match code {
            1 => Self::Char,
            2 => Self::Numeric,
            3 => Self::Decimal,
            4 => Self::Integer,
            5 => Self::SmallInt,
            6 => Self::Float,
            7 => Self::Real,
            8 => Self::Double,
            12 => Self::VarChar,
            9 | 91 => Self::Date,
            10 | 92 => Self::Time,
            11 | 93 => Self::Timestamp,
            -1 => Self::LongVarChar,
            -2 => Self::Binary,
            -3 => Self::VarBinary,
            -4 => Self::LongVarBinary,
            -5 => Self::BigInt,
            -6 => Self::TinyInt,
            -7 => Self::Bit,
            -8 => Self::WChar,
            -9 => Self::WVarChar,
            -10 => Self::WLongVarChar,
            -11 => Self::Guid,
            101 => Self::IntervalYear,
            102 => Self::IntervalMonth,
            103 => Self::IntervalDay,
            104 => Self::IntervalHour,
            105 => Self::IntervalMinute,
            106 => Self::IntervalSecond,
            107 => Self::IntervalYearToMonth,
            108 => Self::IntervalDayToHour,
            109 => Self::IntervalDayToMinute,
            110 => Self::IntervalDayToSecond,
            111 => Self::IntervalHourToMinute,
            112 => Self::IntervalHourToSecond,
            113 => Self::IntervalMinuteToSecond,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether this is DATE, TIME or TIMESTAMP.
    #[must_use]
    pub fn is_datetime(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Whether this is one of the interval types.
    #[must_use]
    pub fn is_interval(self) -> bool {
        (101..=113).contains(&self.code())
    }

    /// Whether this is a narrow or wide character type.
    #[must_use]
    pub fn is_character(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::LongVarChar
                | Self::WChar
                | Self::WVarChar
                | Self::WLongVarChar
        )
    }

    /// Whether this is a binary type.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary | Self::VarBinary | Self::LongVarBinary)
    }

    /// Whether this is an exact or approximate numeric type.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Numeric
                | Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Real
                | Self::Float
                | Self::Double
        )
    }
}

/// A client-side value representation ("concise C type").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ClientType {
    /// SQL_C_CHAR: narrow text.
    Char,
    /// SQL_C_WCHAR: UTF-16 text.
    WChar,
    /// SQL_C_BINARY: raw bytes.
    Binary,
    /// SQL_C_BIT: 0 or 1.
    Bit,
    /// SQL_C_STINYINT.
    STinyInt,
    /// SQL_C_UTINYINT.
    UTinyInt,
    /// SQL_C_SSHORT.
    SShort,
    /// SQL_C_USHORT.
    UShort,
    /// SQL_C_SLONG.
    SLong,
    /// SQL_C_ULONG.
    ULong,
    /// SQL_C_SBIGINT.
    SBigInt,
    /// SQL_C_UBIGINT.
    UBigInt,
    /// SQL_C_FLOAT.
    Float,
    /// SQL_C_DOUBLE.
    Double,
    /// SQL_C_NUMERIC.
    Numeric,
    /// SQL_C_TYPE_DATE.
    Date,
    /// SQL_C_TYPE_TIME.
    Time,
    /// SQL_C_TYPE_TIMESTAMP.
    Timestamp,
    /// SQL_C_INTERVAL_HOUR_TO_MINUTE.
    IntervalHourToMinute,
    /// SQL_C_INTERVAL_HOUR_TO_SECOND.
    IntervalHourToSecond,
}

impl ClientType {
    /// The ODBC C type code.
    #[must_use]
    pub fn code(self) -> i16 {
        match self {
            Self::Char => 1,
            Self::WChar => -8,
            Self::Binary => -2,
            Self::Bit => -7,
            Self::STinyInt => -26,
            Self::UTinyInt => -28,
            Self::SShort => -15,
            Self::UShort => -17,
            Self::SLong => -16,
            Self::ULong => -18,
            Self::SBigInt => -25,
            Self::UBigInt => -27,
            Self::Float => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::IntervalHourToMinute => 111,
            Self::IntervalHourToSecond => 112,
        }
    }

    /// Create a client type from an ODBC C type code.
    ///
    /// Legacy codes (SQL_C_DATE, SQL_C_SHORT, ...) map to their concise equivalents.
    pub fn from_code(code: i16) -> Option<Self> {
        let ty = match code {
            1 => Self::Char,
            -8 => Self::WChar,
            -2 => Self::Binary,
            -7 => Self::Bit,
            -6 | -26 => Self::STinyInt,
            -28 => Self::UTinyInt,
            5 | -15 => Self::SShort,
            -17 => Self::UShort,
            4 | -16 => Self::SLong,
            -18 => Self::ULong,
            -25 => Self::SBigInt,
            -27 => Self::UBigInt,
            7 => Self::Float,
            8 => Self::Double,
            2 => Self::Numeric,
            9 | 91 => Self::Date,
            10 | 92 => Self::Time,
            11 | 93 => Self::Timestamp,
            111 => Self::IntervalHourToMinute,
            112 => Self::IntervalHourToSecond,
            _ => return None,
        };
        Some(ty)
    }

    /// Upper-case C type name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Char => "SQL_C_CHAR",
            Self::WChar => "SQL_C_WCHAR",
            Self::Binary => "SQL_C_BINARY",
            Self::Bit => "SQL_C_BIT",
            Self::STinyInt => "SQL_C_STINYINT",
            Self::UTinyInt => "SQL_C_UTINYINT",
            Self::SShort => "SQL_C_SSHORT",
            Self::UShort => "SQL_C_USHORT",
            Self::SLong => "SQL_C_SLONG",
            Self::ULong => "SQL_C_ULONG",
            Self::SBigInt => "SQL_C_SBIGINT",
            Self::UBigInt => "SQL_C_UBIGINT",
            Self::Float => "SQL_C_FLOAT",
            Self::Double => "SQL_C_DOUBLE",
            Self::Numeric => "SQL_C_NUMERIC",
            Self::Date => "SQL_C_TYPE_DATE",
            Self::Time => "SQL_C_TYPE_TIME",
            Self::Timestamp => "SQL_C_TYPE_TIMESTAMP",
            Self::IntervalHourToMinute => "SQL_C_INTERVAL_HOUR_TO_MINUTE",
            Self::IntervalHourToSecond => "SQL_C_INTERVAL_HOUR_TO_SECOND",
        }
    }

    /// Storage width and signedness for integer types (BIT counts as unsigned 8-bit).
    #[must_use]
    pub fn integer_layout(self) -> Option<(usize, bool)> {
        match self {
            Self::STinyInt => Some((1, true)),
            Self::UTinyInt | Self::Bit => Some((1, false)),
            Self::SShort => Some((2, true)),
            Self::UShort => Some((2, false)),
            Self::SLong => Some((4, true)),
            Self::ULong => Some((4, false)),
            Self::SBigInt => Some((8, true)),
            Self::UBigInt => Some((8, false)),
            _ => None,
        }
    }

    /// Whether this is DATE, TIME or TIMESTAMP.
    #[must_use]
    pub fn is_datetime(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Whether this is an interval type.
    #[must_use]
    pub fn is_interval(self) -> bool {
        matches!(self, Self::IntervalHourToMinute | Self::IntervalHourToSecond)
    }

    /// Whether values are variable-length byte or code-unit sequences.
    #[must_use]
    pub fn is_variable_length(self) -> bool {
        matches!(self, Self::Char | Self::WChar | Self::Binary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_code_round_trip_and_aliases() {
        for code in [1, 2, 4, 12, -5, -7, -9, 91, 92, 93, 111] {
            assert_eq!(SqlType::from_code(code).unwrap().code(), code);
        }
        assert_eq!(SqlType::from_code(11), Some(SqlType::Timestamp));
        assert_eq!(SqlType::from_code(0), None);
    }

    #[test]
    fn test_sql_type_classes() {
        assert!(SqlType::IntervalDayToSecond.is_interval());
        assert!(!SqlType::Timestamp.is_interval());
        assert!(SqlType::Time.is_datetime());
        assert!(SqlType::WVarChar.is_character());
    }

    #[test]
    fn test_client_type_layout() {
        assert_eq!(ClientType::UTinyInt.integer_layout(), Some((1, false)));
        assert_eq!(ClientType::SBigInt.integer_layout(), Some((8, true)));
        assert_eq!(ClientType::Char.integer_layout(), None);
        assert_eq!(ClientType::from_code(5), Some(ClientType::SShort));
        assert_eq!(ClientType::from_code(-16), Some(ClientType::SLong));
    }
}
