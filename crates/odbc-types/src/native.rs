//! Native (server-side) field types and metadata.

use bitflags::bitflags;

/// Field type identifier as reported in result-set metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NativeType {
    /// Legacy DECIMAL.
    Decimal = 0,
    /// TINYINT.
    Tiny = 1,
    /// SMALLINT.
    Short = 2,
    /// INT.
    Long = 3,
    /// FLOAT.
    Float = 4,
    /// DOUBLE.
    Double = 5,
    /// NULL literal column.
    Null = 6,
    /// TIMESTAMP.
    Timestamp = 7,
    /// BIGINT.
    LongLong = 8,
    /// MEDIUMINT.
    Int24 = 9,
    /// DATE.
    Date = 10,
    /// TIME.
    Time = 11,
    /// DATETIME.
    DateTime = 12,
    /// YEAR.
    Year = 13,
    /// Internal date representation.
    NewDate = 14,
    /// VARCHAR.
    VarChar = 15,
    /// BIT(n), transmitted big-endian.
    Bit = 16,
    /// JSON.
    Json = 245,
    /// DECIMAL.
    NewDecimal = 246,
    /// ENUM.
    Enum = 247,
    /// SET.
    Set = 248,
    /// TINYBLOB / TINYTEXT.
    TinyBlob = 249,
    /// MEDIUMBLOB / MEDIUMTEXT.
    MediumBlob = 250,
    /// LONGBLOB / LONGTEXT.
    LongBlob = 251,
    /// BLOB / TEXT.
    Blob = 252,
    /// VARCHAR / VARBINARY.
    VarString = 253,
    /// CHAR / BINARY.
    String = 254,
    /// GEOMETRY.
    Geometry = 255,
}

impl NativeType {
    /// Create a native type from a raw type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Decimal),
            1 => Some(Self::Tiny),
            2 => Some(Self::Short),
            3 => Some(Self::Long),
            4 => Some(Self::Float),
            5 => Some(Self::Double),
            6 => Some(Self::Null),
            7 => Some(Self::Timestamp),
            8 => Some(Self::LongLong),
            9 => Some(Self::Int24),
            10 => Some(Self::Date),
            11 => Some(Self::Time),
            12 => Some(Self::DateTime),
            13 => Some(Self::Year),
            14 => Some(Self::NewDate),
            15 => Some(Self::VarChar),
            16 => Some(Self::Bit),
            245 => Some(Self::Json),
            246 => Some(Self::NewDecimal),
            247 => Some(Self::Enum),
            248 => Some(Self::Set),
            249 => Some(Self::TinyBlob),
            250 => Some(Self::MediumBlob),
            251 => Some(Self::LongBlob),
            252 => Some(Self::Blob),
            253 => Some(Self::VarString),
            254 => Some(Self::String),
            255 => Some(Self::Geometry),
            _ => None,
        }
    }

    /// Whether values of this type are BLOB-carried.
    #[must_use]
    pub fn is_blob(self) -> bool {
        matches!(
            self,
            Self::TinyBlob | Self::MediumBlob | Self::LongBlob | Self::Blob
        )
    }

    /// Whether the row value arrives as raw bytes rather than text digits.
    ///
    /// Integer targets read these bytes directly instead of parsing them.
    #[must_use]
    pub fn is_binary_encoded(self) -> bool {
        self == Self::Bit || self.is_blob()
    }

    /// Whether this is a date, time or date-time type.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::DateTime | Self::Timestamp | Self::NewDate
        )
    }

    /// Width in bytes of the binary form of fixed-size types.
    #[must_use]
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Tiny => Some(1),
            Self::Short | Self::Year => Some(2),
            Self::Int24 | Self::Long | Self::Float => Some(4),
            Self::LongLong | Self::Double => Some(8),
            _ => None,
        }
    }

    /// Lower-case SQL type name, as used for catalog lookups.
    #[must_use]
    pub fn type_name(self, unsigned: bool, binary: bool) -> &'static str {
        match (self, unsigned) {
            (Self::Tiny, false) => "tinyint",
            (Self::Tiny, true) => "tinyint unsigned",
            (Self::Short, false) => "smallint",
            (Self::Short, true) => "smallint unsigned",
            (Self::Int24, false) => "mediumint",
            (Self::Int24, true) => "mediumint unsigned",
            (Self::Long, false) => "int",
            (Self::Long, true) => "int unsigned",
            (Self::LongLong, false) => "bigint",
            (Self::LongLong, true) => "bigint unsigned",
            (Self::Float, _) => "float",
            (Self::Double, _) => "double",
            (Self::Decimal | Self::NewDecimal, _) => "decimal",
            (Self::Null, _) => "null",
            (Self::Timestamp, _) => "timestamp",
            (Self::Date | Self::NewDate, _) => "date",
            (Self::Time, _) => "time",
            (Self::DateTime, _) => "datetime",
            (Self::Year, _) => "year",
            (Self::Bit, _) => "bit",
            (Self::Json, _) => "json",
            (Self::Enum, _) => "enum",
            (Self::Set, _) => "set",
            (Self::Geometry, _) => "geometry",
            (Self::TinyBlob, _) => if binary { "tinyblob" } else { "tinytext" },
            (Self::MediumBlob, _) => if binary { "mediumblob" } else { "mediumtext" },
            (Self::LongBlob, _) => if binary { "longblob" } else { "longtext" },
            (Self::Blob, _) => if binary { "blob" } else { "text" },
            (Self::VarChar | Self::VarString, _) => if binary { "varbinary" } else { "varchar" },
            (Self::String, _) => if binary { "binary" } else { "char" },
        }
    }
}

bitflags! {
    /// Column attribute flags from result-set metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        /// Column is NOT NULL.
        const NOT_NULL = 1;
        /// Column is part of the primary key.
        const PRI_KEY = 1 << 1;
        /// Column is part of a unique key.
        const UNIQUE_KEY = 1 << 2;
        /// Column is part of a non-unique key.
        const MULTIPLE_KEY = 1 << 3;
        /// Column is a BLOB or TEXT.
        const BLOB = 1 << 4;
        /// Column is unsigned.
        const UNSIGNED = 1 << 5;
        /// Column is zero-filled.
        const ZEROFILL = 1 << 6;
        /// Column uses the binary collation.
        const BINARY = 1 << 7;
        /// Column is an ENUM.
        const ENUM = 1 << 8;
        /// Column is AUTO_INCREMENT.
        const AUTO_INCREMENT = 1 << 9;
        /// Column is a TIMESTAMP.
        const TIMESTAMP = 1 << 10;
        /// Column is a SET.
        const SET = 1 << 11;
    }
}

/// Character-set number of the binary pseudo-charset.
pub const BINARY_CHARSET_NR: u16 = 63;

/// Per-column metadata supplied by the result-set layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMetadata {
    /// Native type tag.
    pub native_type: NativeType,
    /// Declared length in bytes (bits for BIT).
    pub length: u64,
    /// Declared decimal count.
    pub decimals: u8,
    /// Character-set number.
    pub charset_nr: u16,
    /// Attribute flags.
    pub flags: FieldFlags,
}

impl FieldMetadata {
    /// Metadata for a column of `native_type` with declared `length`.
    #[must_use]
    pub fn new(native_type: NativeType, length: u64) -> Self {
        Self {
            native_type,
            length,
            decimals: 0,
            charset_nr: BINARY_CHARSET_NR,
            flags: FieldFlags::empty(),
        }
    }

    /// Set the declared decimal count.
    #[must_use]
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the character-set number.
    #[must_use]
    pub fn charset(mut self, charset_nr: u16) -> Self {
        self.charset_nr = charset_nr;
        self
    }

    /// Add attribute flags.
    #[must_use]
    pub fn flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Whether the column is unsigned.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(FieldFlags::UNSIGNED)
    }

    /// Whether the column uses the binary character set.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.charset_nr == BINARY_CHARSET_NR
    }

    /// Lower-case SQL type name of the column.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.native_type.type_name(self.is_unsigned(), self.is_binary())
    }
}

/// Which fields of a [`NativeTime`] are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeTimeKind {
    /// No fields were recognized.
    #[default]
    None,
    /// Calendar date only.
    Date,
    /// Date and time of day.
    DateTime,
    /// Time of day (or duration) only.
    Time,
}

/// Native temporal value, with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeTime {
    /// Year.
    pub year: u32,
    /// Month.
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Hour (unbounded for durations).
    pub hour: u32,
    /// Minute.
    pub minute: u32,
    /// Second.
    pub second: u32,
    /// Fractional seconds in microseconds.
    pub microsecond: u32,
    /// Whether the value is negative (durations).
    pub negative: bool,
    /// Which fields are meaningful.
    pub kind: NativeTimeKind,
}

impl NativeTime {
    /// The native type used to bind a value of this kind.
    #[must_use]
    pub fn native_type(&self) -> NativeType {
        match self.kind {
            NativeTimeKind::Date => NativeType::Date,
            NativeTimeKind::Time => NativeType::Time,
            NativeTimeKind::DateTime | NativeTimeKind::None => NativeType::Timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8() {
        assert_eq!(NativeType::from_u8(1), Some(NativeType::Tiny));
        assert_eq!(NativeType::from_u8(246), Some(NativeType::NewDecimal));
        assert_eq!(NativeType::from_u8(100), None);
        assert_eq!(NativeType::from_u8(NativeType::Geometry as u8), Some(NativeType::Geometry));
    }

    #[test]
    fn test_binary_encoded() {
        assert!(NativeType::Bit.is_binary_encoded());
        assert!(NativeType::MediumBlob.is_binary_encoded());
        assert!(!NativeType::VarString.is_binary_encoded());
        assert!(!NativeType::Long.is_binary_encoded());
    }

    #[test]
    fn test_field_type_names() {
        let f = FieldMetadata::new(NativeType::Long, 10).flags(FieldFlags::UNSIGNED);
        assert_eq!(f.type_name(), "int unsigned");
        let f = FieldMetadata::new(NativeType::Blob, 65535).charset(45);
        assert_eq!(f.type_name(), "text");
        assert!(!f.is_binary());
        let f = FieldMetadata::new(NativeType::VarString, 255);
        assert_eq!(f.type_name(), "varbinary");
    }
}
