//! Engine type catalog and column attribute helpers.
//!
//! The catalog is built once on first use and is read-only afterwards.

use once_cell::sync::Lazy;

use crate::native::{FieldMetadata, NativeType};
use crate::sql_type::SqlType;

/// Returned where a size or digit count is not meaningful.
pub const NO_TOTAL: i32 = -4;

/// `SQL_SEARCHABLE`: usable with any comparison operator.
pub const SEARCHABLE: i16 = 3;

/// One row of the type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Engine type name.
    pub type_name: &'static str,
    /// SQL type this row describes.
    pub data_type: SqlType,
    /// Maximum column size.
    pub column_size: i32,
    /// Characters quoting a literal, if any.
    pub literal_prefix: Option<&'static str>,
    /// Characters closing a literal, if any.
    pub literal_suffix: Option<&'static str>,
    /// Parameters accepted in a column definition.
    pub create_params: Option<&'static str>,
    /// Whether comparisons are case-sensitive.
    pub case_sensitive: bool,
    /// Searchability (see [`SEARCHABLE`]).
    pub searchable: i16,
    /// Whether the type is unsigned.
    pub unsigned: bool,
    /// Whether the type may auto-increment.
    pub auto_unique_value: bool,
    /// Minimum scale.
    pub minimum_scale: i16,
    /// Maximum scale.
    pub maximum_scale: i16,
    /// Verbose SQL type code (`SQL_DATETIME` for temporal rows).
    pub sql_data_type: i16,
    /// Datetime subcode, zero for non-temporal rows.
    pub sql_datetime_sub: i16,
    /// Radix of the column size, zero when not numeric.
    pub num_prec_radix: i32,
}

const SQL_DATETIME: i16 = 9;

#[derive(Clone, Copy)]
enum Quote {
    Quoted,
    Bare,
}

#[derive(Clone, Copy)]
struct Row(
    &'static str,
    SqlType,
    i32,
    Quote,
    Option<&'static str>,
    bool,
    bool,
    bool,
    (i16, i16),
    i32,
);

use self::Quote::{Bare, Quoted};
type T = SqlType;

const LEN: Option<&str> = Some("length");
const PS: Option<&str> = Some("precision,scale");
const SCALE: Option<&str> = Some("scale");

#[rustfmt::skip]
const ROWS: &[Row] = &[
    //   name                  type                  size        quote   params case  unsig  auto   scale        radix
    Row("json",               T::WLongVarChar,   16_777_216, Quoted, None,  false, false, false, (0, 0),      0),
    Row("long varchar",       T::WLongVarChar,   16_777_215, Quoted, None,  false, false, false, (0, 0),      0),
    Row("longtext",           T::WLongVarChar,   i32::MAX,   Quoted, None,  false, false, false, (0, 0),      0),
    Row("mediumtext",         T::WLongVarChar,   16_777_215, Quoted, None,  false, false, false, (0, 0),      0),
    Row("text",               T::WLongVarChar,   65_535,     Quoted, None,  false, false, false, (0, 0),      0),
    Row("tinytext",           T::WLongVarChar,   255,        Quoted, None,  false, false, false, (0, 0),      0),
    Row("enum",               T::WVarChar,       65_535,     Quoted, None,  false, false, false, (0, 0),      0),
    Row("set",                T::WVarChar,       64,         Quoted, None,  false, false, false, (0, 0),      0),
    Row("varchar",            T::WVarChar,       255,        Quoted, LEN,   false, false, false, (0, 0),      0),
    Row("char",               T::WChar,          255,        Quoted, LEN,   false, false, false, (0, 0),      0),
    Row("bool",               T::TinyInt,        1,          Bare,   None,  true,  false, false, (0, 0),      10),
    Row("boolean",            T::TinyInt,        1,          Bare,   None,  true,  false, false, (0, 0),      10),
    Row("tinyint",            T::TinyInt,        3,          Bare,   None,  false, false, true,  (0, 0),      10),
    Row("tinyint unsigned",   T::TinyInt,        3,          Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("bigint",             T::BigInt,         19,         Bare,   None,  false, false, true,  (0, 0),      10),
    Row("bigint unsigned",    T::BigInt,         20,         Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("blob",               T::LongVarBinary,  65_535,     Quoted, None,  true,  false, false, (0, 0),      0),
    Row("long varbinary",     T::LongVarBinary,  16_777_215, Quoted, None,  true,  false, false, (0, 0),      0),
    Row("longblob",           T::LongVarBinary,  i32::MAX,   Quoted, None,  true,  false, false, (0, 0),      0),
    Row("mediumblob",         T::LongVarBinary,  16_777_215, Quoted, None,  true,  false, false, (0, 0),      0),
    Row("tinyblob",           T::LongVarBinary,  255,        Quoted, None,  true,  false, false, (0, 0),      0),
    Row("geography",          T::VarBinary,      255,        Quoted, None,  false, false, false, (0, 0),      0),
    Row("geographypoint",     T::VarBinary,      20,         Quoted, None,  false, false, false, (0, 0),      0),
    Row("varbinary",          T::VarBinary,      255,        Quoted, LEN,   true,  false, false, (0, 0),      0),
    Row("binary",             T::Binary,         255,        Quoted, LEN,   true,  false, false, (0, 0),      0),
    Row("bit",                T::Binary,         8,          Bare,   None,  true,  false, false, (0, 0),      0),
    Row("json",               T::LongVarChar,    16_777_216, Quoted, None,  false, false, false, (0, 0),      0),
    Row("longtext",           T::LongVarChar,    i32::MAX,   Quoted, None,  false, false, false, (0, 0),      0),
    Row("mediumtext",         T::LongVarChar,    16_777_215, Quoted, None,  false, false, false, (0, 0),      0),
    Row("text",               T::LongVarChar,    65_535,     Quoted, None,  false, false, false, (0, 0),      0),
    Row("tinytext",           T::LongVarChar,    255,        Quoted, None,  false, false, false, (0, 0),      0),
    Row("char",               T::Char,           255,        Quoted, LEN,   false, false, false, (0, 0),      0),
    Row("numeric",            T::Numeric,        65,         Bare,   PS,    false, false, true,  (-308, 308), 10),
    Row("dec",                T::Decimal,        65,         Bare,   PS,    false, false, true,  (-308, 308), 10),
    Row("decimal",            T::Decimal,        65,         Bare,   PS,    false, false, true,  (-308, 308), 10),
    Row("fixed",              T::Decimal,        65,         Bare,   PS,    false, false, true,  (-308, 308), 10),
    Row("int",                T::Integer,        10,         Bare,   None,  false, false, true,  (0, 0),      10),
    Row("int unsigned",       T::Integer,        10,         Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("integer",            T::Integer,        10,         Bare,   None,  false, false, true,  (0, 0),      10),
    Row("integer unsigned",   T::Integer,        10,         Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("mediumint",          T::Integer,        7,          Bare,   None,  false, false, true,  (0, 0),      10),
    Row("mediumint unsigned", T::Integer,        8,          Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("smallint",           T::SmallInt,       5,          Bare,   None,  false, false, true,  (0, 0),      10),
    Row("smallint unsigned",  T::SmallInt,       5,          Bare,   None,  false, true,  true,  (0, 0),      10),
    Row("year",               T::SmallInt,       4,          Bare,   None,  false, false, true,  (0, 0),      10),
    Row("float",              T::Real,           7,          Bare,   None,  false, false, true,  (-38, 38),   10),
    Row("double",             T::Double,         15,         Bare,   None,  false, false, true,  (-308, 308), 10),
    Row("double precision",   T::Double,         15,         Bare,   None,  false, false, true,  (-308, 308), 10),
    Row("real",               T::Double,         15,         Bare,   None,  false, false, true,  (-308, 308), 10),
    Row("enum",               T::VarChar,        65_535,     Quoted, None,  false, false, false, (0, 0),      0),
    Row("set",                T::VarChar,        64,         Quoted, None,  false, false, false, (0, 0),      0),
    Row("varchar",            T::VarChar,        255,        Quoted, LEN,   false, false, false, (0, 0),      0),
    Row("date",               T::Date,           10,         Quoted, None,  false, false, false, (0, 0),      0),
    Row("time",               T::Time,           8,          Quoted, SCALE, false, false, false, (0, 0),      0),
    Row("datetime",           T::Timestamp,      26,         Quoted, SCALE, false, false, false, (0, 0),      0),
    Row("timestamp",          T::Timestamp,      26,         Quoted, SCALE, false, false, false, (0, 0),      0),
];

impl Row {
    fn build(self) -> TypeInfo {
        let Row(type_name, data_type, column_size, quote, create_params, case_sensitive, unsigned, auto, scale, radix) =
            self;
        let quote = match quote {
            Quote::Quoted => Some("'"),
            Quote::Bare => None,
        };
        let (sql_data_type, sql_datetime_sub) = match data_type {
            SqlType::Date => (SQL_DATETIME, 1),
            SqlType::Time => (SQL_DATETIME, 2),
            SqlType::Timestamp => (SQL_DATETIME, 3),
            other => (other.code(), 0),
        };
        TypeInfo {
            type_name,
            data_type,
            column_size,
            literal_prefix: quote,
            literal_suffix: quote,
            create_params,
            case_sensitive,
            searchable: SEARCHABLE,
            unsigned,
            auto_unique_value: auto,
            minimum_scale: scale.0,
            maximum_scale: scale.1,
            sql_data_type,
            sql_datetime_sub,
            num_prec_radix: radix,
        }
    }
}

static CATALOG: Lazy<Vec<TypeInfo>> = Lazy::new(|| ROWS.iter().map(|r| r.build()).collect());

/// Look up the catalog row for `sql_type` and engine `type_name`.
#[must_use]
pub fn type_info(sql_type: SqlType, type_name: &str) -> Option<&'static TypeInfo> {
    CATALOG
        .iter()
        .find(|r| r.data_type == sql_type && r.type_name == type_name)
}

/// Catalog rows for `sql_type`, or all rows when `None`.
pub fn type_infos(sql_type: Option<SqlType>) -> impl Iterator<Item = &'static TypeInfo> {
    CATALOG
        .iter()
        .filter(move |r| sql_type.is_none_or(|t| r.data_type == t))
}

/// Maximum bytes per character for a character-set number.
#[must_use]
pub fn charset_max_len(charset_nr: u16) -> u16 {
    match charset_nr {
        35 | 90 | 128..=159 => 2,
        1 | 84 | 13 | 88 | 19 | 85 | 24 | 86 | 28 | 87 => 2,
        12 | 91 | 33 | 83 | 192..=223 => 3,
        45 | 46 | 224..=247 | 255..=309 => 4,
        54 | 55 | 101..=124 | 56 | 62 | 60 | 61 | 160..=183 | 248..=250 => 4,
        _ => 1,
    }
}

fn capped_length(field: &FieldMetadata) -> i32 {
    i32::try_from(field.length).unwrap_or(i32::MAX)
}

fn char_size(field: &FieldMetadata) -> i32 {
    if field.is_binary() {
        1
    } else {
        i32::from(charset_max_len(field.charset_nr))
    }
}

/// Column size in characters (digits for numerics) of a result column.
///
/// `info` is the catalog row for the column, when one exists.
#[must_use]
pub fn column_size(field: &FieldMetadata, info: Option<&TypeInfo>) -> i32 {
    let length = capped_length(field);
    let char_size = char_size(field);
    let catalog_size = info.map(|i| i.column_size);

    match field.native_type {
        NativeType::Tiny
        | NativeType::Short
        | NativeType::Long
        | NativeType::Float
        | NativeType::Double
        | NativeType::Null
        | NativeType::LongLong
        | NativeType::Int24
        | NativeType::Year
        | NativeType::Date
        | NativeType::Time => catalog_size.unwrap_or(NO_TOTAL),
        NativeType::NewDate | NativeType::Timestamp | NativeType::DateTime => {
            // without fractional digits "YYYY-MM-DD hh:mm:ss" is 7 shorter
            let adjust = if field.decimals == 0 { 7 } else { 0 };
            catalog_size.map_or(NO_TOTAL, |s| s - adjust)
        }
        NativeType::Decimal | NativeType::NewDecimal => {
            let sign = i32::from(!field.is_unsigned());
            let point = i32::from(field.decimals > 0);
            length - sign - point
        }
        NativeType::Bit => {
            if length == 1 {
                1
            } else {
                (length + 7) / 8
            }
        }
        NativeType::Geometry
        | NativeType::Enum
        | NativeType::Set
        | NativeType::VarChar
        | NativeType::VarString
        | NativeType::String => length / char_size,
        NativeType::Blob | NativeType::TinyBlob | NativeType::MediumBlob => {
            catalog_size.map_or(NO_TOTAL, |s| s / char_size)
        }
        NativeType::LongBlob => catalog_size.map_or(NO_TOTAL, |s| {
            if char_size > 1 {
                (s / char_size) * 2 + 1
            } else {
                s
            }
        }),
        NativeType::Json => NO_TOTAL,
    }
}

/// Transfer octet length of a result column.
#[must_use]
pub fn octet_length(field: &FieldMetadata, info: Option<&TypeInfo>) -> i64 {
    let length = i64::from(capped_length(field));
    match field.native_type {
        NativeType::Tiny | NativeType::Null => 1,
        NativeType::Short | NativeType::Year => 2,
        NativeType::Int24 => 3,
        NativeType::Long | NativeType::Float => 4,
        NativeType::Double | NativeType::LongLong => 8,
        NativeType::Date | NativeType::Time => 6,
        NativeType::Timestamp | NativeType::DateTime | NativeType::NewDate => 16,
        NativeType::Bit => (length + 7) / 8,
        NativeType::Enum
        | NativeType::Set
        | NativeType::VarChar
        | NativeType::String
        | NativeType::VarString
        | NativeType::Geometry
        | NativeType::Decimal
        | NativeType::NewDecimal => length,
        NativeType::TinyBlob | NativeType::MediumBlob | NativeType::LongBlob | NativeType::Blob => {
            info.map_or(i64::from(NO_TOTAL), |i| i64::from(i.column_size))
        }
        NativeType::Json => i64::from(NO_TOTAL),
    }
}

/// Decimal digits of a result column, or [`NO_TOTAL`] where meaningless.
#[must_use]
pub fn decimal_digits(field: &FieldMetadata) -> i16 {
    match field.native_type {
        NativeType::Decimal
        | NativeType::NewDecimal
        | NativeType::DateTime
        | NativeType::Timestamp
        | NativeType::Time => i16::from(field.decimals),
        NativeType::Tiny | NativeType::Short | NativeType::Long | NativeType::LongLong | NativeType::Int24 => 0,
        _ => -4,
    }
}
