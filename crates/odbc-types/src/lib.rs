//! # odbc-types
//!
//! Value model and conversion engine for an ODBC driver talking to
//! SingleStore/MariaDB servers.
//!
//! Two directions are covered:
//!
//! - **Parameters**: a bound client value ([`ClientValue`]) is converted to
//!   the native binding sent to the engine ([`convert_parameter`]).
//! - **Results**: a fetched native field is stored into an application
//!   buffer ([`fetch_value`]), with chunked reads of long values.
//!
//! Each conversion reports a [`Classification`]; warnings keep the value,
//! errors ([`ConversionError`]) abort it.
//!
//! ## Features
//!
//! - `chrono`: conversions between the ODBC date/time structs and chrono
//!   types, and today's date as the default for time-to-timestamp binds
//! - `decimal`: conversions between [`NumericStruct`] and `rust_decimal`
//! - `encoding`: non-UTF-8 connection character sets for wide text
//!
//! ## Example
//!
//! ```rust
//! use odbc_types::{
//!     ClientValue, ConversionContext, NativeValue, NumericStruct, ParamTarget, ScratchBuffer,
//!     SqlType, convert_parameter,
//! };
//!
//! let value = ClientValue::Numeric(NumericStruct::from_magnitude(5, 2, true, 12345));
//! let target = ParamTarget::new(SqlType::Decimal).with_precision(5, 2);
//! let mut scratch = ScratchBuffer::new();
//! let converted =
//!     convert_parameter(&value, &target, &ConversionContext::default(), &mut scratch, false)
//!         .unwrap();
//!
//! assert_eq!(converted.binding.value, NativeValue::Bytes(b"123.45"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod charset;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod integer;
pub mod native;
pub mod numeric;
pub mod sql_type;
pub mod temporal;
pub mod value;

pub use catalog::{NO_TOTAL, TypeInfo, column_size, decimal_digits, octet_length, type_info, type_infos};
pub use charset::Charset;
pub use convert::{
    Conversion, ConversionContext, NativeBinding, NativeValue, ParamTarget, ScratchBuffer,
    conversion_supported, convert_parameter, native_type_for,
};
pub use error::{Classification, ConversionError, Severity};
pub use fetch::{ColumnBuffer, FetchOutcome, FetchRequest, fetch_value};
pub use native::{FieldFlags, FieldMetadata, NativeTime, NativeTimeKind, NativeType};
pub use sql_type::{ClientType, SqlType};
pub use value::{
    ClientValue, DateStruct, IntervalKind, IntervalStruct, NumericStruct, TimeStruct,
    TimestampStruct,
};
