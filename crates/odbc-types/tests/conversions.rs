//! Conversion engine integration tests.
//!
//! Parameters go through `convert_parameter`, fetched columns through
//! `fetch_value`, the same way the statement layer drives them.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use odbc_types::temporal::parse_temporal;
use odbc_types::{
    Charset, Classification, ClientType, ClientValue, ColumnBuffer, ConversionContext,
    ConversionError, DateStruct, FetchRequest, FieldMetadata, NativeType, NativeValue,
    NumericStruct, ParamTarget, ScratchBuffer, SqlType, TimestampStruct, fetch_value, type_info,
};
use proptest::prelude::*;

fn ctx() -> ConversionContext {
    ConversionContext::new(Charset::utf8()).default_date(DateStruct {
        year: 2001,
        month: 2,
        day: 3,
    })
}

fn bind(value: &ClientValue, target: ParamTarget) -> Result<(Vec<u8>, Classification), ConversionError> {
    let mut scratch = ScratchBuffer::new();
    let converted = odbc_types::convert_parameter(value, &target, &ctx(), &mut scratch, false)?;
    let bytes = match converted.binding.value {
        NativeValue::Bytes(b) => b.to_vec(),
        other => format!("{other:?}").into_bytes(),
    };
    Ok((bytes, converted.classification))
}

fn fetch_fixed(field: &FieldMetadata, value: &[u8], request: FetchRequest) -> (ClientValue, Classification) {
    let mut slot = None;
    let outcome = fetch_value(field, value, &request, &Charset::utf8(), ColumnBuffer::Value(&mut slot)).unwrap();
    (slot.unwrap(), outcome.classification)
}

fn timestamp(hour: u16, fraction: u32) -> TimestampStruct {
    TimestampStruct {
        year: 2024,
        month: 5,
        day: 17,
        hour,
        minute: 30,
        second: 0,
        fraction,
    }
}

// =============================================================================
// Numeric
// =============================================================================

#[test]
fn test_numeric_round_trip() {
    let value = ClientValue::Numeric(NumericStruct::from_magnitude(5, 2, true, 12345));
    let (text, c) = bind(&value, ParamTarget::new(SqlType::Numeric).with_precision(5, 2)).unwrap();
    assert_eq!(text, b"123.45");
    assert_eq!(c, Classification::Success);

    let field = FieldMetadata::new(NativeType::NewDecimal, 7).decimals(2);
    let (back, c) = fetch_fixed(&field, b"123.45", FetchRequest::new(ClientType::Numeric).with_precision(5, 2));
    assert_eq!(c, Classification::Success);
    let ClientValue::Numeric(n) = back else { panic!("expected numeric") };
    assert_eq!(n.magnitude(), 12345);
    assert!(n.positive);
}

#[test]
fn test_numeric_overflow_aborts() {
    let value = ClientValue::Numeric(NumericStruct::from_magnitude(6, 0, true, 123_456));
    let err = bind(&value, ParamTarget::new(SqlType::Decimal).with_precision(5, 0)).unwrap_err();
    assert_eq!(err, ConversionError::NumericValueOutOfRange);
}

proptest! {
    #[test]
    fn prop_numeric_render_parse(precision in 1u8..=38, scale_seed in 0u8..=38, magnitude: u128, positive: bool) {
        let scale = i8::try_from(scale_seed % (precision + 1)).unwrap();
        let magnitude = magnitude % 10u128.pow(u32::from(precision));
        let value = NumericStruct::from_magnitude(precision, scale, positive, magnitude);

        let (text, c) = odbc_types::numeric::numeric_to_text(&value, precision, scale).unwrap();
        prop_assert_eq!(c, Classification::Success);
        let (back, c) = odbc_types::numeric::numeric_from_text(&text, precision, scale).unwrap();
        prop_assert_eq!(c, Classification::Success);
        prop_assert_eq!(back.magnitude(), magnitude);
        prop_assert_eq!(back.is_negative(), value.is_negative());
    }
}

// =============================================================================
// Temporal
// =============================================================================

#[test]
fn test_time_target_rejects_fraction() {
    let value = ClientValue::Timestamp(timestamp(10, 500));
    let err = bind(&value, ParamTarget::new(SqlType::Time)).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidDatetimeFormat { .. }));
    assert_eq!(err.sqlstate(), "22007");
}

#[test]
fn test_date_target_rejects_time_of_day() {
    let value = ClientValue::Timestamp(timestamp(10, 0));
    let err = bind(&value, ParamTarget::new(SqlType::Date)).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidDatetimeFormat { .. }));

    let midnight = TimestampStruct {
        minute: 0,
        ..timestamp(0, 0)
    };
    assert!(bind(&ClientValue::Timestamp(midnight), ParamTarget::new(SqlType::Date)).is_ok());
}

#[test]
fn test_two_digit_year() {
    let (tm, time_only) = parse_temporal(b"99-01-01", false).unwrap();
    assert_eq!(tm.year, 1999);
    assert!(!time_only);
    let (tm, _) = parse_temporal(b"99-01-01", true).unwrap();
    assert_eq!(tm.year, 99);
    let (tm, _) = parse_temporal(b"05-01-01", false).unwrap();
    assert_eq!(tm.year, 2005);
}

#[test]
fn test_fetch_timestamp_text() {
    let field = FieldMetadata::new(NativeType::DateTime, 26).decimals(6);
    let (value, c) = fetch_fixed(
        &field,
        b"2024-05-17 10:30:00.25",
        FetchRequest::new(ClientType::Timestamp),
    );
    assert_eq!(c, Classification::Success);
    assert_eq!(
        value,
        ClientValue::Timestamp(TimestampStruct {
            second: 0,
            ..timestamp(10, 250_000_000)
        })
    );
}

#[test]
fn test_datetime_to_interval_restricted() {
    let value = ClientValue::Timestamp(timestamp(1, 0));
    let err = bind(&value, ParamTarget::new(SqlType::IntervalHourToSecond)).unwrap_err();
    assert_eq!(err.sqlstate(), "07006");
}

// =============================================================================
// Truncation versus error
// =============================================================================

#[test]
fn test_integer_out_of_range_still_stored() {
    let field = FieldMetadata::new(NativeType::Long, 11).charset(33);
    let (value, c) = fetch_fixed(&field, b"99999", FetchRequest::new(ClientType::UTinyInt));
    assert_eq!(c, Classification::NumericValueOutOfRange);
    assert_eq!(value, ClientValue::UTinyInt(99999u32 as u8));
}

#[test]
fn test_string_truncation_reports_true_length() {
    let field = FieldMetadata::new(NativeType::VarString, 40).charset(33);
    let mut buf = [0xFFu8; 6];
    let outcome = fetch_value(
        &field,
        b"abcdefghij",
        &FetchRequest::new(ClientType::Char),
        &Charset::utf8(),
        ColumnBuffer::Bytes(&mut buf),
    )
    .unwrap();
    assert_eq!(&buf, b"abcde\0");
    assert_eq!(outcome.length, 10);
    assert_eq!(outcome.classification, Classification::StringDataTruncated);
}

#[test]
fn test_chunked_reads() {
    let field = FieldMetadata::new(NativeType::Blob, 65535).charset(33);
    let value = b"abcdefghij";
    let mut offset = 0;
    let mut collected = Vec::new();
    loop {
        let mut buf = [0u8; 4];
        let outcome = fetch_value(
            &field,
            value,
            &FetchRequest::new(ClientType::Char).at_offset(offset),
            &Charset::utf8(),
            ColumnBuffer::Bytes(&mut buf),
        )
        .unwrap();
        collected.extend_from_slice(&buf[..outcome.written]);
        offset += outcome.written;
        if outcome.classification == Classification::Success {
            break;
        }
    }
    assert_eq!(collected, value);
}

#[test]
fn test_bit_field_is_big_endian() {
    let field = FieldMetadata::new(NativeType::Bit, 16);
    let (value, c) = fetch_fixed(&field, &[0x01, 0x02], FetchRequest::new(ClientType::UShort));
    assert_eq!(c, Classification::Success);
    assert_eq!(value, ClientValue::UShort(0x0102));
}

#[test]
fn test_bit_parameter_from_text() {
    let (_, c) = bind(&ClientValue::Char(b"1".to_vec()), ParamTarget::new(SqlType::Bit)).unwrap();
    assert_eq!(c, Classification::Success);
    let (_, c) = bind(&ClientValue::Char(b"7".to_vec()), ParamTarget::new(SqlType::Bit)).unwrap();
    assert_eq!(c, Classification::NumericValueOutOfRange);
}

// =============================================================================
// Wide text and catalog
// =============================================================================

#[test]
fn test_wide_text_both_directions() {
    let units: Vec<u16> = "grüße".encode_utf16().collect();
    let (bytes, _) = bind(&ClientValue::WChar(units.clone()), ParamTarget::new(SqlType::WVarChar)).unwrap();
    assert_eq!(bytes, "grüße".as_bytes());

    let field = FieldMetadata::new(NativeType::VarString, 40).charset(45);
    let mut out = [0u16; 16];
    let outcome = fetch_value(
        &field,
        &bytes,
        &FetchRequest::new(ClientType::WChar),
        &Charset::utf8(),
        ColumnBuffer::Wide(&mut out),
    )
    .unwrap();
    assert_eq!(&out[..units.len()], units.as_slice());
    assert_eq!(out[units.len()], 0);
    assert_eq!(outcome.classification, Classification::Success);
}

#[test]
fn test_catalog_column_size() {
    let field = FieldMetadata::new(NativeType::Timestamp, 19);
    let info = type_info(SqlType::Timestamp, field.type_name());
    assert_eq!(odbc_types::column_size(&field, info), 19);
    assert_eq!(odbc_types::octet_length(&field, info), 16);
}
