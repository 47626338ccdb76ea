//! Converting arbitrary column values into every client type.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use odbc_types::{
    Charset, ClientType, ColumnBuffer, FetchRequest, FieldMetadata, NativeType, fetch_value,
};

#[derive(Debug, Arbitrary)]
struct FetchInput {
    native_type: u8,
    length: u32,
    decimals: u8,
    c_type: i16,
    precision: u8,
    scale: i8,
    offset: u16,
    buffer_len: u8,
    value: Vec<u8>,
}

fuzz_target!(|input: FetchInput| {
    let (Some(native_type), Some(c_type)) = (
        NativeType::from_u8(input.native_type),
        ClientType::from_code(input.c_type),
    ) else {
        return;
    };
    let field = FieldMetadata::new(native_type, u64::from(input.length)).decimals(input.decimals);
    let request = FetchRequest::new(c_type)
        .with_precision(input.precision, input.scale)
        .at_offset(usize::from(input.offset));
    let charset = Charset::utf8();

    let buffer_len = usize::from(input.buffer_len);
    match c_type {
        ClientType::Char | ClientType::Binary => {
            let mut buf = vec![0u8; buffer_len];
            let buffer = ColumnBuffer::Bytes(&mut buf);
            if let Ok(outcome) = fetch_value(&field, &input.value, &request, &charset, buffer) {
                assert!(outcome.written <= buffer_len);
            }
        }
        ClientType::WChar => {
            let mut buf = vec![0u16; buffer_len];
            let buffer = ColumnBuffer::Wide(&mut buf);
            if let Ok(outcome) = fetch_value(&field, &input.value, &request, &charset, buffer) {
                assert!(outcome.written <= buffer_len);
            }
        }
        _ => {
            let mut slot = None;
            if fetch_value(&field, &input.value, &request, &charset, ColumnBuffer::Value(&mut slot)).is_ok() {
                assert!(slot.is_some());
            }
        }
    }
});
