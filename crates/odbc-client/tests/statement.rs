//! End-to-end statement tests: prepare, bind, execute, fetch.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use odbc_client::{
    BoundValue, ColumnBinding, ColumnData, Config, Error, Indicator, ParameterDescriptor, Statement, StatementState,
};
use odbc_query::{ParseOptions, QueryKind};
use odbc_types::{
    Classification, ClientType, ClientValue, ColumnBuffer, FieldMetadata, NativeType, NumericStruct, SqlType,
    TimestampStruct,
};
use proptest::prelude::*;

fn statement(config: &Config, sql: &str) -> Statement {
    let mut stmt = Statement::new(config).unwrap();
    stmt.prepare(sql).unwrap();
    stmt
}

fn long_param(values: &[i32]) -> ParameterDescriptor {
    ParameterDescriptor::new(ClientType::SLong, SqlType::Integer).values(
        values
            .iter()
            .map(|&v| BoundValue::new(ClientValue::Long(v), Indicator::Length(4)))
            .collect(),
    )
}

fn text_param(text: &str) -> ParameterDescriptor {
    ParameterDescriptor::new(ClientType::Char, SqlType::VarChar)
        .value(BoundValue::new(ClientValue::Char(text.as_bytes().to_vec()), Indicator::Nts))
}

fn texts(stmt: &mut Statement) -> Vec<String> {
    let execution = stmt.execute().unwrap();
    execution
        .executable()
        .map(|sql| String::from_utf8(sql.to_vec()).unwrap())
        .collect()
}

// =============================================================================
// Preparation
// =============================================================================

#[test]
fn test_escape_processing_follows_config() {
    let stmt = statement(&Config::new(), "SELECT {fn NOW()}");
    assert_eq!(stmt.query().unwrap().original(), "SELECT NOW()");

    let config = Config::from_connection_string("NO_ESCAPE_PROCESSING=1").unwrap();
    let stmt = statement(&config, "SELECT {fn NOW()}");
    assert_eq!(stmt.query().unwrap().original(), "SELECT {fn NOW()}");
}

#[test]
fn test_malformed_escape_is_a_syntax_error() {
    let mut stmt = Statement::new(&Config::new()).unwrap();
    let err = stmt.prepare("SELECT {fn NOW()").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.sqlstate(), Some("42000"));
    assert_eq!(stmt.state(), StatementState::Allocated);
}

#[test]
fn test_batch_needs_multi_statements() {
    let stmt = statement(&Config::new(), "SELECT 1; SELECT 2");
    assert!(!stmt.query().unwrap().is_multi_statement());

    let config = Config::from_connection_string("OPTION=67108864").unwrap();
    let stmt = statement(&config, "SELECT 1; SELECT 2");
    let query = stmt.query().unwrap();
    assert!(query.is_multi_statement());
    assert_eq!(query.kind(), QueryKind::Select);
}

// =============================================================================
// Execution
// =============================================================================

#[test]
fn test_parameter_array() {
    let mut stmt = statement(&Config::new(), "INSERT INTO t (a, b) VALUES (?, ?)");
    stmt.bind_parameter(0, long_param(&[1, 2, 3])).unwrap();
    stmt.bind_parameter(
        1,
        ParameterDescriptor::new(ClientType::Char, SqlType::VarChar).values(vec![
            BoundValue::new(ClientValue::Char(b"one".to_vec()), Indicator::Nts),
            BoundValue::null(),
            BoundValue::new(ClientValue::Char(b"it's".to_vec()), Indicator::Length(4)),
        ]),
    )
    .unwrap();

    assert_eq!(
        texts(&mut stmt),
        vec![
            "INSERT INTO t (a, b) VALUES (1, 'one')",
            "INSERT INTO t (a, b) VALUES (2, NULL)",
            "INSERT INTO t (a, b) VALUES (3, 'it\\'s')",
        ]
    );
}

#[test]
fn test_failed_row_does_not_stop_batch() {
    let mut stmt = statement(&Config::new(), "INSERT INTO t VALUES (?)");
    let value = |magnitude| {
        BoundValue::new(
            ClientValue::Numeric(NumericStruct::from_magnitude(3, 0, true, magnitude)),
            Indicator::Length(19),
        )
    };
    stmt.bind_parameter(
        0,
        ParameterDescriptor::new(ClientType::Numeric, SqlType::Decimal)
            .with_precision(2, 0)
            .values(vec![value(12), value(999), value(34)]),
    )
    .unwrap();

    let execution = stmt.execute().unwrap();
    assert_eq!(execution.statements.len(), 3);
    assert!(execution.statements[1].is_none());
    assert_eq!(execution.errors.len(), 1);
    assert_eq!(execution.errors[0].0, 1);
    assert_eq!(execution.outcome.errors, 1);
    assert_eq!(execution.outcome.classification, Classification::NumericValueOutOfRange);
    assert_eq!(execution.executable().count(), 2);
}

#[test]
fn test_batch_interpolation() {
    let config = Config::new().multi_statements(true);
    let mut stmt = statement(&config, "UPDATE t SET a = ? WHERE id = 1; SELECT a FROM t WHERE b = ?");
    stmt.bind_parameter(0, text_param("x;y")).unwrap();
    stmt.bind_parameter(1, long_param(&[9])).unwrap();
    assert_eq!(
        texts(&mut stmt),
        vec!["UPDATE t SET a = 'x;y' WHERE id = 1; SELECT a FROM t WHERE b = 9"]
    );
}

#[test]
fn test_temporal_and_wide_parameters() {
    let mut stmt = statement(&Config::new(), "SELECT ?, ?");
    stmt.bind_parameter(
        0,
        ParameterDescriptor::new(ClientType::Timestamp, SqlType::Timestamp).value(BoundValue::new(
            ClientValue::Timestamp(TimestampStruct {
                year: 2024,
                month: 2,
                day: 29,
                hour: 23,
                minute: 59,
                second: 58,
                fraction: 0,
            }),
            Indicator::Length(16),
        )),
    )
    .unwrap();
    stmt.bind_parameter(
        1,
        ParameterDescriptor::new(ClientType::WChar, SqlType::WVarChar).value(BoundValue::new(
            ClientValue::WChar("héllo".encode_utf16().collect()),
            Indicator::Nts,
        )),
    )
    .unwrap();

    assert_eq!(texts(&mut stmt), vec!["SELECT '2024-02-29 23:59:58', 'héllo'"]);
}

#[cfg(feature = "encoding")]
#[test]
fn test_sjis_trail_byte_is_not_escaped() {
    let config = Config::new().charset("sjis");
    let mut stmt = statement(&config, "SELECT * FROM t WHERE a = ? AND b = ?");
    stmt.bind_parameter(
        0,
        ParameterDescriptor::new(ClientType::WChar, SqlType::WVarChar).value(BoundValue::new(
            ClientValue::WChar("ソ".encode_utf16().collect()),
            Indicator::Nts,
        )),
    )
    .unwrap();
    stmt.bind_parameter(1, text_param(" OR 1=1 -- ")).unwrap();

    let execution = stmt.execute().unwrap();
    let sql: Vec<Vec<u8>> = execution.executable().map(|sql| sql.to_vec()).collect();
    let mut expected = b"SELECT * FROM t WHERE a = '".to_vec();
    expected.extend_from_slice(&[0x83, 0x5C]);
    expected.extend_from_slice(b"' AND b = ' OR 1=1 -- '");
    assert_eq!(sql, vec![expected]);
}

#[test]
fn test_column_default_and_null_indicators() {
    let mut stmt = statement(&Config::new(), "INSERT INTO t VALUES (?, ?)");
    stmt.bind_parameter(
        0,
        ParameterDescriptor::new(ClientType::SLong, SqlType::Integer)
            .with_default("DEFAULT")
            .value(BoundValue::ignore()),
    )
    .unwrap();
    stmt.bind_parameter(
        1,
        ParameterDescriptor::new(ClientType::SLong, SqlType::Integer).value(BoundValue::null()),
    )
    .unwrap();
    assert_eq!(texts(&mut stmt), vec!["INSERT INTO t VALUES ('DEFAULT', NULL)"]);
}

#[test]
fn test_data_at_exec_parameters_in_order() {
    let mut stmt = statement(&Config::new(), "INSERT INTO t VALUES (?, ?, ?)");
    let dae = || ParameterDescriptor::new(ClientType::Binary, SqlType::LongVarBinary).value(BoundValue::data_at_exec());
    stmt.bind_parameter(0, dae()).unwrap();
    stmt.bind_parameter(1, long_param(&[5])).unwrap();
    stmt.bind_parameter(2, dae()).unwrap();

    assert_eq!(stmt.execute().unwrap_err(), Error::NeedData { index: 0 });
    assert_eq!(stmt.pending_data(), Some(0));
    stmt.put_data(0, &[0xCA, 0xFE]).unwrap();

    assert_eq!(stmt.execute().unwrap_err(), Error::NeedData { index: 2 });
    assert_eq!(stmt.state(), StatementState::NeedData);
    stmt.put_data(2, &[]).unwrap();

    assert_eq!(texts(&mut stmt), vec!["INSERT INTO t VALUES (X'CAFE', 5, X'')"]);
    assert_eq!(stmt.state(), StatementState::Executed);
}

#[test]
fn test_statement_without_parameters() {
    let mut stmt = statement(&Config::new(), "SELECT 1");
    assert_eq!(texts(&mut stmt), vec!["SELECT 1"]);
}

// =============================================================================
// Fetching
// =============================================================================

fn result_statement() -> Statement {
    let mut stmt = statement(&Config::new(), "SELECT id, created, name FROM t");
    stmt.execute().unwrap();
    stmt.set_result(vec![
        FieldMetadata::new(NativeType::Long, 11),
        FieldMetadata::new(NativeType::DateTime, 19),
        FieldMetadata::new(NativeType::VarString, 64).charset(33),
    ]);
    stmt
}

#[test]
fn test_fetch_bound_columns() {
    let mut stmt = result_statement();
    stmt.bind_column(0, ColumnBinding::new(ClientType::SLong));
    stmt.bind_column(1, ColumnBinding::new(ClientType::Timestamp));
    stmt.bind_column(2, ColumnBinding::new(ClientType::Char));
    stmt.load_row(vec![
        Some(b"17".to_vec()),
        Some(b"2023-12-31 08:09:10".to_vec()),
        Some(b"a long name".to_vec()),
    ])
    .unwrap();

    let mut id = None;
    let mut created = None;
    let mut name = [0u8; 8];
    let fetched = stmt
        .fetch([
            (0, ColumnBuffer::Value(&mut id)),
            (1, ColumnBuffer::Value(&mut created)),
            (2, ColumnBuffer::Bytes(&mut name)),
        ])
        .unwrap();

    assert_eq!(id, Some(ClientValue::Long(17)));
    assert_eq!(
        created,
        Some(ClientValue::Timestamp(TimestampStruct {
            year: 2023,
            month: 12,
            day: 31,
            hour: 8,
            minute: 9,
            second: 10,
            fraction: 0,
        }))
    );
    assert_eq!(&name, b"a long \0");
    let Ok(ColumnData::Value(name_outcome)) = fetched.columns[2].1 else {
        panic!("name was not fetched");
    };
    assert_eq!(name_outcome.length, 11);
    assert_eq!(fetched.outcome.classification, Classification::StringDataTruncated);
    assert_eq!(fetched.outcome.warnings, 1);
}

#[test]
fn test_fetch_reports_column_errors() {
    let mut stmt = result_statement();
    stmt.bind_column(1, ColumnBinding::new(ClientType::IntervalHourToSecond));
    stmt.load_row(vec![None, Some(b"2023-12-31 08:09:10".to_vec()), None]).unwrap();

    let mut slot = None;
    let fetched = stmt.fetch([(1, ColumnBuffer::Value(&mut slot))]).unwrap();
    assert!(fetched.columns[0].1.is_err());
    assert_eq!(fetched.outcome.errors, 1);
}

#[test]
fn test_get_data_wide_chunks() {
    let mut stmt = result_statement();
    stmt.load_row(vec![None, None, Some("grüße aus köln".as_bytes().to_vec())]).unwrap();

    let binding = ColumnBinding::new(ClientType::WChar);
    let mut buf = [0u16; 5];
    let mut collected = Vec::new();
    while let Some(data) = stmt.get_data(2, binding, ColumnBuffer::Wide(&mut buf)).unwrap() {
        let ColumnData::Value(fetched) = data else {
            panic!("unexpected NULL");
        };
        collected.extend_from_slice(&buf[..fetched.written]);
    }
    assert_eq!(String::from_utf16(&collected).unwrap(), "grüße aus köln");

    assert_eq!(
        stmt.get_data(0, ColumnBinding::new(ClientType::SLong), ColumnBuffer::Value(&mut None))
            .unwrap(),
        Some(ColumnData::Null)
    );
    assert_eq!(
        stmt.get_data(0, ColumnBinding::new(ClientType::SLong), ColumnBuffer::Value(&mut None))
            .unwrap(),
        None
    );
}

#[test]
fn test_get_data_bit_chunks_end() {
    let mut stmt = statement(&Config::new(), "SELECT flags FROM t");
    stmt.execute().unwrap();
    stmt.set_result(vec![FieldMetadata::new(NativeType::Bit, 64)]);
    stmt.load_row(vec![Some(vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88])]).unwrap();

    let binding = ColumnBinding::new(ClientType::SLong);
    let mut chunks = Vec::new();
    while let Some(data) = stmt.get_data(0, binding, ColumnBuffer::Value(&mut None)).unwrap() {
        let ColumnData::Value(fetched) = data else {
            panic!("unexpected NULL");
        };
        chunks.push(fetched.classification);
        assert!(chunks.len() <= 2, "BIT value read past its end");
    }
    assert_eq!(chunks, [Classification::StringDataTruncated, Classification::Success]);
}

#[test]
fn test_row_shape_is_checked() {
    let mut stmt = result_statement();
    assert_eq!(
        stmt.load_row(vec![None]).unwrap_err(),
        Error::InvalidDescriptorIndex { index: 1 }
    );
}

#[test]
fn test_close_drops_result() {
    let mut stmt = result_statement();
    stmt.load_row(vec![None, None, None]).unwrap();
    stmt.close();
    assert!(stmt.fields().is_empty());
    assert_eq!(stmt.state(), StatementState::Prepared);
    let mut slot = None;
    assert_eq!(
        stmt.fetch([(0, ColumnBuffer::Value(&mut slot))]).unwrap_err(),
        Error::NoQuery
    );
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #[test]
    fn prop_text_literal_stays_one_token(s in "[a-z ?;'\"\\\\]{0,24}") {
        let config = Config::new().multi_statements(true);
        let mut stmt = statement(&config, "SELECT ?");
        stmt.bind_parameter(0, text_param(&s)).unwrap();
        let sql = texts(&mut stmt).remove(0);

        let reparsed = odbc_query::Query::prepare(&sql, ParseOptions::default().batch_allowed(true)).unwrap();
        prop_assert_eq!(reparsed.param_count(), 0);
        prop_assert!(!reparsed.is_multi_statement());
        prop_assert_eq!(reparsed.token_count(), 2);
    }
}
