//! Statement preparation integration tests.
//!
//! These exercise the full pipeline: escape rewriting, trimming, comment
//! removal, tokenization and classification.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use odbc_query::{ParseError, ParseOptions, Query, QueryKind, Rewriter, rewrite};
use proptest::prelude::*;

fn batch() -> ParseOptions {
    ParseOptions::default().batch_allowed(true)
}

// =============================================================================
// Escape rewriting
// =============================================================================

#[test]
fn test_escapes_inside_statement() {
    let q = Query::prepare(
        "SELECT {fn CONCAT(name, '}')} FROM t WHERE d = {d '2024-02-29'} AND x = ?",
        ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        q.original(),
        "SELECT CONCAT(name, '}') FROM t WHERE d = DATE '2024-02-29' AND x = ?"
    );
    assert_eq!(q.param_count(), 1);
}

#[test]
fn test_rewrite_errors_surface_from_prepare() {
    let err = Query::prepare("SELECT 1 }", ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::UnmatchedClosingBrace { .. }));
    assert_eq!(err.sqlstate(), "42000");

    let err = Query::prepare("SELECT {fn NOW()", ParseOptions::default()).unwrap_err();
    assert_eq!(err, ParseError::UnmatchedOpeningBrace);
}

#[test]
fn test_custom_translator() {
    let upper = |clause: &str| -> Result<String, ParseError> { Ok(clause.to_uppercase()) };
    let q = Query::prepare_with("select {abc}", ParseOptions::default(), &upper).unwrap();
    assert_eq!(q.original(), "select ABC");
}

#[test]
fn test_depth_limit_from_options() {
    let sql = format!("SELECT {}1{}", "{fn ABS(".repeat(3), ")}".repeat(3));
    assert!(Query::prepare(&sql, ParseOptions::default()).is_ok());
    let err = Query::prepare(&sql, ParseOptions::default().max_escape_depth(2)).unwrap_err();
    assert_eq!(err, ParseError::NestingTooDeep { max: 2 });
}

// =============================================================================
// Classification and batches
// =============================================================================

#[test]
fn test_kinds_of_common_statements() {
    let cases = [
        ("SELECT 1", QueryKind::Select),
        ("WITH x AS (SELECT 1) SELECT * FROM x", QueryKind::Select),
        ("insert into t values (1)", QueryKind::Insert),
        ("REPLACE INTO t VALUES (1)", QueryKind::Insert),
        ("UPDATE t SET a = 1", QueryKind::Update),
        ("DELETE FROM t", QueryKind::Delete),
        ("CALL p()", QueryKind::Call),
        ("SHOW TABLES", QueryKind::Show),
        ("EXPLAIN SELECT 1", QueryKind::Explain),
        ("DESC t", QueryKind::Describe),
        ("SET NAMES utf8mb4", QueryKind::SetNames),
        ("SET @x = 1", QueryKind::Set),
        ("CREATE TABLE t (a INT)", QueryKind::NoResult),
        ("SELECT a INTO @v FROM t", QueryKind::SelectInto),
        ("COMMIT", QueryKind::NoResult),
    ];
    for (sql, kind) in cases {
        let q = Query::prepare(sql, ParseOptions::default()).unwrap();
        assert_eq!(q.kind(), kind, "{sql}");
    }
}

#[test]
fn test_batch_with_result_in_second_statement() {
    let q = Query::prepare("UPDATE t SET a = ?; SELECT a FROM t WHERE b = ?", batch()).unwrap();
    assert!(q.is_multi_statement());
    assert_eq!(q.kind(), QueryKind::Update);
    assert!(q.returns_result());
    assert_eq!(q.param_count(), 2);
    let kinds: Vec<_> = q.sub_statements().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, [QueryKind::Update, QueryKind::Select]);
}

#[test]
fn test_semicolon_in_string_is_not_a_separator() {
    let q = Query::prepare("SELECT ';' FROM t; SELECT 2", batch()).unwrap();
    assert_eq!(q.sub_statements().len(), 2);
    assert_eq!(q.sub_statement_text(0), Some("SELECT ';' FROM t"));
}

#[test]
fn test_compound_block_kept_whole() {
    let sql = "BEGIN NOT ATOMIC DECLARE x INT; SET x = 1; SELECT x; END";
    let q = Query::prepare(sql, batch()).unwrap();
    assert_eq!(q.kind(), QueryKind::NotAtomicBlock);
    assert!(!q.is_multi_statement());
    assert!(!q.refined_bytes().contains(&0));
}

#[test]
fn test_empty_statements_in_batch() {
    let q = Query::prepare("SELECT 1;;SELECT 2", batch()).unwrap();
    assert_eq!(q.sub_statements().len(), 2);
    assert_eq!(q.sub_statement_text(0), Some("SELECT 1"));
    assert_eq!(q.sub_statement_text(1), Some("SELECT 2"));

    let q = Query::prepare("INSERT INTO t VALUES (1); ; ;UPDATE t SET a = 2", batch()).unwrap();
    let kinds: Vec<_> = q.sub_statements().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, [QueryKind::Insert, QueryKind::Update]);
    assert!(!q.returns_result());
}

#[test]
fn test_positioned_update_in_batch() {
    let q = Query::prepare("UPDATE t SET a = ? WHERE CURRENT OF c1; SELECT a FROM t", batch()).unwrap();
    assert!(q.is_multi_statement());
    assert_eq!(q.cursor_name(), Some("c1"));
    assert_eq!(q.sub_statement_text(0), Some("UPDATE t SET a = ? WHERE CURRENT OF c1"));
}

#[test]
fn test_trailing_comment_after_separator() {
    let q = Query::prepare("SELECT 1; -- done", batch()).unwrap();
    assert_eq!(q.sub_statements().len(), 1);
    assert_eq!(q.sub_statement_text(0), Some("SELECT 1"));
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #[test]
    fn prop_rewrite_without_braces_is_identity(s in "[^{}]*") {
        prop_assert_eq!(rewrite(&s).unwrap(), s);
    }

    #[test]
    fn prop_offsets_stay_in_bounds(s in "\\PC{0,64}", batch in any::<bool>()) {
        let opts = ParseOptions::default().batch_allowed(batch).escape_processing(false);
        let q = Query::prepare(&s, opts).unwrap();
        let len = q.refined_bytes().len();
        for &t in q.token_offsets() {
            prop_assert!(t < len);
        }
        for &p in q.param_offsets() {
            prop_assert_eq!(q.refined_bytes()[p], b'?');
        }
        for w in q.token_offsets().windows(2) {
            prop_assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn prop_batch_sub_statements_never_empty(parts in proptest::collection::vec("(SELECT 1|COMMIT| )?", 1..6)) {
        let sql = parts.join(";");
        let q = Query::prepare(&sql, batch()).unwrap();
        let expected = parts.iter().filter(|p| !p.trim().is_empty()).count();
        prop_assert_eq!(q.sub_statements().len(), expected);
        for i in 0..expected {
            prop_assert!(!q.sub_statement_text(i).unwrap_or_default().is_empty());
        }
    }

    #[test]
    fn prop_rewriter_never_panics(s in "[{}'\"`a ]{0,32}") {
        let identity = |c: &str| -> Result<String, ParseError> { Ok(c.to_string()) };
        let _ = Rewriter::new(&s, &identity).max_depth(8).rewrite();
    }
}
