//! Benchmarks for statement preparation.

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use odbc_query::{ParseOptions, Query, rewrite};
use std::hint::black_box;

const SIMPLE: &str = "SELECT id, name FROM users WHERE id = ?";
const ESCAPED: &str = "SELECT {fn UCASE(name)}, {fn TIMESTAMPADD(SQL_TSI_DAY, 1, {fn NOW()})} \
                       FROM orders WHERE placed > {ts '2024-01-01 00:00:00'} AND id = ?";
const BATCH: &str = "/* load */ INSERT INTO t VALUES (?, ?); UPDATE t SET a = ? WHERE b = ?; \
                     SELECT * FROM t -- done";

fn bench_rewrite(c: &mut Criterion) {
    c.bench_function("rewrite_escaped", |b| b.iter(|| rewrite(black_box(ESCAPED)).unwrap()));
    c.bench_function("rewrite_plain", |b| b.iter(|| rewrite(black_box(SIMPLE)).unwrap()));
}

fn bench_prepare(c: &mut Criterion) {
    let batch = ParseOptions::default().batch_allowed(true);
    c.bench_function("prepare_simple", |b| {
        b.iter(|| Query::prepare(black_box(SIMPLE), ParseOptions::default()).unwrap())
    });
    c.bench_function("prepare_batch", |b| {
        b.iter(|| Query::prepare(black_box(BATCH), batch).unwrap())
    });
}

criterion_group!(benches, bench_rewrite, bench_prepare);
criterion_main!(benches);
