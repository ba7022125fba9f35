//! Row decoding benchmarks.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rowscan_core::{
    DecoderConfig, DuplicatePolicy, MemoryCursor, Metadata, RawValue, Rows, TypeTag,
};

const COLUMNS: [(&str, &str); 6] = [
    ("id", "INT8"),
    ("name", "VARCHAR"),
    ("is_good", "BOOL"),
    ("born", "DATE"),
    ("seen_at", "TIMESTAMP"),
    ("score", "NUMERIC"),
];

fn raw_row(i: i64) -> Vec<RawValue> {
    let born = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let seen_at = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 45, 30)
        .unwrap();
    vec![
        RawValue::Int(i),
        RawValue::Text(format!("user-{}", i)),
        RawValue::Bool(i % 2 == 0),
        RawValue::Date(born),
        RawValue::Timestamp(seen_at),
        RawValue::Float(i as f64 * 1.5),
    ]
}

fn cursor(rows: i64) -> MemoryCursor {
    (0..rows).fold(MemoryCursor::with_columns(COLUMNS), |cursor, i| {
        cursor.row(raw_row(i))
    })
}

fn registry_lookup_benchmark(c: &mut Criterion) {
    let names = ["VARCHAR", "BOOL", "DATE", "TIMESTAMP", "NUMERIC", "INT8", "UUID"];

    c.bench_function("registry_from_vendor_7", |b| {
        b.iter(|| {
            for name in names {
                black_box(TypeTag::from_vendor(black_box(name)));
            }
        })
    });
}

fn metadata_build_benchmark(c: &mut Criterion) {
    c.bench_function("metadata_build_6", |b| {
        b.iter(|| {
            let builder = COLUMNS
                .iter()
                .fold(Metadata::builder(), |builder, (name, ty)| {
                    builder.append(*name, *ty)
                });
            black_box(builder.build().unwrap().len())
        })
    });

    c.bench_function("metadata_from_columns_6", |b| {
        b.iter(|| {
            let md = Metadata::from_columns(COLUMNS, DuplicatePolicy::Reject).unwrap();
            black_box(md.len())
        })
    });
}

fn decode_rows_benchmark(c: &mut Criterion) {
    let config = DecoderConfig::default();

    c.bench_function("decode_rows_1000", |b| {
        b.iter_batched(
            || cursor(1000),
            |cursor| {
                let rows = Rows::new(cursor, &config).unwrap();
                black_box(rows.filter_map(Result::ok).count())
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn typed_access_benchmark(c: &mut Criterion) {
    let row = Rows::new(cursor(1), &DecoderConfig::default())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();

    c.bench_function("typed_access_6", |b| {
        b.iter(|| {
            black_box(row.get_int("id").ok());
            black_box(row.get_string("name").ok());
            black_box(row.get_bool("is_good").ok());
            black_box(row.get_date("born").ok());
            black_box(row.get_timestamp("seen_at").ok());
            black_box(row.get_numeric("score").ok());
        })
    });
}

criterion_group!(
    benches,
    registry_lookup_benchmark,
    metadata_build_benchmark,
    decode_rows_benchmark,
    typed_access_benchmark,
);
criterion_main!(benches);
