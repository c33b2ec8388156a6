//! Benchmarks for schedule assembly and table coercion.
//!
//! Run with: `cargo bench --package isskit-bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use isskit_bench::{BondShape, history_table, synthetic_inputs};
use isskit_bonds::{ScheduleOptions, assemble};
use isskit_fetch::cast_columns;
use std::hint::black_box;

fn shapes() -> Vec<(&'static str, BondShape)> {
    vec![
        (
            "bullet-10y",
            BondShape { periods: 20, amortized: 1, offer_every: 0, unknown_rate_every: 0 },
        ),
        (
            "amortizing-15y",
            BondShape { periods: 30, amortized: 10, offer_every: 0, unknown_rate_every: 0 },
        ),
        (
            "floating-with-offers-30y",
            BondShape { periods: 60, amortized: 4, offer_every: 6, unknown_rate_every: 3 },
        ),
    ]
}

fn assemble_benchmark(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    let mut group = c.benchmark_group("assemble");

    for (name, shape) in shapes() {
        let inputs = synthetic_inputs(shape);
        group.throughput(Throughput::Elements(shape.periods as u64));

        for (label, options) in [
            ("plain", ScheduleOptions::default()),
            (
                "till-offer-carry",
                ScheduleOptions { truncate_at_next_offer: true, carry_last_known_coupon: true },
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(label, name), &inputs, |b, inputs| {
                b.iter(|| assemble(black_box(inputs.clone()), options, today).unwrap());
            });
        }
    }

    group.finish();
}

fn cast_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast_columns");

    for rows in [100, 1_000, 10_000] {
        let raw = history_table(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &raw, |b, raw| {
            b.iter(|| cast_columns(black_box(raw.clone())));
        });
    }

    group.finish();
}

criterion_group!(benches, assemble_benchmark, cast_benchmark);
criterion_main!(benches);
