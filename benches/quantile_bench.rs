//! Quantile and Sizing Benchmarks — Hot-Path Performance
//!
//! Benchmarks the percentile and Kelly math that runs per evaluation,
//! over a history the size of a five-year weekly look-back.
//!
//! Run with: cargo bench --bench quantile_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use valuation_oracle::domain::kelly::{kelly_fraction, sell_step};
use valuation_oracle::domain::quantile::{decile_breakpoints, quantile_rank};
use valuation_oracle::domain::series::holding_win_rate;

/// Five years of weekly observations on a bumpy curve.
fn weekly_history() -> Vec<f64> {
    (0..260)
        .map(|i| 15.0 + 8.0 * (f64::from(i) / 17.0).sin() + f64::from(i % 13) / 10.0)
        .collect()
}

/// Benchmark the full rank (sort + breakpoints + interpolation).
fn bench_quantile_rank(c: &mut Criterion) {
    let history = weekly_history();

    c.bench_function("quantile_rank_260", |b| {
        b.iter(|| {
            let _rank = quantile_rank(black_box(17.3), black_box(&history));
        });
    });
}

/// Benchmark breakpoint construction alone.
fn bench_decile_breakpoints(c: &mut Criterion) {
    let history = weekly_history();

    c.bench_function("decile_breakpoints_260", |b| {
        b.iter(|| {
            let _bp = decile_breakpoints(black_box(&history));
        });
    });
}

/// Benchmark the Kelly fraction plus the sell table.
fn bench_kelly_sizing(c: &mut Criterion) {
    c.bench_function("kelly_fraction_and_sell_step", |b| {
        b.iter(|| {
            let _f = kelly_fraction(black_box(0.62), black_box(2.3));
            let _s = sell_step(black_box(0.91));
        });
    });
}

/// Benchmark the holding win rate over a daily three-year series.
fn bench_holding_win_rate(c: &mut Criterion) {
    let prices: Vec<f64> = (0..1000)
        .map(|i| 100.0 + 20.0 * (f64::from(i) / 41.0).sin())
        .collect();

    c.bench_function("holding_win_rate_1000x120", |b| {
        b.iter(|| {
            let _rate = holding_win_rate(black_box(&prices), black_box(120));
        });
    });
}

criterion_group!(
    benches,
    bench_quantile_rank,
    bench_decile_breakpoints,
    bench_kelly_sizing,
    bench_holding_win_rate,
);
criterion_main!(benches);
