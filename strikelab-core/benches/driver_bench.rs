//! Criterion benchmarks for StrikeLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute per strategy
//! 2. Driver walk over precomputed values

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use strikelab_core::components::factory::{create_filter, EntryFilterConfig};
use strikelab_core::components::indicator::IndicatorValues;
use strikelab_core::domain::Bar;
use strikelab_core::engine::{precompute_indicators, run_backtest, BacktestSettings};

fn make_bars(n: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 40_000.0 + (i as f64 * 0.05).sin() * 800.0 + (i as f64 * 0.31).cos() * 150.0;
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open: close - 15.0,
                high: close + 60.0,
                low: close - 60.0,
                close,
                volume: 1.0,
            }
        })
        .collect()
}

fn bench_precompute(c: &mut Criterion) {
    let bars = make_bars(50_000);
    let mut group = c.benchmark_group("precompute");
    for config in EntryFilterConfig::all_defaults() {
        let filter = create_filter(&config).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(config.type_name()),
            &bars,
            |b, bars| {
                b.iter(|| precompute_indicators(black_box(bars), filter.as_ref(), IndicatorValues::new()))
            },
        );
    }
    group.finish();
}

fn bench_driver(c: &mut Criterion) {
    let bars = make_bars(50_000);
    let mut group = c.benchmark_group("driver");
    for config in EntryFilterConfig::all_defaults() {
        let filter = create_filter(&config).unwrap();
        let ind = precompute_indicators(&bars, filter.as_ref(), IndicatorValues::new());
        let settings = BacktestSettings::new(config.default_strike_offset());
        group.bench_function(BenchmarkId::from_parameter(config.type_name()), |b| {
            b.iter(|| run_backtest(black_box(&bars), &ind, filter.as_ref(), &settings))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_precompute, bench_driver);
criterion_main!(benches);
