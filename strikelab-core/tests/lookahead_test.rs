//! Look-ahead contamination tests.
//!
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and on the full series
//! (bars 0..300). Values for bars 0..150 must be identical. The same holds for
//! driver trades, except those in the truncated series' final window, which
//! resolve against a different last bar.

use chrono::{Duration, NaiveDate};
use strikelab_core::components::factory::{create_filter, EntryFilterConfig};
use strikelab_core::components::indicator::{Indicator, IndicatorValues};
use strikelab_core::domain::{Bar, LockGranularity};
use strikelab_core::engine::{precompute_indicators, run_backtest, BacktestSettings};
use strikelab_core::indicators::*;

/// Deterministic pseudo-random walk of 5-minute bars.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2025, 2, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut price = 40_000.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 200) as f64 - 100.0;
            let open = price;
            price += change;
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open,
                high: open.max(price) + 20.0,
                low: open.min(price) - 20.0,
                close: price,
                volume: 1.0,
            }
        })
        .collect()
}

fn assert_no_lookahead(indicator: &dyn Indicator, full: &[Bar], cut: usize) {
    let truncated = indicator.compute(&full[..cut]);
    let complete = indicator.compute(full);
    assert_eq!(truncated.len(), cut, "{}: truncated length", indicator.name());
    assert_eq!(complete.len(), full.len(), "{}: full length", indicator.name());

    for i in 0..cut {
        let (t, f) = (truncated[i], complete[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert_eq!(
            t.to_bits(),
            f.to_bits(),
            "{}: value differs at bar {i} (truncated={t}, full={f})",
            indicator.name()
        );
    }
}

#[test]
fn indicators_do_not_look_ahead() {
    let bars = make_test_bars(300);
    let bands = BollingerParams::default();
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Ema::new(50)),
        Box::new(Ema::new(200)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Supertrend::trend(10, 3.0)),
        Box::new(Supertrend::line(10, 3.0)),
        Box::new(Bollinger::new(bands, BollingerOutput::Upper)),
        Box::new(Bollinger::new(bands, BollingerOutput::Middle)),
        Box::new(Bollinger::new(bands, BollingerOutput::Lower)),
        Box::new(Bollinger::new(bands, BollingerOutput::Width)),
        Box::new(Bollinger::new(bands, BollingerOutput::Squeeze)),
        Box::new(Stochastic::new(14, 3, 3, StochasticLine::K)),
        Box::new(Stochastic::new(14, 3, 3, StochasticLine::D)),
    ];
    for indicator in &indicators {
        assert_no_lookahead(indicator.as_ref(), &bars, 150);
    }
}

#[test]
fn lookback_prefix_is_undefined_and_rest_defined() {
    let bars = make_test_bars(300);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Supertrend::trend(10, 3.0)),
        Box::new(Stochastic::new(14, 3, 3, StochasticLine::D)),
        Box::new(Bollinger::new(BollingerParams::default(), BollingerOutput::Squeeze)),
    ];
    for indicator in &indicators {
        let values = indicator.compute(&bars);
        let lb = indicator.lookback();
        assert!(
            values[..lb].iter().all(|v| v.is_nan()),
            "{}: defined inside lookback",
            indicator.name()
        );
        assert!(
            values[lb..].iter().all(|v| !v.is_nan()),
            "{}: undefined after lookback",
            indicator.name()
        );
    }
}

#[test]
fn driver_trades_do_not_look_ahead() {
    let bars = make_test_bars(600);
    let cut = 300;
    let granularity = LockGranularity::hourly();
    let last_key = granularity.window_key(bars[cut - 1].timestamp);

    for config in EntryFilterConfig::all_defaults() {
        let filter = create_filter(&config).unwrap();
        let settings = BacktestSettings::new(50.0);
        let run_on = |series: &[Bar]| {
            let ind = precompute_indicators(series, filter.as_ref(), IndicatorValues::new());
            run_backtest(series, &ind, filter.as_ref(), &settings)
        };

        let truncated = run_on(&bars[..cut]);
        let full = run_on(&bars);

        let settled: Vec<_> = truncated
            .trades
            .iter()
            .filter(|t| t.signal_window_key < last_key)
            .collect();
        let full_prefix: Vec<_> = full
            .trades
            .iter()
            .filter(|t| t.signal_window_key < last_key)
            .collect();
        assert_eq!(settled, full_prefix, "{}: trades differ", config.type_name());
    }
}
