//! Concrete indicator implementations.
//!
//! Each type implements `components::indicator::Indicator` and yields one
//! named series. SuperTrend, Bollinger and Stochastic have several outputs,
//! so each output is its own instance with its own key.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rolling;
pub mod rsi;
pub mod stochastic;
pub mod supertrend;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerOutput, BollingerParams};
pub use ema::Ema;
pub use rsi::Rsi;
pub use stochastic::{Stochastic, StochasticLine};
pub use supertrend::{Supertrend, SupertrendOutput};

/// Five-minute bars from close prices: open is the previous close,
/// high/low sit one point outside the body.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    let ohlc: Vec<_> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = i.checked_sub(1).map_or(close, |p| closes[p]);
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_bars(&ohlc)
}

/// Five-minute bars from 2025-01-06 00:00, one per (open, high, low, close).
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2025, 1, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| crate::domain::Bar {
            timestamp: base + chrono::Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Panics unless `actual` is within `epsilon` of `expected`.
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
