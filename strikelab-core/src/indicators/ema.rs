//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2/(span+1).
//! Seed: EMA[0] = close[0] (no SMA warm-up), so the series is defined from the
//! first bar. Lookback: 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: Self::key(span),
        }
    }

    pub fn key(span: usize) -> String {
        format!("ema_{span}")
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, 2.0 / (self.span as f64 + 1.0))
    }
}

/// Seeded exponential mean of an arbitrary series with smoothing `alpha`.
///
/// Leading NaNs are skipped; the first defined value is the seed. A NaN after
/// the seed taints every later value.
pub fn ema_of_series(values: &[f64], alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return result,
    };

    let mut prev = values[start];
    result[start] = prev;

    for i in (start + 1)..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5, seed = 10
        // EMA[1] = 0.5*12 + 0.5*10 = 11
        // EMA[2] = 0.5*14 + 0.5*11 = 12.5
        let bars = make_bars(&[10.0, 12.0, 14.0]);
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 11.0, DEFAULT_EPSILON);
        assert_approx(result[2], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_is_bit_reproducible() {
        let bars = make_bars(&[101.3, 99.7, 104.2, 98.8, 100.1]);
        let a = Ema::new(4).compute(&bars);
        let b = Ema::new(4).compute(&bars);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        bars[2].close = f64::NAN;
        let result = Ema::new(3).compute(&bars);
        assert!(!result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn ema_of_series_skips_leading_nan() {
        let result = ema_of_series(&[f64::NAN, 4.0, 8.0], 0.5);
        assert!(result[0].is_nan());
        assert_approx(result[1], 4.0, DEFAULT_EPSILON);
        assert_approx(result[2], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_key_matches_name() {
        assert_eq!(Ema::new(50).name(), Ema::key(50));
    }
}
