//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|);
//! the first bar has no previous close and uses high-low alone.
//! ATR is the simple rolling mean of TR over `period` bars.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::rolling::rolling_mean;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Per-bar true range. Undefined where the bar or the previous close is NaN.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut prev_close: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let span = bar.high - bar.low;
            let tr = match prev_close {
                _ if span.is_nan() => f64::NAN,
                None => span,
                Some(pc) if pc.is_nan() => f64::NAN,
                Some(pc) => span.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            };
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

/// Rolling-mean ATR over a precomputed bar series.
pub fn average_true_range(bars: &[Bar], period: usize) -> Vec<f64> {
    rolling_mean(&true_range(bars), period)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        average_true_range(bars, self.period)
    }
}
