//! SuperTrend: ATR-band trend follower.
//!
//! Inherently sequential/stateful: the trend persists from the previous bar
//! unless the close crosses the opposite band of the previous bar.
//!
//! Bands: hl2 ± multiplier × ATR(period), recomputed every bar (no ratcheting).
//! Trend is seeded at +1; for t >= period:
//! - close[t] > upper[t-1] → +1
//! - close[t] < lower[t-1] → -1
//! - otherwise carry trend[t-1]
//!
//! Two outputs, exposed as separate instances:
//! - `Trend`: +1.0 / -1.0
//! - `Line`: lower band while trending up, upper band while trending down
//!
//! Both are NaN for the first `period` bars.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::atr::average_true_range;

/// Which SuperTrend output series to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupertrendOutput {
    Trend,
    Line,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    output: SupertrendOutput,
    name: String,
}

impl Supertrend {
    pub fn trend(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, SupertrendOutput::Trend)
    }

    pub fn line(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, SupertrendOutput::Line)
    }

    fn build(period: usize, multiplier: f64, output: SupertrendOutput) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        assert!(multiplier > 0.0, "Supertrend multiplier must be > 0");
        Self {
            period,
            multiplier,
            output,
            name: Self::key(period, multiplier, output),
        }
    }

    pub fn key(period: usize, multiplier: f64, output: SupertrendOutput) -> String {
        match output {
            SupertrendOutput::Trend => format!("supertrend_trend_{period}_{multiplier}"),
            SupertrendOutput::Line => format!("supertrend_line_{period}_{multiplier}"),
        }
    }
}

/// Compute (trend, line) for the whole series.
pub fn supertrend_series(bars: &[Bar], period: usize, multiplier: f64) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut trend_out = vec![f64::NAN; n];
    let mut line_out = vec![f64::NAN; n];

    let atr = average_true_range(bars, period);
    let upper: Vec<f64> = bars
        .iter()
        .zip(&atr)
        .map(|(b, a)| b.hl2() + multiplier * a)
        .collect();
    let lower: Vec<f64> = bars
        .iter()
        .zip(&atr)
        .map(|(b, a)| b.hl2() - multiplier * a)
        .collect();

    let mut trend = 1.0;
    for i in period..n {
        // NaN comparisons are false, so an undefined band carries the trend.
        let close = bars[i].close;
        if close > upper[i - 1] {
            trend = 1.0;
        } else if close < lower[i - 1] {
            trend = -1.0;
        }

        trend_out[i] = trend;
        line_out[i] = if trend > 0.0 { lower[i] } else { upper[i] };
    }

    (trend_out, line_out)
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (trend, line) = supertrend_series(bars, self.period, self.multiplier);
        match self.output {
            SupertrendOutput::Trend => trend,
            SupertrendOutput::Line => line,
        }
    }
}
