//! Stochastic oscillator (%K / %D).
//!
//! raw %K[t] = 100 × (close[t] - LL) / (HH - LL) over the last `k_period` bars,
//! where HH/LL are the highest high / lowest low. A flat range (HH == LL)
//! reads 50.
//! %K = SMA(raw %K, smooth); %D = SMA(%K, d_period).
//!
//! Lookback: k_period - 1 + smooth - 1 for %K, plus d_period - 1 for %D.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::rolling::rolling_mean;

/// Which stochastic line to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    smooth: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(k_period: usize, smooth: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(k_period >= 1, "Stochastic k_period must be >= 1");
        assert!(smooth >= 1, "Stochastic smooth must be >= 1");
        assert!(d_period >= 1, "Stochastic d_period must be >= 1");
        Self {
            k_period,
            smooth,
            d_period,
            line,
            name: Self::key(k_period, smooth, d_period, line),
        }
    }

    pub fn key(k_period: usize, smooth: usize, d_period: usize, line: StochasticLine) -> String {
        match line {
            StochasticLine::K => format!("stoch_k_{k_period}_{smooth}"),
            StochasticLine::D => format!("stoch_d_{k_period}_{smooth}_{d_period}"),
        }
    }
}

fn raw_k(bars: &[Bar], k_period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < k_period {
        return result;
    }

    for i in (k_period - 1)..n {
        let window = &bars[i + 1 - k_period..=i];
        if window.iter().any(|b| b.is_void()) {
            continue;
        }
        let hh = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let ll = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let close = bars[i].close;
        result[i] = if hh == ll {
            50.0
        } else {
            100.0 * (close - ll) / (hh - ll)
        };
    }

    result
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.k_period - 1 + self.smooth - 1;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = rolling_mean(&raw_k(bars, self.k_period), self.smooth);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => rolling_mean(&k, self.d_period),
        }
    }
}
