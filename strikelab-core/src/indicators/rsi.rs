//! Relative Strength Index (RSI).
//!
//! delta[t] = close[t] - close[t-1]; gains and losses are the clipped parts.
//! avg_gain / avg_loss are exponential means with alpha = 1/window, seeded
//! with the first delta (no SMA warm-up).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss). Lookback: 1.
//!
//! Division edge cases: avg_loss == 0 → 100 while any gain exists;
//! no movement at all (both zero) → 50.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::ema::ema_of_series;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "RSI window must be >= 1");
        Self {
            window,
            name: Self::key(window),
        }
    }

    pub fn key(window: usize) -> String {
        format!("rsi_{window}")
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                // Leave the NaN in place; the smoother taints everything after it.
                if i > 1 {
                    break;
                }
                continue;
            }
            gains[i] = change.max(0.0);
            losses[i] = (-change).max(0.0);
        }

        let alpha = 1.0 / self.window as f64;
        let avg_gain = ema_of_series(&gains, alpha);
        let avg_loss = ema_of_series(&losses, alpha);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    rsi_from_averages(g, l)
                }
            })
            .collect()
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
