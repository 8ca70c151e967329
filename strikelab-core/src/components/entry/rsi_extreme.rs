//! RSI extreme zone entry.
//!
//! State: RSI below `oversold` is bullish (reversal bet), above `overbought`
//! is bearish, anything in between is neutral. Entering either zone is the
//! signal; no further filter applies.

use crate::components::indicator::{Indicator, IndicatorValues, MissingIndicator};
use crate::components::state::{Reading, SignalState};
use crate::domain::{Bar, Direction};
use crate::indicators::Rsi;

use super::{Confirmation, EntryFilter};

/// Column key for an externally supplied RSI.
pub const PRECOMPUTED_RSI: &str = "rsi";

#[derive(Debug, Clone)]
pub struct RsiExtreme {
    pub window: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub precomputed: bool,
    rsi_key: String,
}

impl RsiExtreme {
    pub fn new(window: usize, oversold: f64, overbought: f64) -> Self {
        assert!(
            oversold < overbought,
            "oversold must be below overbought"
        );
        Self {
            window,
            oversold,
            overbought,
            precomputed: false,
            rsi_key: Rsi::key(window),
        }
    }

    /// Read RSI from the `rsi` column of the input.
    pub fn precomputed(oversold: f64, overbought: f64) -> Self {
        let mut filter = Self::new(14, oversold, overbought);
        filter.precomputed = true;
        filter.rsi_key = PRECOMPUTED_RSI.into();
        filter
    }

    pub fn default_params() -> Self {
        Self::new(14, 10.0, 80.0)
    }
}

impl EntryFilter for RsiExtreme {
    fn name(&self) -> &str {
        "rsi_extreme"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        if self.precomputed {
            Vec::new()
        } else {
            vec![Box::new(Rsi::new(self.window))]
        }
    }

    fn classify(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator> {
        let rsi = indicators.require(&self.rsi_key, bar_index)?;
        let state = if rsi < self.oversold {
            SignalState::Bullish
        } else if rsi > self.overbought {
            SignalState::Bearish
        } else {
            SignalState::Neutral
        };
        Ok(Reading::State(state))
    }

    fn confirm(
        &self,
        _direction: Direction,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator> {
        Ok(Confirmation::Accepted {
            trigger_value: Some(indicators.require(&self.rsi_key, bar_index)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn zones_classify() {
        let bars = make_bars(&[100.0; 3]);
        let mut ind = IndicatorValues::new();
        ind.insert(PRECOMPUTED_RSI, vec![5.0, 50.0, 85.0]);
        let f = RsiExtreme::precomputed(10.0, 80.0);
        assert_eq!(
            f.classify(&bars, 0, &ind).unwrap(),
            Reading::State(SignalState::Bullish)
        );
        assert_eq!(
            f.classify(&bars, 1, &ind).unwrap(),
            Reading::State(SignalState::Neutral)
        );
        assert_eq!(
            f.classify(&bars, 2, &ind).unwrap(),
            Reading::State(SignalState::Bearish)
        );
    }

    #[test]
    fn trigger_value_is_rsi() {
        let bars = make_bars(&[100.0]);
        let mut ind = IndicatorValues::new();
        ind.insert(Rsi::key(14), vec![7.5]);
        let f = RsiExtreme::default_params();
        assert_eq!(
            f.confirm(Direction::Long, &bars, 0, &ind).unwrap(),
            Confirmation::Accepted {
                trigger_value: Some(7.5)
            }
        );
    }
}
