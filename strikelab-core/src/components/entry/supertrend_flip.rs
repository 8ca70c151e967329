//! SuperTrend flip: enter on the bar where the trend sign changes.
//!
//! Trend +1 is bullish, -1 is bearish. No additional filter: every flip
//! qualifies.

use crate::components::indicator::{Indicator, IndicatorValues, MissingIndicator};
use crate::components::state::{Reading, SignalState};
use crate::domain::{Bar, Direction};
use crate::indicators::{Supertrend, SupertrendOutput};

use super::{Confirmation, EntryFilter};

#[derive(Debug, Clone)]
pub struct SupertrendFlip {
    pub period: usize,
    pub multiplier: f64,
    trend_key: String,
}

impl SupertrendFlip {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "period must be >= 1");
        assert!(multiplier > 0.0, "multiplier must be > 0");
        Self {
            period,
            multiplier,
            trend_key: Supertrend::key(period, multiplier, SupertrendOutput::Trend),
        }
    }

    pub fn default_params() -> Self {
        Self::new(10, 3.0)
    }
}

impl EntryFilter for SupertrendFlip {
    fn name(&self) -> &str {
        "supertrend_flip"
    }

    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Supertrend::trend(self.period, self.multiplier)),
            Box::new(Supertrend::line(self.period, self.multiplier)),
        ]
    }

    fn classify(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator> {
        let trend = indicators.require(&self.trend_key, bar_index)?;
        Ok(if trend > 0.0 {
            Reading::State(SignalState::Bullish)
        } else if trend < 0.0 {
            Reading::State(SignalState::Bearish)
        } else {
            Reading::Tie
        })
    }

    fn confirm(
        &self,
        _direction: Direction,
        _bars: &[Bar],
        _bar_index: usize,
        _indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator> {
        Ok(Confirmation::Accepted {
            trigger_value: None,
        })
    }
}
