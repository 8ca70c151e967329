//! Stochastic %K/%D crossover with extremity filter.
//!
//! State: %K above %D is bullish, below is bearish, equal carries forward.
//! - Long: %K crosses above %D while %K < oversold
//! - Short: %K crosses below %D while %K > overbought
//!
//! With `precomputed`, %K and %D are read from the `k` and `d` input columns
//! instead of being computed from the bars.

use crate::components::indicator::{Indicator, IndicatorValues, MissingIndicator};
use crate::components::state::Reading;
use crate::domain::{Bar, Direction};
use crate::indicators::{Stochastic, StochasticLine};

use super::{Confirmation, EntryFilter};

/// Column keys for externally supplied oscillator values.
pub const PRECOMPUTED_K: &str = "k";
pub const PRECOMPUTED_D: &str = "d";

#[derive(Debug, Clone)]
pub struct StochasticCrossover {
    pub k_period: usize,
    pub smooth: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub precomputed: bool,
    k_key: String,
    d_key: String,
}

impl StochasticCrossover {
    pub fn new(
        k_period: usize,
        smooth: usize,
        d_period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Self {
        assert!(
            oversold < overbought,
            "oversold must be below overbought"
        );
        Self {
            k_period,
            smooth,
            d_period,
            oversold,
            overbought,
            precomputed: false,
            k_key: Stochastic::key(k_period, smooth, d_period, StochasticLine::K),
            d_key: Stochastic::key(k_period, smooth, d_period, StochasticLine::D),
        }
    }

    /// Read %K/%D from the `k`/`d` columns of the input.
    pub fn precomputed(oversold: f64, overbought: f64) -> Self {
        let mut filter = Self::new(14, 3, 3, oversold, overbought);
        filter.precomputed = true;
        filter.k_key = PRECOMPUTED_K.into();
        filter.d_key = PRECOMPUTED_D.into();
        filter
    }

    pub fn default_params() -> Self {
        Self::new(14, 3, 3, 20.0, 80.0)
    }

    fn lines(&self, bar_index: usize, ind: &IndicatorValues) -> Result<(f64, f64), MissingIndicator> {
        Ok((
            ind.require(&self.k_key, bar_index)?,
            ind.require(&self.d_key, bar_index)?,
        ))
    }
}

impl EntryFilter for StochasticCrossover {
    fn name(&self) -> &str {
        "stochastic_crossover"
    }

    fn warmup_bars(&self) -> usize {
        if self.precomputed {
            0
        } else {
            Stochastic::new(self.k_period, self.smooth, self.d_period, StochasticLine::D).lookback()
        }
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        if self.precomputed {
            return Vec::new();
        }
        vec![
            Box::new(Stochastic::new(
                self.k_period,
                self.smooth,
                self.d_period,
                StochasticLine::K,
            )),
            Box::new(Stochastic::new(
                self.k_period,
                self.smooth,
                self.d_period,
                StochasticLine::D,
            )),
        ]
    }

    fn classify(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator> {
        let (k, d) = self.lines(bar_index, indicators)?;
        Ok(Reading::compare(k, d))
    }

    fn confirm(
        &self,
        direction: Direction,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator> {
        let (k, _) = self.lines(bar_index, indicators)?;
        let extreme = match direction {
            Direction::Long => k < self.oversold,
            Direction::Short => k > self.overbought,
        };
        Ok(if extreme {
            Confirmation::Accepted {
                trigger_value: Some(k),
            }
        } else {
            Confirmation::Rejected
        })
    }
}
