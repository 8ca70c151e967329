//! EMA trend + Bollinger squeeze breakout.
//!
//! State: close above the upper band is bullish, below the lower band is
//! bearish, anything inside the bands is neutral. A breakout is the transition
//! out of the bands.
//! - Long: breakout above, EMA short > EMA long, squeeze active, bullish bar
//! - Short: breakout below, EMA short < EMA long, squeeze active, bearish bar

use crate::components::indicator::{Indicator, IndicatorValues, MissingIndicator};
use crate::components::state::{Reading, SignalState};
use crate::domain::{Bar, Direction};
use crate::indicators::{Bollinger, BollingerOutput, BollingerParams, Ema};

use super::{Confirmation, EntryFilter};

#[derive(Debug, Clone)]
pub struct SqueezeBreakout {
    pub ema_short: usize,
    pub ema_long: usize,
    pub bands: BollingerParams,
    ema_short_key: String,
    ema_long_key: String,
    upper_key: String,
    lower_key: String,
    squeeze_key: String,
}

impl SqueezeBreakout {
    pub fn new(ema_short: usize, ema_long: usize, bands: BollingerParams) -> Self {
        assert!(ema_short < ema_long, "ema_short must be shorter than ema_long");
        Self {
            ema_short,
            ema_long,
            bands,
            ema_short_key: Ema::key(ema_short),
            ema_long_key: Ema::key(ema_long),
            upper_key: Bollinger::key(&bands, BollingerOutput::Upper),
            lower_key: Bollinger::key(&bands, BollingerOutput::Lower),
            squeeze_key: Bollinger::key(&bands, BollingerOutput::Squeeze),
        }
    }

    pub fn default_params() -> Self {
        Self::new(50, 200, BollingerParams::default())
    }
}

impl EntryFilter for SqueezeBreakout {
    fn name(&self) -> &str {
        "squeeze_breakout"
    }

    fn warmup_bars(&self) -> usize {
        self.ema_long.max(self.bands.window + 1)
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.ema_short)),
            Box::new(Ema::new(self.ema_long)),
            Box::new(Bollinger::new(self.bands, BollingerOutput::Upper)),
            Box::new(Bollinger::new(self.bands, BollingerOutput::Lower)),
            Box::new(Bollinger::new(self.bands, BollingerOutput::Squeeze)),
        ]
    }

    fn classify(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator> {
        for key in [&self.ema_short_key, &self.ema_long_key, &self.squeeze_key] {
            indicators.require(key, bar_index)?;
        }
        let upper = indicators.require(&self.upper_key, bar_index)?;
        let lower = indicators.require(&self.lower_key, bar_index)?;
        let close = bars[bar_index].close;

        let state = if close > upper {
            SignalState::Bullish
        } else if close < lower {
            SignalState::Bearish
        } else {
            SignalState::Neutral
        };
        Ok(Reading::State(state))
    }

    fn confirm(
        &self,
        direction: Direction,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator> {
        let bar = &bars[bar_index];
        let fast = indicators.require(&self.ema_short_key, bar_index)?;
        let slow = indicators.require(&self.ema_long_key, bar_index)?;
        let squeeze = indicators.require(&self.squeeze_key, bar_index)? > 0.5;

        let aligned = squeeze
            && match direction {
                Direction::Long => fast > slow && bar.close > bar.open,
                Direction::Short => fast < slow && bar.close < bar.open,
            };
        Ok(if aligned {
            Confirmation::Accepted {
                trigger_value: None,
            }
        } else {
            Confirmation::Rejected
        })
    }
}
