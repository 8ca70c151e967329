//! EMA trend + RSI pullback rebound.
//!
//! State: RSI above the midline is bullish, below is bearish, on it carries.
//! - Long: RSI crosses up through the midline, close > EMA, and the RSI on the
//!   last bearish bar was below `pullback_low`
//! - Short: RSI crosses down through the midline, close < EMA, and the RSI on
//!   the last bullish bar was above `pullback_high`
//!
//! Bars sitting exactly on the midline, or skipped as undefined, are passed
//! over when looking back for the pullback depth.

use crate::components::indicator::{Indicator, IndicatorValues, MissingIndicator};
use crate::components::state::Reading;
use crate::domain::{Bar, Direction};
use crate::indicators::{Ema, Rsi};

use super::{Confirmation, EntryFilter};

#[derive(Debug, Clone)]
pub struct EmaRsiPullback {
    pub ema_span: usize,
    pub rsi_window: usize,
    pub midline: f64,
    pub pullback_low: f64,
    pub pullback_high: f64,
    ema_key: String,
    rsi_key: String,
}

impl EmaRsiPullback {
    pub fn new(
        ema_span: usize,
        rsi_window: usize,
        midline: f64,
        pullback_low: f64,
        pullback_high: f64,
    ) -> Self {
        assert!(
            pullback_low <= midline && midline <= pullback_high,
            "pullback thresholds must bracket the midline"
        );
        Self {
            ema_span,
            rsi_window,
            midline,
            pullback_low,
            pullback_high,
            ema_key: Ema::key(ema_span),
            rsi_key: Rsi::key(rsi_window),
        }
    }

    pub fn default_params() -> Self {
        Self::new(50, 14, 50.0, 45.0, 55.0)
    }

    /// RSI on the last bar before `bar_index` that held a bullish or bearish
    /// state, if any.
    fn depth_reference(&self, bar_index: usize, indicators: &IndicatorValues) -> Option<f64> {
        (0..bar_index).rev().find_map(|j| {
            indicators.require(&self.ema_key, j).ok()?;
            let rsi = indicators.require(&self.rsi_key, j).ok()?;
            (rsi != self.midline).then_some(rsi)
        })
    }
}

impl EntryFilter for EmaRsiPullback {
    fn name(&self) -> &str {
        "ema_rsi_pullback"
    }

    fn warmup_bars(&self) -> usize {
        0
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.ema_span)),
            Box::new(Rsi::new(self.rsi_window)),
        ]
    }

    fn classify(
        &self,
        _bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator> {
        // The EMA is only used by `confirm`, but a bar without it is not
        // evaluable at all.
        indicators.require(&self.ema_key, bar_index)?;
        let rsi = indicators.require(&self.rsi_key, bar_index)?;
        Ok(Reading::compare(rsi, self.midline))
    }

    fn confirm(
        &self,
        direction: Direction,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator> {
        let close = bars[bar_index].close;
        let ema = indicators.require(&self.ema_key, bar_index)?;
        let rsi_now = indicators.require(&self.rsi_key, bar_index)?;
        let Some(rsi_prev) = self.depth_reference(bar_index, indicators) else {
            return Ok(Confirmation::Rejected);
        };

        let aligned = match direction {
            Direction::Long => close > ema && rsi_prev < self.pullback_low,
            Direction::Short => close < ema && rsi_prev > self.pullback_high,
        };
        Ok(if aligned {
            Confirmation::Accepted {
                trigger_value: Some(rsi_now),
            }
        } else {
            Confirmation::Rejected
        })
    }
}
