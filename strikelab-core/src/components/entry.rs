//! Signal evaluation: entry filters and the pending-trade descriptor.
//!
//! An entry filter does two things per bar:
//! - `classify`: reduce its indicators to a `Reading` that feeds the state tracker
//! - `confirm`: decide whether a transition in a given direction is tradable
//!   (oscillator extremity, trend alignment, squeeze, ...)
//!
//! Filters never see the lock or the tracker. The driver owns both and only
//! calls `confirm` on an unlocked bar that completed a transition.

pub mod ema_rsi_pullback;
pub mod rsi_extreme;
pub mod squeeze_breakout;
pub mod stochastic_crossover;
pub mod supertrend_flip;

pub use ema_rsi_pullback::EmaRsiPullback;
pub use rsi_extreme::RsiExtreme;
pub use squeeze_breakout::SqueezeBreakout;
pub use stochastic_crossover::StochasticCrossover;
pub use supertrend_flip::SupertrendFlip;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Direction, WindowIndex};

use super::indicator::{Indicator, IndicatorValues, MissingIndicator};
use super::state::{Reading, SignalState, Transition};

/// Verdict of a filter on a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    Accepted {
        /// Oscillator reading that qualified the entry, when there is one.
        trigger_value: Option<f64>,
    },
    Rejected,
}

impl Confirmation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Strategy-specific entry rule.
///
/// # Look-ahead
/// `classify` and `confirm` may only read `bars[..=bar_index]` and indicator
/// values at or before `bar_index`.
pub trait EntryFilter: Send + Sync {
    /// Strategy name (e.g., "stochastic_crossover").
    fn name(&self) -> &str;

    /// Bars skipped outright at the start of the series.
    fn warmup_bars(&self) -> usize;

    /// Indicators this filter reads. Keys already present in the
    /// `IndicatorValues` (precomputed columns) are not recomputed.
    fn indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Discrete state at `bar_index`, or the first missing input.
    fn classify(
        &self,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Reading, MissingIndicator>;

    /// Extremity/alignment check for an entry in `direction` at `bar_index`.
    fn confirm(
        &self,
        direction: Direction,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
    ) -> Result<Confirmation, MissingIndicator>;

    /// Direction implied by a transition. Entering `Bullish` goes long,
    /// entering `Bearish` goes short; entering `Neutral` is not an entry.
    fn entry_direction(&self, transition: Transition) -> Option<Direction> {
        match transition.to {
            SignalState::Bullish => Some(Direction::Long),
            SignalState::Bearish => Some(Direction::Short),
            SignalState::Neutral => None,
        }
    }
}

/// A qualified signal awaiting resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTrade {
    pub signal_bar: usize,
    pub signal_time: NaiveDateTime,
    pub window_key: NaiveDateTime,
    pub direction: Direction,
    pub reference_price: f64,
    pub strike: f64,
    pub trigger_value: Option<f64>,
}

/// Turns a filter's verdict on a transition into a `PendingTrade`.
pub struct SignalEvaluator<'a> {
    filter: &'a dyn EntryFilter,
    strike_offset: f64,
}

impl<'a> SignalEvaluator<'a> {
    pub fn new(filter: &'a dyn EntryFilter, strike_offset: f64) -> Self {
        Self {
            filter,
            strike_offset,
        }
    }

    pub fn strike_offset(&self) -> f64 {
        self.strike_offset
    }

    /// Evaluate a transition completed at `bar_index`.
    ///
    /// `Ok(None)` means the transition does not qualify (no entry direction, or
    /// the filter rejected it).
    pub fn evaluate(
        &self,
        transition: Transition,
        bars: &[Bar],
        bar_index: usize,
        indicators: &IndicatorValues,
        windows: &WindowIndex,
    ) -> Result<Option<PendingTrade>, MissingIndicator> {
        let Some(direction) = self.filter.entry_direction(transition) else {
            return Ok(None);
        };
        let trigger_value = match self
            .filter
            .confirm(direction, bars, bar_index, indicators)?
        {
            Confirmation::Accepted { trigger_value } => trigger_value,
            Confirmation::Rejected => return Ok(None),
        };

        let bar = &bars[bar_index];
        let window_key = match windows.slot_for_bar(bar_index) {
            Some(slot) => slot.key,
            None => windows.granularity().window_key(bar.timestamp),
        };
        Ok(Some(PendingTrade {
            signal_bar: bar_index,
            signal_time: bar.timestamp,
            window_key,
            direction,
            reference_price: bar.close,
            strike: direction.strike(bar.close, self.strike_offset),
            trigger_value,
        }))
    }
}
