//! Outcome resolution against the close of the signal's window.
//!
//! The resolution price is the close of the last bar sharing the signal's
//! window key. The whole series is preloaded, so this is a bounded lookup into
//! data already in memory, never a live value.

use thiserror::Error;

use crate::domain::{label_outcome, Bar, TradeRecord, WindowIndex};

use super::entry::PendingTrade;

/// No bar is available to resolve a signal's window.
///
/// Recovered locally: the signal is discarded and the lock is not engaged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no resolution bar for signal at bar {signal_bar} (window {window_key})")]
pub struct UnresolvableWindow {
    pub signal_bar: usize,
    pub window_key: chrono::NaiveDateTime,
}

pub struct OutcomeResolver<'a> {
    bars: &'a [Bar],
    windows: &'a WindowIndex,
}

impl<'a> OutcomeResolver<'a> {
    pub fn new(bars: &'a [Bar], windows: &'a WindowIndex) -> Self {
        Self { bars, windows }
    }

    /// Resolve a pending trade into an immutable `TradeRecord`.
    ///
    /// A signal on the last bar of an open window (the tail of the series,
    /// with no later data at all) has nothing to resolve against.
    pub fn resolve(
        &self,
        pending: &PendingTrade,
        strategy: &str,
    ) -> Result<TradeRecord, UnresolvableWindow> {
        let unresolvable = || UnresolvableWindow {
            signal_bar: pending.signal_bar,
            window_key: pending.window_key,
        };

        let slot = self
            .windows
            .slot_for_bar(pending.signal_bar)
            .filter(|slot| slot.key == pending.window_key)
            .ok_or_else(unresolvable)?;
        if slot.last_bar == pending.signal_bar && !slot.closed {
            return Err(unresolvable());
        }

        let resolution = self.bars.get(slot.last_bar).ok_or_else(unresolvable)?;
        if resolution.close.is_nan() {
            return Err(unresolvable());
        }

        Ok(TradeRecord {
            strategy: strategy.to_string(),
            signal_bar: pending.signal_bar,
            signal_time: pending.signal_time,
            signal_window_key: pending.window_key,
            direction: pending.direction,
            signal_reference_price: pending.reference_price,
            strike: pending.strike,
            resolution_bar: slot.last_bar,
            resolution_time: resolution.timestamp,
            resolution_price: resolution.close,
            outcome: label_outcome(pending.direction, pending.strike, resolution.close),
            trigger_value: pending.trigger_value,
        })
    }
}
