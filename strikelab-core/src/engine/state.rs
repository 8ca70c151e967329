//! Run settings, per-run mutable state, and run result types.

use serde::{Deserialize, Serialize};

use crate::components::lock::TradeLock;
use crate::components::state::StateTracker;
use crate::domain::{LockGranularity, TradeRecord};

/// Settings fixed for the duration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Distance between the signal close and the strike.
    pub strike_offset: f64,
    /// Lock window size; also the resolution window.
    pub granularity: LockGranularity,
    /// When false, every qualifying signal trades and the lock never engages.
    pub lock_enabled: bool,
}

impl BacktestSettings {
    pub fn new(strike_offset: f64) -> Self {
        Self {
            strike_offset,
            granularity: LockGranularity::hourly(),
            lock_enabled: true,
        }
    }

    pub fn with_granularity(mut self, granularity: LockGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn without_lock(mut self) -> Self {
        self.lock_enabled = false;
        self
    }
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self::new(250.0)
    }
}

/// The only mutable state of a run. Owned by the driver, never shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverState {
    pub tracker: StateTracker,
    pub lock: TradeLock,
}

impl DriverState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Counters describing why bars and signals did not become trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub bars: usize,
    pub warmup_skipped: usize,
    pub missing_skipped: usize,
    pub transitions: usize,
    /// Transitions that completed while the lock was held (dropped, not deferred).
    pub lock_suppressed: usize,
    pub filter_rejected: usize,
    pub unresolvable: usize,
}

/// Whether a run produced any trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NoSignals,
    Traded(usize),
}

/// Result of a complete backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Trade records in signal order.
    pub trades: Vec<TradeRecord>,
    pub diagnostics: RunDiagnostics,
}

impl RunResult {
    pub fn status(&self) -> RunStatus {
        if self.trades.is_empty() {
            RunStatus::NoSignals
        } else {
            RunStatus::Traded(self.trades.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let s = BacktestSettings::default();
        assert_eq!(s.strike_offset, 250.0);
        assert_eq!(s.granularity.as_minutes(), 60);
        assert!(s.lock_enabled);
        assert!(!s.clone().without_lock().lock_enabled);
    }

    #[test]
    fn empty_result_reports_no_signals() {
        assert_eq!(RunResult::default().status(), RunStatus::NoSignals);
    }
}
