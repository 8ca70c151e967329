//! Outcome metrics: pure functions over a trade list.
//!
//! No dependencies on the runner, data loading, or the driver.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strikelab_core::domain::{Direction, TradeRecord};

/// Win/loss counts for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionTally {
    pub wins: usize,
    pub losses: usize,
}

impl DirectionTally {
    pub fn total(&self) -> usize {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> Option<f64> {
        ratio(self.wins, self.total())
    }
}

/// Aggregate outcome statistics for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// `None` when there are no trades.
    pub win_rate: Option<f64>,
    pub long: DirectionTally,
    pub short: DirectionTally,
    /// Distinct lock windows that produced at least one trade.
    pub distinct_windows: usize,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl OutcomeSummary {
    pub fn compute(trades: &[TradeRecord]) -> Self {
        let mut long = DirectionTally::default();
        let mut short = DirectionTally::default();
        for trade in trades {
            let tally = match trade.direction {
                Direction::Long => &mut long,
                Direction::Short => &mut short,
            };
            if trade.outcome.is_win() {
                tally.wins += 1;
            } else {
                tally.losses += 1;
            }
        }
        let wins = long.wins + short.wins;
        Self {
            total: trades.len(),
            wins,
            losses: trades.len() - wins,
            win_rate: win_rate(trades),
            long,
            short,
            distinct_windows: distinct_windows(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

// ─── Individual metric functions ────────────────────────────────────

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Fraction of trades won, or `None` for an empty list.
pub fn win_rate(trades: &[TradeRecord]) -> Option<f64> {
    let wins = trades.iter().filter(|t| t.outcome.is_win()).count();
    ratio(wins, trades.len())
}

pub fn distinct_windows(trades: &[TradeRecord]) -> usize {
    trades
        .iter()
        .map(|t| t.signal_window_key)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Maximum consecutive winning trades.
pub fn max_consecutive_wins(trades: &[TradeRecord]) -> usize {
    max_consecutive(trades, true)
}

/// Maximum consecutive losing trades.
pub fn max_consecutive_losses(trades: &[TradeRecord]) -> usize {
    max_consecutive(trades, false)
}

fn max_consecutive(trades: &[TradeRecord], wins: bool) -> usize {
    let mut best = 0;
    let mut run = 0;
    for trade in trades {
        if trade.outcome.is_win() == wins {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}
