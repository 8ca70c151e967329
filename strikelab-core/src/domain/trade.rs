//! Trade records: one settled fixed-strike bet per qualifying signal.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Side of the bet.
///
/// A long bet wins when the window settles at or above the strike; a short
/// bet wins when it settles at or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    /// Strike for a bet placed at `reference_price`: below it for longs,
    /// above it for shorts.
    pub fn strike(&self, reference_price: f64, offset: f64) -> f64 {
        match self {
            Direction::Long => reference_price - offset,
            Direction::Short => reference_price + offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Label a bet by comparing the settlement price to the strike.
///
/// Settling exactly at the strike is a win in both directions.
pub fn label_outcome(direction: Direction, strike: f64, resolution_price: f64) -> Outcome {
    let lost = match direction {
        Direction::Long => resolution_price < strike,
        Direction::Short => resolution_price > strike,
    };
    if lost {
        Outcome::Loss
    } else {
        Outcome::Win
    }
}

/// A settled trade. Created once by the outcome resolver, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Name of the entry filter that produced the signal.
    pub strategy: String,
    pub signal_bar: usize,
    pub signal_time: NaiveDateTime,
    pub signal_window_key: NaiveDateTime,
    pub direction: Direction,
    /// Close of the signal bar.
    pub signal_reference_price: f64,
    pub strike: f64,
    pub resolution_bar: usize,
    pub resolution_time: NaiveDateTime,
    /// Close of the last bar sharing `signal_window_key`.
    pub resolution_price: f64,
    pub outcome: Outcome,
    /// Oscillator reading that qualified the entry (%K, RSI, ...), if any.
    #[serde(default)]
    pub trigger_value: Option<f64>,
}
