//! State tracking: qualitative signal state and transition detection.
//!
//! Entry filters reduce their indicators to a discrete `SignalState` per bar
//! (%K over %D, trend up, close above the upper band, ...). The tracker keeps
//! the previous state and reports a `Transition` on the exact bar where it
//! strictly changes.
//!
//! Tie rule: a bar whose compared values are equal carries the previous state
//! forward. It never introduces a new state and never reports a transition;
//! before any state has been established, a tie leaves the state undefined.

use serde::{Deserialize, Serialize};

/// Qualitative position of an oscillator or trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Bullish,
    Bearish,
    /// Between thresholds/bands, for filters that have a middle zone.
    Neutral,
}

/// What a filter read off the indicators at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    State(SignalState),
    /// Compared values were equal: keep whatever state was in force.
    Tie,
}

impl Reading {
    /// Order-based reading: `a > b` → bullish, `a < b` → bearish, equal → tie.
    pub fn compare(a: f64, b: f64) -> Self {
        if a > b {
            Reading::State(SignalState::Bullish)
        } else if a < b {
            Reading::State(SignalState::Bearish)
        } else {
            Reading::Tie
        }
    }
}

/// A strict change between two defined, distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: SignalState,
    pub to: SignalState,
}

/// Resolve a reading against the previous state (tie → carry forward).
pub fn classify(prev: Option<SignalState>, reading: Reading) -> Option<SignalState> {
    match reading {
        Reading::State(s) => Some(s),
        Reading::Tie => prev,
    }
}

/// Report a transition only between two defined, distinct states.
pub fn detect_transition(
    prev: Option<SignalState>,
    curr: Option<SignalState>,
) -> Option<Transition> {
    match (prev, curr) {
        (Some(from), Some(to)) if from != to => Some(Transition { from, to }),
        _ => None,
    }
}

/// Previous-state cell, owned by the driver for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateTracker {
    prev: Option<SignalState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SignalState> {
        self.prev
    }

    /// Fold one bar's reading into the tracker, returning the transition it
    /// completes, if any.
    pub fn observe(&mut self, reading: Reading) -> Option<Transition> {
        let curr = classify(self.prev, reading);
        let transition = detect_transition(self.prev, curr);
        self.prev = curr;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalState::*;

    #[test]
    fn first_defined_bar_never_transitions() {
        let mut t = StateTracker::new();
        assert_eq!(t.observe(Reading::State(Bullish)), None);
        assert_eq!(t.current(), Some(Bullish));
    }

    #[test]
    fn strict_change_reports_transition() {
        let mut t = StateTracker::new();
        t.observe(Reading::State(Bearish));
        assert_eq!(
            t.observe(Reading::State(Bullish)),
            Some(Transition {
                from: Bearish,
                to: Bullish
            })
        );
        // Same state again: no transition.
        assert_eq!(t.observe(Reading::State(Bullish)), None);
    }

    #[test]
    fn tie_carries_previous_state() {
        let mut t = StateTracker::new();
        t.observe(Reading::State(Bearish));
        assert_eq!(t.observe(Reading::Tie), None);
        assert_eq!(t.current(), Some(Bearish));
        // The later crossing is measured against the carried state.
        assert!(t.observe(Reading::State(Bullish)).is_some());
    }

    #[test]
    fn tie_before_any_state_stays_undefined() {
        let mut t = StateTracker::new();
        assert_eq!(t.observe(Reading::Tie), None);
        assert_eq!(t.current(), None);
        assert_eq!(t.observe(Reading::State(Bullish)), None);
    }

    #[test]
    fn compare_maps_order_to_state() {
        assert_eq!(Reading::compare(2.0, 1.0), Reading::State(Bullish));
        assert_eq!(Reading::compare(1.0, 2.0), Reading::State(Bearish));
        assert_eq!(Reading::compare(1.5, 1.5), Reading::Tie);
    }

    #[test]
    fn detect_transition_contract() {
        assert_eq!(detect_transition(None, Some(Bullish)), None);
        assert_eq!(detect_transition(Some(Bullish), None), None);
        assert_eq!(detect_transition(Some(Neutral), Some(Neutral)), None);
        assert_eq!(
            detect_transition(Some(Neutral), Some(Bearish)),
            Some(Transition {
                from: Neutral,
                to: Bearish
            })
        );
    }
}
