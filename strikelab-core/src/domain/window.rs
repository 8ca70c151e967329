//! Lock windows: fixed time buckets that gate re-entry and settle trades.
//!
//! A window is identified by its key: the bar timestamp floored to the lock
//! granularity (epoch-aligned, so a 60-minute granularity yields the start of
//! the containing hour). The window ends exactly one granularity later,
//! regardless of how bars are spaced inside it.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Width of a lock window, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LockGranularity(u32);

impl TryFrom<u32> for LockGranularity {
    type Error = &'static str;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if minutes == 0 {
            Err("lock granularity must be >= 1 minute")
        } else {
            Ok(Self(minutes))
        }
    }
}

impl From<LockGranularity> for u32 {
    fn from(g: LockGranularity) -> Self {
        g.0
    }
}

impl LockGranularity {
    pub fn minutes(minutes: u32) -> Self {
        assert!(minutes >= 1, "lock granularity must be >= 1 minute");
        Self(minutes)
    }

    pub fn hourly() -> Self {
        Self(60)
    }

    pub fn as_minutes(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }

    /// Floor a timestamp to the start of its containing window.
    pub fn window_key(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let step = i64::from(self.0) * 60;
        let secs = ts.and_utc().timestamp();
        let offset = secs.rem_euclid(step);
        ts - Duration::seconds(offset) - Duration::nanoseconds(i64::from(ts.nanosecond()))
    }

    /// First instant after the window identified by `key`.
    pub fn window_end(&self, key: NaiveDateTime) -> NaiveDateTime {
        key + self.duration()
    }
}

impl Default for LockGranularity {
    fn default() -> Self {
        Self::hourly()
    }
}

/// One contiguous run of bars sharing a window key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSlot {
    pub key: NaiveDateTime,
    /// Index of the first bar in this window (inclusive).
    pub first_bar: usize,
    /// Index of the last bar in this window (inclusive).
    pub last_bar: usize,
    /// True when the series holds a bar at or after the window end, i.e. the
    /// window's final bar is known rather than merely the latest one seen.
    pub closed: bool,
}

/// Precomputed bar → window mapping, built once before the walk.
#[derive(Debug, Clone, Default)]
pub struct WindowIndex {
    granularity: LockGranularity,
    slots: Vec<WindowSlot>,
    bar_slot: Vec<usize>,
}

impl WindowIndex {
    /// Group sorted bars into windows.
    ///
    /// Bars must be sorted ascending by timestamp; equal keys are expected to
    /// be contiguous.
    pub fn build(bars: &[Bar], granularity: LockGranularity) -> Self {
        let mut slots: Vec<WindowSlot> = Vec::new();
        let mut bar_slot = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            let key = granularity.window_key(bar.timestamp);
            match slots.last_mut() {
                Some(slot) if slot.key == key => slot.last_bar = i,
                _ => slots.push(WindowSlot {
                    key,
                    first_bar: i,
                    last_bar: i,
                    closed: false,
                }),
            }
            bar_slot.push(slots.len() - 1);
        }

        // Every window except the last has a successor bar past its end.
        let n_slots = slots.len();
        for slot in slots.iter_mut().take(n_slots.saturating_sub(1)) {
            slot.closed = true;
        }

        Self {
            granularity,
            slots,
            bar_slot,
        }
    }

    pub fn granularity(&self) -> LockGranularity {
        self.granularity
    }

    /// Window containing the bar at `bar_index`.
    pub fn slot_for_bar(&self, bar_index: usize) -> Option<&WindowSlot> {
        self.bar_slot
            .get(bar_index)
            .and_then(|&s| self.slots.get(s))
    }

    pub fn slots(&self) -> &[WindowSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
