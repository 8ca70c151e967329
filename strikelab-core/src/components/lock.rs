//! Trade lock: at most one open bet per lock window.
//!
//! Once a trade is opened the lock holds until the end of the signal's
//! window. Signals that qualify while locked are dropped, not deferred.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeLock {
    active: bool,
    unlock_at: Option<NaiveDateTime>,
}

impl TradeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.active
    }

    pub fn unlock_at(&self) -> Option<NaiveDateTime> {
        self.unlock_at
    }

    /// True once `now` has reached the boundary of an active lock.
    pub fn should_unlock(&self, now: NaiveDateTime) -> bool {
        match (self.active, self.unlock_at) {
            (true, Some(at)) => now >= at,
            _ => false,
        }
    }

    pub fn release(&mut self) {
        self.active = false;
        self.unlock_at = None;
    }

    /// Lock until `window_end`.
    ///
    /// `window_end` must be strictly after the signal time that caused it.
    pub fn engage(&mut self, window_end: NaiveDateTime) {
        self.active = true;
        self.unlock_at = Some(window_end);
    }
}
