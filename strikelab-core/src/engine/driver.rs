//! Backtest driver: one forward pass over the bar series.
//!
//! Per bar, in fixed order:
//! 1. Warm-up and missing-indicator skip (the tracker is not touched)
//! 2. Classify and feed the state tracker
//! 3. Unlock check
//! 4. Locked skip (a transition here is dropped, not deferred)
//! 5. Filter confirmation and strike computation
//! 6. Outcome resolution; on success record the trade and engage the lock
//!
//! A bar that releases the lock is evaluated in the same step, so it can open
//! the next trade. A lock still held at the end of the series is abandoned.

use tracing::{debug, trace};

use crate::components::entry::{EntryFilter, SignalEvaluator};
use crate::components::indicator::IndicatorValues;
use crate::components::outcome::OutcomeResolver;
use crate::domain::{Bar, WindowIndex};

use super::precompute::compute_warmup;
use super::state::{BacktestSettings, DriverState, RunDiagnostics, RunResult};

/// Run one strategy over a preloaded, ascending bar series.
///
/// `indicators` must already hold every series the filter reads
/// (see `precompute_indicators`). Never fails: undefined values, locked
/// bars and unresolvable windows are all recovered locally and counted in
/// the diagnostics.
pub fn run_backtest(
    bars: &[Bar],
    indicators: &IndicatorValues,
    filter: &dyn EntryFilter,
    settings: &BacktestSettings,
) -> RunResult {
    let windows = WindowIndex::build(bars, settings.granularity);
    let evaluator = SignalEvaluator::new(filter, settings.strike_offset);
    let resolver = OutcomeResolver::new(bars, &windows);
    let warmup = filter
        .warmup_bars()
        .max(compute_warmup(&filter.indicators()));

    let mut state = DriverState::new();
    let mut diagnostics = RunDiagnostics {
        bars: bars.len(),
        ..Default::default()
    };
    let mut trades = Vec::new();

    for (i, bar) in bars.iter().enumerate() {
        if i < warmup {
            diagnostics.warmup_skipped += 1;
            continue;
        }
        if bar.is_void() {
            diagnostics.missing_skipped += 1;
            continue;
        }

        let reading = match filter.classify(bars, i, indicators) {
            Ok(reading) => reading,
            Err(missing) => {
                trace!(%missing, "bar skipped");
                diagnostics.missing_skipped += 1;
                continue;
            }
        };
        let transition = state.tracker.observe(reading);
        if transition.is_some() {
            diagnostics.transitions += 1;
        }

        if settings.lock_enabled && state.lock.should_unlock(bar.timestamp) {
            trace!(bar = i, time = %bar.timestamp, "lock released");
            state.lock.release();
        }
        if state.lock.is_locked() {
            if let Some(t) = transition {
                trace!(bar = i, from = ?t.from, to = ?t.to, "transition dropped while locked");
                diagnostics.lock_suppressed += 1;
            }
            continue;
        }

        let Some(transition) = transition else {
            continue;
        };
        let pending = match evaluator.evaluate(transition, bars, i, indicators, &windows) {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                diagnostics.filter_rejected += 1;
                continue;
            }
            Err(missing) => {
                trace!(%missing, "confirmation input undefined");
                diagnostics.filter_rejected += 1;
                continue;
            }
        };

        match resolver.resolve(&pending, filter.name()) {
            Ok(record) => {
                debug!(
                    strategy = filter.name(),
                    time = %record.signal_time,
                    direction = record.direction.as_str(),
                    strike = record.strike,
                    outcome = record.outcome.as_str(),
                    "trade"
                );
                if settings.lock_enabled {
                    state
                        .lock
                        .engage(settings.granularity.window_end(pending.window_key));
                }
                trades.push(record);
            }
            Err(unresolvable) => {
                trace!(%unresolvable, "signal discarded");
                diagnostics.unresolvable += 1;
            }
        }
    }

    if let Some(at) = state.lock.unlock_at() {
        debug!(unlock_at = %at, "series ended while locked");
    }

    RunResult {
        trades,
        diagnostics,
    }
}
