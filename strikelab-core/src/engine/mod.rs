//! Backtest engine: indicator precomputation and the single-pass driver.
//!
//! The driver consumes a preloaded bar series plus precomputed indicator
//! values and walks the bars once, threading a `DriverState` (state tracker
//! and trade lock) through the loop.

pub mod driver;
pub mod precompute;
pub mod state;

pub use driver::run_backtest;
pub use precompute::{compute_warmup, precompute_indicators};
pub use state::{BacktestSettings, DriverState, RunDiagnostics, RunResult, RunStatus};
