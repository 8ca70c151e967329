//! Engine components.
//!
//! - Indicator trait and the precomputed value container
//! - State tracker: discrete signal state and transition detection
//! - Trade lock: one open bet per lock window
//! - Signal evaluation: entry filters and pending trades
//! - Outcome resolution against the window's last close

pub mod entry;
pub mod factory;
pub mod indicator;
pub mod lock;
pub mod outcome;
pub mod state;

pub use entry::{Confirmation, EntryFilter, PendingTrade, SignalEvaluator};
pub use factory::{create_filter, EntryFilterConfig, FactoryError};
pub use indicator::{Indicator, IndicatorValues, MissingIndicator};
pub use lock::TradeLock;
pub use outcome::{OutcomeResolver, UnresolvableWindow};
pub use state::{detect_transition, Reading, SignalState, StateTracker, Transition};
