//! Domain types for StrikeLab

pub mod bar;
pub mod ids;
pub mod trade;
pub mod window;

pub use bar::Bar;
pub use ids::{ConfigHash, DatasetHash};
pub use trade::{label_outcome, Direction, Outcome, TradeRecord};
pub use window::{LockGranularity, WindowIndex, WindowSlot};
