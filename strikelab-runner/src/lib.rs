//! StrikeLab Runner: config, data loading, orchestration, metrics and export.
//!
//! This crate builds on `strikelab-core` to provide:
//! - TOML run configs and named presets
//! - CSV bar loading with precomputed columns, plus a synthetic fallback
//! - Single and parallel multi-strategy runs
//! - Outcome metrics (win rate, per-direction tallies, streaks)
//! - JSON/CSV/Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{find_preset, preset_names, presets, BacktestConfig, ConfigError};
pub use data_loader::{generate_synthetic, load_bars, load_csv, LoadError, LoadedData};
pub use export::{
    export_json, export_trades_csv, generate_comparison, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use metrics::{DirectionTally, OutcomeSummary};
pub use runner::{
    run_backtest_from_data, run_single_backtest, run_strategies_parallel, BacktestResult,
    RunError, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn loaded_data_is_shared_across_workers() {
        assert_send::<LoadedData>();
        assert_sync::<LoadedData>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
    }
}
