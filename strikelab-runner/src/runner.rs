//! Backtest runner: wires together config, data, the driver, and metrics.
//!
//! Three entry points:
//! - `run_single_backtest()`: loads data per the config, then runs. Used by CLI `run`.
//! - `run_backtest_from_data()`: takes pre-loaded data. No I/O.
//! - `run_strategies_parallel()`: many strategies over one series. Used by CLI `sweep`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use strikelab_core::components::factory::{create_filter, FactoryError};
use strikelab_core::domain::{ConfigHash, DatasetHash, TradeRecord};
use strikelab_core::engine::{precompute_indicators, run_backtest, RunDiagnostics, RunStatus};
use strikelab_core::fingerprint::StrategyConfig;

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError, LoadedData};
use crate::metrics::OutcomeSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: StrategyConfig,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
    pub bar_count: usize,
    pub summary: OutcomeSummary,
    pub diagnostics: RunDiagnostics,
    pub status: RunStatus,
    pub trades: Vec<TradeRecord>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest from a `BacktestConfig`, loading its data first.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let strategy = config.to_strategy_config()?;
    let data = load_bars(&config.data)?;
    run_backtest_from_data(&strategy, &data)
}

/// Run one strategy over pre-loaded data.
///
/// Only indicators absent from the loaded columns are computed.
pub fn run_backtest_from_data(
    strategy: &StrategyConfig,
    data: &LoadedData,
) -> Result<BacktestResult, RunError> {
    let config_hash = strategy.config_hash()?;
    let filter = create_filter(&strategy.filter)?;
    let indicators = precompute_indicators(&data.bars, filter.as_ref(), data.columns.clone());
    let run = run_backtest(&data.bars, &indicators, filter.as_ref(), &strategy.settings);

    let d = &run.diagnostics;
    if d.bars > 0 && d.transitions == 0 && d.missing_skipped + d.warmup_skipped == d.bars {
        warn!(
            strategy = %strategy.name,
            "no bar had every input defined; check precomputed columns"
        );
    }

    let summary = OutcomeSummary::compute(&run.trades);
    info!(
        strategy = %strategy.name,
        config = config_hash.short(),
        trades = summary.total,
        wins = summary.wins,
        "run complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        config: strategy.clone(),
        config_hash,
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.has_synthetic,
        bar_count: data.bars.len(),
        summary,
        diagnostics: run.diagnostics,
        status: run.status(),
        trades: run.trades,
    })
}

/// Run independent strategies over the same data in parallel.
///
/// Each strategy gets its own driver state. Results follow input order.
pub fn run_strategies_parallel(
    strategies: &[StrategyConfig],
    data: &LoadedData,
) -> Vec<Result<BacktestResult, RunError>> {
    strategies
        .par_iter()
        .map(|strategy| run_backtest_from_data(strategy, data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{presets, DataSection};
    use crate::data_loader::generate_synthetic;

    #[test]
    fn result_carries_fingerprints_and_status() {
        let data = generate_synthetic(2_000, 1);
        let strategy = presets().remove(0);
        let result = run_backtest_from_data(&strategy, &data).unwrap();
        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.config_hash, strategy.config_hash().unwrap());
        assert_eq!(result.dataset_hash, data.dataset_hash);
        assert!(result.has_synthetic);
        assert_eq!(result.bar_count, 2_000);
        assert_eq!(result.summary.total, result.trades.len());
        match result.status {
            RunStatus::NoSignals => assert!(result.trades.is_empty()),
            RunStatus::Traded(n) => assert_eq!(n, result.trades.len()),
        }
    }

    #[test]
    fn parallel_matches_sequential_in_order() {
        let data = generate_synthetic(3_000, 2);
        let strategies = presets();
        let parallel = run_strategies_parallel(&strategies, &data);
        assert_eq!(parallel.len(), strategies.len());
        for (strategy, result) in strategies.iter().zip(parallel) {
            let result = result.unwrap();
            let sequential = run_backtest_from_data(strategy, &data).unwrap();
            assert_eq!(result.config.name, strategy.name);
            assert_eq!(result, sequential);
        }
    }

    #[test]
    fn column_presets_without_columns_yield_no_signals() {
        let data = generate_synthetic(500, 3);
        let strategy = crate::config::find_preset("rsi_extreme_columns").unwrap();
        let result = run_backtest_from_data(&strategy, &data).unwrap();
        assert_eq!(result.status, RunStatus::NoSignals);
        assert_eq!(result.diagnostics.missing_skipped, 500);
    }

    #[test]
    fn single_backtest_from_synthetic_config() {
        let mut config = BacktestConfig::from_preset(presets().remove(1), None);
        config.data = DataSection {
            synthetic: true,
            ..Default::default()
        };
        let result = run_single_backtest(&config).unwrap();
        assert!(result.has_synthetic);
        assert_eq!(result.config.name, "supertrend_flip");
    }

    #[test]
    fn missing_data_path_is_a_data_error() {
        let config = BacktestConfig::from_preset(presets().remove(0), None);
        assert!(matches!(
            run_single_backtest(&config),
            Err(RunError::Data(LoadError::NoSource))
        ));
    }
}
