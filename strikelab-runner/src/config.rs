//! TOML run configuration and named presets.
//!
//! ```toml
//! [data]
//! path = "data/BTC5min.csv"
//! time_column = "time"
//!
//! [backtest]
//! strike_offset = 250.0
//! lock_minutes = 60
//! lock_enabled = true
//!
//! [strategy]
//! type = "stochastic_crossover"
//! oversold = 20.0
//! ```
//!
//! Every section except `[strategy]` is optional. A missing `strike_offset`
//! falls back to the strategy's default offset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use strikelab_core::components::factory::{
    EntryFilterConfig, FactoryError, RsiExtremeParams, StochasticCrossoverParams,
};
use strikelab_core::domain::LockGranularity;
use strikelab_core::engine::BacktestSettings;
use strikelab_core::fingerprint::StrategyConfig;

/// Errors from reading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid strategy: {0}")]
    Strategy(#[from] FactoryError),
}

/// A complete run configuration as read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Display name; defaults to the strategy type.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub backtest: BacktestSection,
    pub strategy: EntryFilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// CSV file with a time column and OHLC columns.
    pub path: Option<PathBuf>,
    pub time_column: String,
    /// Generate a seeded random walk instead of reading `path`.
    pub synthetic: bool,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            path: None,
            time_column: "time".into(),
            synthetic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub strike_offset: Option<f64>,
    pub lock_minutes: u32,
    pub lock_enabled: bool,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            strike_offset: None,
            lock_minutes: 60,
            lock_enabled: true,
        }
    }
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        if config.name.is_none() {
            config.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned());
        }
        Ok(config)
    }

    /// Parse and validate.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Wrap a preset into a runnable config reading `data_path`.
    pub fn from_preset(preset: StrategyConfig, data_path: Option<PathBuf>) -> Self {
        Self {
            name: Some(preset.name),
            data: DataSection {
                path: data_path,
                ..Default::default()
            },
            backtest: BacktestSection {
                strike_offset: Some(preset.settings.strike_offset),
                lock_minutes: preset.settings.granularity.as_minutes(),
                lock_enabled: preset.settings.lock_enabled,
            },
            strategy: preset.filter,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.lock_minutes == 0 {
            return Err(ConfigError::Invalid(
                "backtest.lock_minutes must be > 0".into(),
            ));
        }
        if let Some(offset) = self.backtest.strike_offset {
            if !offset.is_finite() || offset < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "backtest.strike_offset must be finite and >= 0, got {offset}"
                )));
            }
        }
        if self.data.time_column.trim().is_empty() {
            return Err(ConfigError::Invalid("data.time_column is empty".into()));
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Resolve defaults into the config the engine runs and hashes.
    pub fn to_strategy_config(&self) -> Result<StrategyConfig, ConfigError> {
        self.validate()?;
        let granularity = LockGranularity::try_from(self.backtest.lock_minutes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let offset = self
            .backtest
            .strike_offset
            .unwrap_or_else(|| self.strategy.default_strike_offset());
        let mut settings = BacktestSettings::new(offset).with_granularity(granularity);
        settings.lock_enabled = self.backtest.lock_enabled;

        Ok(StrategyConfig {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| self.strategy.type_name().to_string()),
            filter: self.strategy.clone(),
            settings,
        })
    }
}

// ─── Presets ────────────────────────────────────────────────────────

/// One preset per strategy at default parameters, plus column-reading
/// variants for data files that carry `k`/`d`/`rsi` columns.
pub fn presets() -> Vec<StrategyConfig> {
    let mut all: Vec<StrategyConfig> = EntryFilterConfig::all_defaults()
        .into_iter()
        .map(StrategyConfig::with_defaults)
        .collect();

    let mut stoch_columns = StrategyConfig::with_defaults(
        EntryFilterConfig::StochasticCrossover(StochasticCrossoverParams {
            precomputed: true,
            ..Default::default()
        }),
    );
    stoch_columns.name = "stochastic_crossover_columns".into();
    all.push(stoch_columns);

    let mut rsi_columns =
        StrategyConfig::with_defaults(EntryFilterConfig::RsiExtreme(RsiExtremeParams {
            precomputed: true,
            ..Default::default()
        }));
    rsi_columns.name = "rsi_extreme_columns".into();
    all.push(rsi_columns);

    all
}

pub fn preset_names() -> Vec<String> {
    presets().into_iter().map(|p| p.name).collect()
}

pub fn find_preset(name: &str) -> Option<StrategyConfig> {
    presets().into_iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name = "stoch-tight"

[data]
path = "data/BTC5min.csv"

[backtest]
strike_offset = 150.0
lock_minutes = 30
lock_enabled = false

[strategy]
type = "stochastic_crossover"
oversold = 15.0
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(config.name.as_deref(), Some("stoch-tight"));
        assert_eq!(config.data.time_column, "time");
        assert_eq!(config.backtest.lock_minutes, 30);

        let strategy = config.to_strategy_config().unwrap();
        assert_eq!(strategy.settings.strike_offset, 150.0);
        assert_eq!(strategy.settings.granularity.as_minutes(), 30);
        assert!(!strategy.settings.lock_enabled);
        match strategy.filter {
            EntryFilterConfig::StochasticCrossover(p) => assert_eq!(p.oversold, 15.0),
            other => panic!("unexpected filter: {other:?}"),
        }
    }

    #[test]
    fn minimal_config_uses_strategy_defaults() {
        let config = BacktestConfig::from_toml("[strategy]\ntype = \"supertrend_flip\"\n").unwrap();
        let strategy = config.to_strategy_config().unwrap();
        assert_eq!(strategy.name, "supertrend_flip");
        assert_eq!(strategy.settings.strike_offset, 500.0);
        assert_eq!(strategy.settings.granularity.as_minutes(), 60);
        assert!(strategy.settings.lock_enabled);
    }

    #[test]
    fn zero_lock_minutes_is_invalid() {
        let text = "[backtest]\nlock_minutes = 0\n[strategy]\ntype = \"rsi_extreme\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn negative_offset_is_invalid() {
        let text = "[backtest]\nstrike_offset = -5.0\n[strategy]\ntype = \"rsi_extreme\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn inverted_thresholds_surface_as_strategy_error() {
        let text = "[strategy]\ntype = \"rsi_extreme\"\noversold = 90.0\n";
        assert!(matches!(
            BacktestConfig::from_toml(text),
            Err(ConfigError::Strategy(_))
        ));
    }

    #[test]
    fn unknown_strategy_is_parse_error() {
        let text = "[strategy]\ntype = \"macd\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn preset_names_are_unique_and_resolvable() {
        let names = preset_names();
        assert_eq!(names.len(), 7);
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
        for name in &names {
            assert!(find_preset(name).is_some());
        }
        assert!(find_preset("nope").is_none());
    }

    #[test]
    fn preset_roundtrips_through_backtest_config() {
        let preset = find_preset("rsi_extreme").unwrap();
        let config = BacktestConfig::from_preset(preset.clone(), Some("bars.csv".into()));
        assert_eq!(config.to_strategy_config().unwrap(), preset);
    }
}
