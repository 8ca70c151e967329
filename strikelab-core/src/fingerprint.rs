//! Run fingerprinting: deterministic identification of strategy configurations.
//!
//! A `StrategyConfig` is everything a run depends on besides the bars. Two
//! runs with equal `config_hash` on data with equal `DatasetHash` produce
//! identical trade lists.

use serde::{Deserialize, Serialize};

use crate::components::factory::EntryFilterConfig;
use crate::domain::ConfigHash;
use crate::engine::BacktestSettings;

/// Complete configuration of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Display name (preset name or file stem).
    pub name: String,
    pub filter: EntryFilterConfig,
    pub settings: BacktestSettings,
}

impl StrategyConfig {
    /// Config at the filter's default parameters and strike offset.
    pub fn with_defaults(filter: EntryFilterConfig) -> Self {
        let settings = BacktestSettings::new(filter.default_strike_offset());
        Self {
            name: filter.type_name().to_string(),
            filter,
            settings,
        }
    }

    /// BLAKE3 of the canonical JSON of filter and settings.
    ///
    /// The display name is excluded: renaming a preset does not change
    /// its identity.
    pub fn config_hash(&self) -> Result<ConfigHash, serde_json::Error> {
        let canonical = serde_json::to_vec(&(&self.filter, &self.settings))?;
        Ok(ConfigHash::from_bytes(&canonical))
    }
}
