//! The `Indicator` trait and the per-run store of indicator series.
//!
//! Every series is computed over the whole bar slice before the driver
//! starts; the driver only reads by index.

use crate::domain::Bar;
use std::collections::HashMap;
use thiserror::Error;

/// A named numeric series derived from bars.
///
/// `compute` returns one value per bar; `NaN` marks an undefined value
/// (warm-up or a gap in the input). The value at bar `t` reads bars `..=t`
/// only, so computing on a prefix gives the same values as on the full series.
pub trait Indicator: Send + Sync {
    /// Key in `IndicatorValues`, e.g. `ema_50` or `stoch_k_14_3`.
    fn name(&self) -> &str;

    /// Number of leading bars that are undefined on a clean series.
    fn lookback(&self) -> usize;

    /// Values for every bar in `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// A required indicator value is absent or NaN at a bar.
///
/// Recovered locally: the driver skips the bar, it never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("indicator '{key}' undefined at bar {bar_index}")]
pub struct MissingIndicator {
    pub key: String,
    pub bar_index: usize,
}

/// Indicator series by key, each aligned with the bar slice.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Compute only the indicators whose key is absent, so input columns
    /// always win over computed series.
    pub fn compute_missing(&mut self, indicators: &[Box<dyn Indicator>], bars: &[Bar]) {
        for ind in indicators {
            if !self.contains(ind.name()) {
                self.insert(ind.name(), ind.compute(bars));
            }
        }
    }

    /// Raw value at `bar_index`, possibly NaN.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get_series(name)?.get(bar_index).copied()
    }

    /// Defined value at `bar_index`, for use with `?` inside filters.
    pub fn require(&self, name: &str, bar_index: usize) -> Result<f64, MissingIndicator> {
        self.get(name, bar_index)
            .filter(|v| !v.is_nan())
            .ok_or_else(|| MissingIndicator {
                key: name.to_string(),
                bar_index,
            })
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    /// Series keys in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstIndicator;

    impl Indicator for ConstIndicator {
        fn name(&self) -> &str {
            "const"
        }
        fn lookback(&self) -> usize {
            0
        }
        fn compute(&self, bars: &[Bar]) -> Vec<f64> {
            vec![7.0; bars.len()]
        }
    }

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert("ema_3", vec![f64::NAN, f64::NAN, 100.0, 101.0]);
        assert!(iv.get("ema_3", 0).unwrap().is_nan());
        assert_eq!(iv.get("ema_3", 2), Some(100.0));
        assert_eq!(iv.get("ema_3", 4), None); // out of bounds
    }

    #[test]
    fn require_treats_nan_and_absent_as_missing() {
        let mut iv = IndicatorValues::new();
        iv.insert("rsi_14", vec![f64::NAN, 55.0]);
        assert_eq!(iv.require("rsi_14", 1), Ok(55.0));

        let err = iv.require("rsi_14", 0).unwrap_err();
        assert_eq!(err.bar_index, 0);
        assert_eq!(err.key, "rsi_14");

        assert!(iv.require("nonexistent", 1).is_err());
        assert!(iv.require("rsi_14", 9).is_err());
    }

    #[test]
    fn compute_missing_keeps_existing_series() {
        let bars = crate::indicators::make_bars(&[1.0, 2.0]);
        let mut iv = IndicatorValues::new();
        iv.insert("const", vec![1.0, 1.0]);
        iv.compute_missing(&[Box::new(ConstIndicator)], &bars);
        assert_eq!(iv.get_series("const"), Some(&[1.0, 1.0][..]));

        let mut fresh = IndicatorValues::new();
        fresh.compute_missing(&[Box::new(ConstIndicator)], &bars);
        assert_eq!(fresh.get_series("const"), Some(&[7.0, 7.0][..]));
    }

    #[test]
    fn indicator_values_len_and_names() {
        let mut iv = IndicatorValues::new();
        assert!(iv.is_empty());
        iv.insert("sma", vec![1.0, 2.0]);
        iv.insert("ema", vec![1.0, 2.0]);
        assert_eq!(iv.len(), 2);
        assert_eq!(iv.names(), vec!["ema", "sma"]);
    }
}
