//! Factory: converts an `EntryFilterConfig` into a runtime `EntryFilter`.
//!
//! Configs are plain serde data (TOML presets, JSON manifests). Validation
//! happens here so filter constructors never see invalid parameters.

use serde::{Deserialize, Serialize};

use crate::indicators::BollingerParams;

use super::entry::{
    EmaRsiPullback, EntryFilter, RsiExtreme, SqueezeBreakout, StochasticCrossover, SupertrendFlip,
};

/// Errors that can occur during filter construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("{filter}: {param} must be {requirement}")]
    InvalidParam {
        filter: &'static str,
        param: &'static str,
        requirement: &'static str,
    },
}

fn check(
    ok: bool,
    filter: &'static str,
    param: &'static str,
    requirement: &'static str,
) -> Result<(), FactoryError> {
    if ok {
        Ok(())
    } else {
        Err(FactoryError::InvalidParam {
            filter,
            param,
            requirement,
        })
    }
}

// ─── Parameter blocks ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticCrossoverParams {
    pub k_period: usize,
    pub smooth: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    /// Read %K/%D from the `k`/`d` input columns.
    pub precomputed: bool,
}

impl Default for StochasticCrossoverParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            smooth: 3,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
            precomputed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupertrendFlipParams {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for SupertrendFlipParams {
    fn default() -> Self {
        Self {
            period: 10,
            multiplier: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaRsiPullbackParams {
    pub ema_span: usize,
    pub rsi_window: usize,
    pub midline: f64,
    pub pullback_low: f64,
    pub pullback_high: f64,
}

impl Default for EmaRsiPullbackParams {
    fn default() -> Self {
        Self {
            ema_span: 50,
            rsi_window: 14,
            midline: 50.0,
            pullback_low: 45.0,
            pullback_high: 55.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqueezeBreakoutParams {
    pub ema_short: usize,
    pub ema_long: usize,
    pub bollinger_window: usize,
    pub bollinger_multiplier: f64,
    pub squeeze_lookback: usize,
    pub squeeze_ratio: f64,
}

impl Default for SqueezeBreakoutParams {
    fn default() -> Self {
        let bands = BollingerParams::default();
        Self {
            ema_short: 50,
            ema_long: 200,
            bollinger_window: bands.window,
            bollinger_multiplier: bands.multiplier,
            squeeze_lookback: bands.squeeze_lookback,
            squeeze_ratio: bands.squeeze_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiExtremeParams {
    pub window: usize,
    pub oversold: f64,
    pub overbought: f64,
    /// Read RSI from the `rsi` input column.
    pub precomputed: bool,
}

impl Default for RsiExtremeParams {
    fn default() -> Self {
        Self {
            window: 14,
            oversold: 10.0,
            overbought: 80.0,
            precomputed: false,
        }
    }
}

// ─── Config enum ─────────────────────────────────────────────────────

/// Serializable choice of entry filter, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryFilterConfig {
    StochasticCrossover(StochasticCrossoverParams),
    SupertrendFlip(SupertrendFlipParams),
    EmaRsiPullback(EmaRsiPullbackParams),
    SqueezeBreakout(SqueezeBreakoutParams),
    RsiExtreme(RsiExtremeParams),
}

impl EntryFilterConfig {
    /// One config per filter type, all at default parameters.
    pub fn all_defaults() -> Vec<Self> {
        vec![
            Self::StochasticCrossover(Default::default()),
            Self::SupertrendFlip(Default::default()),
            Self::EmaRsiPullback(Default::default()),
            Self::SqueezeBreakout(Default::default()),
            Self::RsiExtreme(Default::default()),
        ]
    }

    /// The `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::StochasticCrossover(_) => "stochastic_crossover",
            Self::SupertrendFlip(_) => "supertrend_flip",
            Self::EmaRsiPullback(_) => "ema_rsi_pullback",
            Self::SqueezeBreakout(_) => "squeeze_breakout",
            Self::RsiExtreme(_) => "rsi_extreme",
        }
    }

    /// Strike offset used when the run does not set one.
    pub fn default_strike_offset(&self) -> f64 {
        match self {
            Self::StochasticCrossover(_) => 250.0,
            Self::SupertrendFlip(_) => 500.0,
            Self::EmaRsiPullback(_) => 250.0,
            Self::SqueezeBreakout(_) => 250.0,
            Self::RsiExtreme(_) => 100.0,
        }
    }

    /// True when the filter reads `k`/`d`/`rsi` input columns instead of
    /// computing its oscillator.
    pub fn reads_input_columns(&self) -> bool {
        match self {
            Self::StochasticCrossover(p) => p.precomputed,
            Self::RsiExtreme(p) => p.precomputed,
            _ => false,
        }
    }

    pub fn validate(&self) -> Result<(), FactoryError> {
        let name = self.type_name();
        match self {
            Self::StochasticCrossover(p) => {
                check(p.k_period >= 1, name, "k_period", ">= 1")?;
                check(p.smooth >= 1, name, "smooth", ">= 1")?;
                check(p.d_period >= 1, name, "d_period", ">= 1")?;
                check(
                    p.oversold < p.overbought,
                    name,
                    "oversold",
                    "below overbought",
                )
            }
            Self::SupertrendFlip(p) => {
                check(p.period >= 1, name, "period", ">= 1")?;
                check(
                    p.multiplier.is_finite() && p.multiplier > 0.0,
                    name,
                    "multiplier",
                    "finite and > 0",
                )
            }
            Self::EmaRsiPullback(p) => {
                check(p.ema_span >= 1, name, "ema_span", ">= 1")?;
                check(p.rsi_window >= 1, name, "rsi_window", ">= 1")?;
                check(
                    p.pullback_low <= p.midline && p.midline <= p.pullback_high,
                    name,
                    "midline",
                    "between pullback_low and pullback_high",
                )
            }
            Self::SqueezeBreakout(p) => {
                check(p.ema_short >= 1, name, "ema_short", ">= 1")?;
                check(
                    p.ema_short < p.ema_long,
                    name,
                    "ema_short",
                    "shorter than ema_long",
                )?;
                check(p.bollinger_window >= 2, name, "bollinger_window", ">= 2")?;
                check(p.squeeze_lookback >= 1, name, "squeeze_lookback", ">= 1")?;
                check(
                    p.bollinger_multiplier.is_finite() && p.bollinger_multiplier > 0.0,
                    name,
                    "bollinger_multiplier",
                    "finite and > 0",
                )?;
                check(
                    p.squeeze_ratio.is_finite() && p.squeeze_ratio > 0.0,
                    name,
                    "squeeze_ratio",
                    "finite and > 0",
                )
            }
            Self::RsiExtreme(p) => {
                check(p.window >= 1, name, "window", ">= 1")?;
                check(
                    p.oversold < p.overbought,
                    name,
                    "oversold",
                    "below overbought",
                )
            }
        }
    }
}

/// Create an entry filter from its config.
pub fn create_filter(config: &EntryFilterConfig) -> Result<Box<dyn EntryFilter>, FactoryError> {
    config.validate()?;
    let filter: Box<dyn EntryFilter> = match config {
        EntryFilterConfig::StochasticCrossover(p) => {
            if p.precomputed {
                Box::new(StochasticCrossover::precomputed(p.oversold, p.overbought))
            } else {
                Box::new(StochasticCrossover::new(
                    p.k_period,
                    p.smooth,
                    p.d_period,
                    p.oversold,
                    p.overbought,
                ))
            }
        }
        EntryFilterConfig::SupertrendFlip(p) => Box::new(SupertrendFlip::new(p.period, p.multiplier)),
        EntryFilterConfig::EmaRsiPullback(p) => Box::new(EmaRsiPullback::new(
            p.ema_span,
            p.rsi_window,
            p.midline,
            p.pullback_low,
            p.pullback_high,
        )),
        EntryFilterConfig::SqueezeBreakout(p) => Box::new(SqueezeBreakout::new(
            p.ema_short,
            p.ema_long,
            BollingerParams {
                window: p.bollinger_window,
                multiplier: p.bollinger_multiplier,
                squeeze_lookback: p.squeeze_lookback,
                squeeze_ratio: p.squeeze_ratio,
            },
        )),
        EntryFilterConfig::RsiExtreme(p) => {
            if p.precomputed {
                Box::new(RsiExtreme::precomputed(p.oversold, p.overbought))
            } else {
                Box::new(RsiExtreme::new(p.window, p.oversold, p.overbought))
            }
        }
    };
    Ok(filter)
}
