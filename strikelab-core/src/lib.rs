//! StrikeLab Core: domain types, indicators, entry filters and the backtest driver.
//!
//! This crate contains the heart of the engine:
//! - Domain types (bars, lock windows, trade records, content hashes)
//! - Indicator engine (EMA, RSI, ATR, SuperTrend, Bollinger, stochastic)
//! - State tracker and trade lock
//! - Entry filters and the signal evaluator
//! - Outcome resolution and the single-pass driver
//!
//! No file I/O happens here.

pub mod components;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
