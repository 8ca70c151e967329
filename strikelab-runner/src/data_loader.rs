//! Bar loading for the runner.
//!
//! Reads a CSV with a time column and `open/high/low/close` columns (matched
//! case-insensitively). `volume` is optional. Any other numeric column is kept
//! as a precomputed indicator series under its lower-cased header, so a file
//! exported with `K`, `D` or `RSI` columns feeds the column-reading filters
//! directly.
//!
//! Rows with an empty or non-numeric OHLC value are dropped. Remaining rows
//! are stably sorted by time.
//!
//! Synthetic data is a developer-only debug mode. Results produced on
//! synthetic data are tagged.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, warn};

use strikelab_core::components::IndicatorValues;
use strikelab_core::domain::{Bar, DatasetHash};

use crate::config::DataSection;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: unparseable timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },
    #[error("no data path configured (set data.path or use --synthetic)")]
    NoSource,
}

/// Bars plus everything derived from the file at load time.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Ascending by timestamp.
    pub bars: Vec<Bar>,
    /// Extra numeric columns, aligned with `bars`.
    pub columns: IndicatorValues,
    /// BLAKE3 over timestamps, OHLC and extra columns.
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
    /// Rows discarded for missing OHLC values.
    pub dropped_rows: usize,
}

/// Bars generated by the synthetic random walk.
pub const SYNTHETIC_BARS: usize = 12 * 24 * 30;

const SYNTHETIC_SEED: u64 = 0x5EED;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Resolve a `[data]` section into bars.
pub fn load_bars(data: &DataSection) -> Result<LoadedData, LoadError> {
    if data.synthetic {
        warn!("generating synthetic data; results will be tagged as synthetic");
        return Ok(generate_synthetic(SYNTHETIC_BARS, SYNTHETIC_SEED));
    }
    let path = data.path.as_deref().ok_or(LoadError::NoSource)?;
    load_csv(path, &data.time_column)
}

pub fn load_csv(path: &Path, time_column: &str) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = load_csv_from_reader(file, time_column)?;
    info!(
        path = %path.display(),
        bars = loaded.bars.len(),
        columns = loaded.columns.len(),
        dropped = loaded.dropped_rows,
        hash = loaded.dataset_hash.short(),
        "loaded bars"
    );
    Ok(loaded)
}

struct Row {
    bar: Bar,
    extras: Vec<f64>,
}

pub fn load_csv_from_reader<R: Read>(reader: R, time_column: &str) -> Result<LoadedData, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let find = |name: &str| -> Result<usize, LoadError> {
        let wanted = name.to_ascii_lowercase();
        headers
            .iter()
            .position(|h| *h == wanted)
            .ok_or(LoadError::MissingColumn(name.to_string()))
    };
    let time_idx = find(time_column)?;
    let open_idx = find("open")?;
    let high_idx = find("high")?;
    let low_idx = find("low")?;
    let close_idx = find("close")?;
    let volume_idx = find("volume").ok();

    let known = [Some(time_idx), Some(open_idx), Some(high_idx), Some(low_idx), Some(close_idx), volume_idx];
    let extra_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !known.contains(&Some(*i)) && !h.is_empty())
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut rows = Vec::new();
    let mut dropped_rows = 0;
    // Columns that never hold a number (labels, symbols) are not indicators.
    let mut numeric_seen = vec![false; extra_cols.len()];

    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let row = row_idx + 1;
        let raw_time = record.get(time_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| LoadError::BadTimestamp {
            row,
            value: raw_time.to_string(),
        })?;

        let bar = Bar {
            timestamp,
            open: parse_number(record.get(open_idx)),
            high: parse_number(record.get(high_idx)),
            low: parse_number(record.get(low_idx)),
            close: parse_number(record.get(close_idx)),
            volume: volume_idx
                .map(|i| parse_number(record.get(i)))
                .filter(|v| !v.is_nan())
                .unwrap_or(0.0),
        };
        if bar.is_void() {
            dropped_rows += 1;
            continue;
        }

        let extras: Vec<f64> = extra_cols
            .iter()
            .map(|(i, _)| parse_number(record.get(*i)))
            .collect();
        for (seen, value) in numeric_seen.iter_mut().zip(&extras) {
            *seen |= !value.is_nan();
        }
        rows.push(Row { bar, extras });
    }

    if dropped_rows > 0 {
        warn!(dropped_rows, "dropped rows with missing OHLC values");
    }

    rows.sort_by_key(|r| r.bar.timestamp);

    let insane = rows.iter().filter(|r| !r.bar.is_sane()).count();
    if insane > 0 {
        warn!(bars = insane, "bars with high/low outside open/close");
    }

    let mut columns = IndicatorValues::new();
    for (col, (_, name)) in extra_cols.iter().enumerate() {
        if numeric_seen[col] {
            columns.insert(name.clone(), rows.iter().map(|r| r.extras[col]).collect());
        }
    }
    let bars: Vec<Bar> = rows.into_iter().map(|r| r.bar).collect();
    let dataset_hash = compute_dataset_hash(&bars, &columns);

    Ok(LoadedData {
        bars,
        columns,
        dataset_hash,
        has_synthetic: false,
        dropped_rows,
    })
}

/// Parse RFC 3339, common naive formats, or integer unix seconds.
///
/// Offsets are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}

fn parse_number(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Deterministic BLAKE3 over all bar data and extra columns.
///
/// Columns are hashed in sorted name order.
pub fn compute_dataset_hash(bars: &[Bar], columns: &IndicatorValues) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    for name in columns.names() {
        hasher.update(name.as_bytes());
        for v in columns.get_series(name).unwrap_or_default() {
            hasher.update(&v.to_le_bytes());
        }
    }
    DatasetHash::from_hash(hasher.finalize().to_hex().as_str())
}

/// Generate five-minute random-walk bars for testing and development.
///
/// Starts at 100,000 on 2025-01-06 00:00 so the default strike offsets
/// are meaningful.
pub fn generate_synthetic(n_bars: usize, seed: u64) -> LoadedData {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2025, 1, 6)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(n_bars);
    let mut price = 100_000.0_f64;
    for i in 0..n_bars {
        let step: f64 = rng.gen_range(-0.002..0.002);
        let open = price;
        let close = price * (1.0 + step);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.001));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.001));
        bars.push(Bar {
            timestamp: start + Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: rng.gen_range(1.0..50.0),
        });
        price = close;
    }

    let columns = IndicatorValues::new();
    let dataset_hash = compute_dataset_hash(&bars, &columns);
    LoadedData {
        bars,
        columns,
        dataset_hash,
        has_synthetic: true,
        dropped_rows: 0,
    }
}
