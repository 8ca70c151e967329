//! End-to-end: CSV on disk → config → run → artifacts on disk.

use std::fmt::Write as _;
use std::path::Path;

use strikelab_core::domain::{Direction, Outcome};
use strikelab_core::engine::RunStatus;
use strikelab_runner::{
    load_artifacts, load_csv, run_single_backtest, save_artifacts, BacktestConfig, ConfigError,
};

/// 14 five-minute bars from 00:00 with `K`/`D` columns.
///
/// %K crosses above %D at 00:15 while oversold, then drops back at 00:20.
fn write_stoch_csv(path: &Path) {
    let mut text = String::from("time,open,high,low,close,K,D\n");
    for i in 0..14 {
        let close = if i == 11 { 95.0 } else { 100.0 };
        let k = if i == 3 { 15.0 } else { 10.0 };
        writeln!(
            text,
            "2025-01-06 {:02}:{:02}:00,100,101,94,{close},{k},12",
            i * 5 / 60,
            i * 5 % 60
        )
        .unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn write_config(dir: &Path, csv: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("stoch_columns.toml");
    let text = format!(
        r#"[data]
path = "{}"

[backtest]
strike_offset = 10.0
{extra}

[strategy]
type = "stochastic_crossover"
precomputed = true
"#,
        csv.display().to_string().replace('\\', "/")
    );
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn csv_columns_drive_a_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    write_stoch_csv(&csv);
    let config = BacktestConfig::from_file(&write_config(dir.path(), &csv, "")).unwrap();
    assert_eq!(config.name.as_deref(), Some("stoch_columns"));

    let result = run_single_backtest(&config).unwrap();
    assert_eq!(result.status, RunStatus::Traded(1));
    let trade = &result.trades[0];
    assert_eq!(trade.signal_time.to_string(), "2025-01-06 00:15:00");
    assert_eq!(trade.direction, Direction::Long);
    assert_eq!(trade.strike, 90.0);
    assert_eq!(trade.resolution_time.to_string(), "2025-01-06 00:55:00");
    assert_eq!(trade.outcome, Outcome::Win);
    assert_eq!(trade.trigger_value, Some(15.0));
    assert_eq!(result.diagnostics.lock_suppressed, 1);
    assert_eq!(result.summary.win_rate, Some(1.0));
}

#[test]
fn disabling_the_lock_admits_the_second_transition_to_the_filter() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    write_stoch_csv(&csv);
    let config =
        BacktestConfig::from_file(&write_config(dir.path(), &csv, "lock_enabled = false"))
            .unwrap();

    let result = run_single_backtest(&config).unwrap();
    // The down-cross at 00:20 has %K = 10, not overbought, so it is rejected.
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.diagnostics.lock_suppressed, 0);
    assert_eq!(result.diagnostics.filter_rejected, 1);
}

#[test]
fn artifacts_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    write_stoch_csv(&csv);
    let config = BacktestConfig::from_file(&write_config(dir.path(), &csv, "")).unwrap();
    let result = run_single_backtest(&config).unwrap();

    let out = dir.path().join("results");
    let run_dir = save_artifacts(&result, &out).unwrap();
    let name = run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("stoch_columns_"));
    assert_eq!(name.len(), "stoch_columns_".len() + 8);
    for file in ["manifest.json", "trades.csv", "report.md"] {
        assert!(run_dir.join(file).exists(), "{file} missing");
    }

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded, result);

    let trades_csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert!(trades_csv.contains("long"));
    assert!(trades_csv.contains("win"));
}

#[test]
fn same_file_same_hash() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    write_stoch_csv(&csv);
    let a = load_csv(&csv, "time").unwrap();
    let b = load_csv(&csv, "time").unwrap();
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.columns.names(), vec!["d", "k"]);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BacktestConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
