//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the trade tape for external analysis tools
//! - **Markdown**: human-readable single-run reports and multi-strategy comparisons
//!
//! Newer schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use strikelab_core::domain::TradeRecord;
use strikelab_core::engine::RunStatus;

use crate::metrics::DirectionTally;
use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: signal_time, signal_window, direction, signal_close, strike,
/// resolution_time, resolution_close, outcome, trigger_value
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "signal_time",
        "signal_window",
        "direction",
        "signal_close",
        "strike",
        "resolution_time",
        "resolution_close",
        "outcome",
        "trigger_value",
    ])?;

    for t in trades {
        wtr.write_record(&[
            t.signal_time.to_string(),
            t.signal_window_key.to_string(),
            t.direction.as_str().to_string(),
            t.signal_reference_price.to_string(),
            t.strike.to_string(),
            t.resolution_time.to_string(),
            t.resolution_price.to_string(),
            t.outcome.as_str().to_string(),
            t.trigger_value.map(|v| format!("{v:.4}")).unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ─── Artifacts ──────────────────────────────────────────────────────

/// Directory name for a run: `<strategy>_<config hash prefix>`.
pub fn artifact_dir_name(result: &BacktestResult) -> String {
    format!("{}_{}", result.config.name, result.config_hash.short())
}

/// Save a full artifact set under `output_dir/<strategy>_<hash8>/`:
/// - `manifest.json`: the full result
/// - `trades.csv`: trade tape
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let trades_csv = export_trades_csv(&result.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)?;

    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "n/a".into())
}

fn tally_row(label: &str, t: &DirectionTally) -> String {
    format!(
        "| {label} | {} | {} | {} | {} |\n",
        t.total(),
        t.wins,
        t.losses,
        percent(t.win_rate())
    )
}

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);
    let s = &result.summary;
    let settings = &result.config.settings;

    md.push_str(&format!("# Backtest Report: {}\n\n", result.config.name));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", result.config.filter.type_name()));
    md.push_str(&format!("| Strike Offset | {} |\n", settings.strike_offset));
    md.push_str(&format!(
        "| Lock Window | {} min ({}) |\n",
        settings.granularity.as_minutes(),
        if settings.lock_enabled { "enabled" } else { "disabled" }
    ));
    md.push_str(&format!("| Bars | {} |\n", result.bar_count));
    md.push_str(&format!("| Config Hash | {} |\n", result.config_hash));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Outcomes\n\n");
    if result.status == RunStatus::NoSignals {
        md.push_str("No signals found.\n\n");
    } else {
        md.push_str("| Direction | Trades | Wins | Losses | Win Rate |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        md.push_str(&tally_row("Long", &s.long));
        md.push_str(&tally_row("Short", &s.short));
        md.push_str(&format!(
            "| **All** | {} | {} | {} | {} |\n\n",
            s.total,
            s.wins,
            s.losses,
            percent(s.win_rate)
        ));
        md.push_str(&format!(
            "Distinct windows: {} of {} signals. Max consecutive wins {}, losses {}.\n\n",
            s.distinct_windows, s.total, s.max_consecutive_wins, s.max_consecutive_losses
        ));
    }

    let d = &result.diagnostics;
    md.push_str("## Diagnostics\n\n");
    md.push_str("| Counter | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Warm-up bars | {} |\n", d.warmup_skipped));
    md.push_str(&format!("| Missing-input bars | {} |\n", d.missing_skipped));
    md.push_str(&format!("| State transitions | {} |\n", d.transitions));
    md.push_str(&format!("| Dropped while locked | {} |\n", d.lock_suppressed));
    md.push_str(&format!("| Rejected by filter | {} |\n", d.filter_rejected));
    md.push_str(&format!("| Unresolvable | {} |\n", d.unresolvable));
    md.push('\n');

    md
}

/// Generate a Markdown comparison table for several runs over one dataset.
pub fn generate_comparison(results: &[BacktestResult]) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str("# Strategy Comparison\n\n");
    if let Some(first) = results.first() {
        md.push_str(&format!("Dataset: `{}`\n\n", first.dataset_hash.short()));
    }
    md.push_str("| Strategy | Offset | Trades | Wins | Losses | Win Rate | Windows |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for r in results {
        let s = &r.summary;
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            r.config.name,
            r.config.settings.strike_offset,
            s.total,
            s.wins,
            s.losses,
            percent(s.win_rate),
            s.distinct_windows
        ));
    }
    md
}
