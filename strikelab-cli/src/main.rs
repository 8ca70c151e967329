//! StrikeLab CLI: run, sweep, and preset listing commands.
//!
//! Commands:
//! - `run`: backtest one strategy from a TOML config file or named preset
//! - `sweep`: every preset over one data file, in parallel
//! - `presets`: list preset names and parameters

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use strikelab_core::engine::RunStatus;
use strikelab_runner::config::DataSection;
use strikelab_runner::{
    find_preset, generate_comparison, load_bars, preset_names, presets, run_single_backtest,
    run_strategies_parallel, save_artifacts, BacktestConfig, BacktestResult, DirectionTally,
};

#[derive(Parser)]
#[command(
    name = "strikelab",
    about = "StrikeLab CLI: fixed-strike window-settled signal backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy from a TOML config file or named preset.
    Run(RunArgs),
    /// Run every preset over one data file in parallel and compare.
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        /// Write per-strategy artifacts and comparison.md here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List named presets.
    Presets,
}

#[derive(Args)]
struct DataArgs {
    /// CSV file with time and OHLC columns.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Name of the time column. Overrides the config file.
    #[arg(long)]
    time_column: Option<String>,

    /// Use a seeded synthetic random walk instead of a file.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Path to a TOML config file.
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Named preset (see `strikelab presets`).
    #[arg(long)]
    preset: Option<String>,

    #[command(flatten)]
    data: DataArgs,

    /// Distance from the signal close to the strike.
    #[arg(long)]
    strike_offset: Option<f64>,

    /// Lock window size in minutes.
    #[arg(long)]
    lock_minutes: Option<u32>,

    /// Trade every qualifying signal, ignoring the window lock.
    #[arg(long, default_value_t = false)]
    no_lock: bool,

    /// Output directory for artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Sweep { data, output_dir } => run_sweep(data, output_dir.as_deref()),
        Commands::Presets => {
            list_presets();
            Ok(())
        }
    }
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), None) => BacktestConfig::from_file(path)?,
        (None, Some(name)) => {
            let preset = find_preset(name).ok_or_else(|| {
                anyhow!(
                    "unknown preset '{name}'. Valid: {}",
                    preset_names().join(", ")
                )
            })?;
            BacktestConfig::from_preset(preset, None)
        }
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (None, None) => bail!("one of --config or --preset is required"),
    };

    // Flags override file values.
    apply_data_args(&mut config.data, &args.data);
    if let Some(offset) = args.strike_offset {
        config.backtest.strike_offset = Some(offset);
    }
    if let Some(minutes) = args.lock_minutes {
        config.backtest.lock_minutes = minutes;
    }
    if args.no_lock {
        config.backtest.lock_enabled = false;
    }
    config.validate()?;

    let result = run_single_backtest(&config)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &args.output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn apply_data_args(section: &mut DataSection, args: &DataArgs) {
    if let Some(path) = &args.data {
        section.path = Some(path.clone());
    }
    if let Some(column) = &args.time_column {
        section.time_column = column.clone();
    }
    if args.synthetic {
        section.synthetic = true;
    }
}

fn run_sweep(args: DataArgs, output_dir: Option<&Path>) -> Result<()> {
    let mut section = DataSection::default();
    apply_data_args(&mut section, &args);
    let data = load_bars(&section)?;

    let strategies: Vec<_> = presets()
        .into_iter()
        .filter(|p| !p.filter.reads_input_columns() || !data.columns.is_empty())
        .collect();
    info!(
        strategies = strategies.len(),
        bars = data.bars.len(),
        "sweeping presets"
    );

    let mut results = Vec::with_capacity(strategies.len());
    for (strategy, outcome) in strategies.iter().zip(run_strategies_parallel(&strategies, &data)) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => eprintln!("Error for {}: {e}", strategy.name),
        }
    }

    println!();
    println!(
        "{:<30} {:>8} {:>7} {:>6} {:>7} {:>9} {:>8}",
        "Strategy", "Offset", "Trades", "Wins", "Losses", "Win Rate", "Windows"
    );
    println!("{}", "-".repeat(81));
    for r in &results {
        let s = &r.summary;
        println!(
            "{:<30} {:>8} {:>7} {:>6} {:>7} {:>9} {:>8}",
            r.config.name,
            r.config.settings.strike_offset,
            s.total,
            s.wins,
            s.losses,
            format_rate(s.win_rate),
            s.distinct_windows
        );
    }
    if data.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }

    if let Some(dir) = output_dir {
        for r in &results {
            save_artifacts(r, dir)?;
        }
        let path = dir.join("comparison.md");
        std::fs::write(&path, generate_comparison(&results))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Artifacts saved to: {}", dir.display());
    }

    Ok(())
}

fn list_presets() {
    println!("{:<30} {:>8}  Parameters", "Preset", "Offset");
    println!("{}", "-".repeat(80));
    for preset in presets() {
        let params = serde_json::to_string(&preset.filter).unwrap_or_default();
        println!(
            "{:<30} {:>8}  {params}",
            preset.name, preset.settings.strike_offset
        );
    }
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.2}%", r * 100.0))
        .unwrap_or_else(|| "n/a".into())
}

fn print_direction(label: &str, t: &DirectionTally) {
    println!(
        "{label:<8} {:>6} {:>6} {:>9}",
        t.wins,
        t.losses,
        format_rate(t.win_rate())
    );
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    let settings = &result.config.settings;

    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.config.name);
    println!("Bars:           {}", result.bar_count);
    println!("Strike Offset:  {}", settings.strike_offset);
    println!(
        "Lock:           {} min{}",
        settings.granularity.as_minutes(),
        if settings.lock_enabled { "" } else { " (disabled)" }
    );
    println!("Config Hash:    {}", result.config_hash.short());
    println!("Dataset Hash:   {}", result.dataset_hash.short());

    if result.status == RunStatus::NoSignals {
        println!();
        println!("No signals found. Try with more data or adjust thresholds.");
    } else {
        println!();
        println!("--- Overall Performance ---");
        println!("Total signals:  {}", s.total);
        println!("Wins:           {}", s.wins);
        println!("Losses:         {}", s.losses);
        println!("Win rate:       {}", format_rate(s.win_rate));
        println!();
        println!("--- Performance by Direction ---");
        println!("{:<8} {:>6} {:>6} {:>9}", "", "Wins", "Losses", "Win Rate");
        print_direction("long", &s.long);
        print_direction("short", &s.short);
        println!();
        println!("Distinct windows with signals: {}", s.distinct_windows);
        println!("Total signals:                 {}", s.total);
        println!("Max consecutive wins:          {}", s.max_consecutive_wins);
        println!("Max consecutive losses:        {}", s.max_consecutive_losses);
    }

    let d = &result.diagnostics;
    println!();
    println!("--- Diagnostics ---");
    println!(
        "Transitions: {}  dropped while locked: {}  rejected: {}  unresolvable: {}",
        d.transitions, d.lock_suppressed, d.filter_rejected, d.unresolvable
    );
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
