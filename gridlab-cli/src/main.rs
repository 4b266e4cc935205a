//! GridLab CLI: replay bars through the grid engine and inspect presets.
//!
//! Commands:
//! - `replay`: run a bar file or a synthetic series through one engine
//! - `presets`: list named presets with their fingerprints
//! - `config`: print a preset as TOML, ready to edit and pass to `--config`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gridlab_core::data::{generate_synthetic_bars, load_bars_csv, BarInterval};
use gridlab_core::engine::{replay, Allocation, ReplayResult};
use gridlab_core::{EngineConfig, GridPreset};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gridlab",
    about = "GridLab CLI: incremental grid position manager"
)]
struct Cli {
    /// Log every tick decision (debug level).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Interval {
    Daily,
    Hourly,
}

impl From<Interval> for BarInterval {
    fn from(value: Interval) -> Self {
        match value {
            Interval::Daily => BarInterval::Daily,
            Interval::Hourly => BarInterval::Hourly,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay bars and write the per-bar exposure stream.
    Replay {
        /// CSV with timestamp,open,high,low,close,volume columns.
        #[arg(long)]
        bars: Option<PathBuf>,

        /// Generate this many synthetic bars instead of reading a file.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for synthetic bars.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Bar interval for synthetic bars.
        #[arg(long, value_enum, default_value = "daily")]
        interval: Interval,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: gold_fixed_grid, gold_session_grid, adaptive_grid.
        #[arg(long)]
        preset: Option<String>,

        /// Override the configured symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Write `timestamp,exposure` rows here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List named presets.
    Presets,
    /// Print a preset's full configuration as TOML.
    Config {
        #[arg(long)]
        preset: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            bars,
            synthetic,
            seed,
            interval,
            config,
            preset,
            symbol,
            output,
            json,
        } => run_replay(ReplayArgs {
            bars,
            synthetic,
            seed,
            interval: interval.into(),
            config,
            preset,
            symbol,
            output,
            json,
        }),
        Commands::Presets => run_presets(),
        Commands::Config { preset } => run_config(&preset),
    }
}

struct ReplayArgs {
    bars: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
    interval: BarInterval,
    config: Option<PathBuf>,
    preset: Option<String>,
    symbol: Option<String>,
    output: Option<PathBuf>,
    json: bool,
}

fn parse_preset(name: &str) -> Result<GridPreset> {
    match GridPreset::from_name(name) {
        Some(preset) => Ok(preset),
        None => {
            let valid: Vec<&str> = GridPreset::ALL.iter().map(|p| p.name()).collect();
            bail!("unknown preset '{name}'. Valid: {}", valid.join(", "))
        }
    }
}

fn load_config(path: Option<&Path>, preset: Option<&str>) -> Result<EngineConfig> {
    match (path, preset) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (Some(path), None) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        (None, Some(name)) => Ok(parse_preset(name)?.to_config()),
        (None, None) => Ok(GridPreset::GoldFixedGrid.to_config()),
    }
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref(), args.preset.as_deref())?;
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }

    let bars = match (args.bars, args.synthetic) {
        (Some(_), Some(_)) => bail!("--bars and --synthetic are mutually exclusive"),
        (None, None) => bail!("one of --bars or --synthetic is required"),
        (Some(path), None) => load_bars_csv(&path, &config.symbol)
            .with_context(|| format!("failed to load bars from {}", path.display()))?,
        (None, Some(count)) => {
            info!("generating {count} synthetic bars (seed {})", args.seed);
            generate_synthetic_bars(&config.symbol, args.interval, count, args.seed)
        }
    };

    let mut allocations: Vec<Allocation> = Vec::with_capacity(bars.len());
    let result = replay(&config, &bars, &mut allocations).context("engine refused to start")?;

    if let Some(path) = &args.output {
        write_allocations(path, &allocations)?;
        info!("wrote {} allocations to {}", allocations.len(), path.display());
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize summary")?
        );
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn write_allocations(path: &Path, allocations: &[Allocation]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(["timestamp", "exposure"])?;
    for a in allocations {
        wtr.write_record([
            a.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            a.exposure.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_presets() -> Result<()> {
    println!("{:<20} {:<14} Description", "Preset", "Fingerprint");
    println!("{}", "-".repeat(80));
    for preset in GridPreset::ALL {
        let fingerprint = preset.to_config().fingerprint();
        println!(
            "{:<20} {:<14} {}",
            preset.name(),
            fingerprint.short(),
            preset.description()
        );
    }
    Ok(())
}

fn run_config(name: &str) -> Result<()> {
    let config = parse_preset(name)?.to_config();
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_summary(result: &ReplayResult) {
    println!();
    println!("=== Replay Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Config:         {}", result.fingerprint.short());
    println!(
        "Bars:           {} ({} processed, {} skipped, {} invalid)",
        result.bars, result.processed, result.skipped, result.invalid_bars
    );
    println!();
    println!("--- Legs ---");
    println!("Opened:         {}", result.opened);
    println!("Rejected:       {}", result.rejected);
    println!(
        "Closed:         {} ({} take-profit, {} stop-loss)",
        result.closed(),
        result.closed_take_profit,
        result.closed_stop_loss
    );
    println!("Re-anchors:     {}", result.reanchors);
    println!("Max open:       {}", result.max_open_legs);
    println!("Still open:     {}", result.open_legs);
    println!();
    println!("Final exposure: {:.4}", result.final_exposure);
    println!("Realized:       {:+.4}", result.realized);
}
