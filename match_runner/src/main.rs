//! Headless match runner
//!
//! Plays random-policy episodes on a foosball table and optionally records
//! the frame stream for a renderer.

use anyhow::{Context, Result};
use clap::Parser;
use foos_core::{Params, Side, TableConfig, TableModel};
use match_runner::{FileSink, FrameSink, MatchRunner, RunnerConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "match_runner")]
#[command(about = "Run foosball episodes with random players", long_about = None)]
struct Cli {
    /// Episodes to play
    #[arg(long, default_value_t = 10)]
    episodes: u32,

    /// Tick limit per episode
    #[arg(long, default_value_t = 3600)]
    max_ticks: u32,

    /// Seed for ball jitter and both policies
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Table configuration JSON file (defaults to the standard 8-rod table)
    #[arg(long)]
    table: Option<PathBuf>,

    /// Write COBS-framed snapshots and events to this file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Emit a snapshot every N ticks (0 disables snapshots)
    #[arg(long, default_value_t = 1)]
    snapshot_every: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.table {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read table config {}", path.display()))?;
            TableConfig::from_json_str(&text)?
        }
        None => TableConfig::new(),
    };
    let table = TableModel::new(&config)?;

    let sink = match &cli.out {
        Some(path) => Some(Box::new(FileSink::create(path)?) as Box<dyn FrameSink>),
        None => None,
    };

    let runner_config = RunnerConfig {
        episodes: cli.episodes,
        max_ticks: cli.max_ticks,
        dt: Params::FIXED_DT,
        snapshot_every: cli.snapshot_every,
    };

    log::info!(
        "Running {} episodes (seed {}, max {} ticks each)",
        cli.episodes,
        cli.seed,
        cli.max_ticks
    );
    let mut runner = MatchRunner::new(table, cli.seed, runner_config, sink);
    let summary = runner.run()?;

    println!(
        "score {}-{} after {} episodes ({} timed out, {} out of bounds), {} ticks",
        summary.score.home,
        summary.score.away,
        summary.episodes,
        summary.timeouts,
        summary.tally.out_of_bounds,
        summary.ticks
    );
    for side in Side::BOTH {
        println!("{side:?} reward: {:.1}", summary.reward[side.index()]);
    }
    Ok(())
}
