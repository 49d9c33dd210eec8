//! Command-line entry point.
//!
//! Reads replays exported as JSON event tables, runs the batch, and
//! prints the results as JSON on stdout. Failed replays are part of the
//! output, not a process failure.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nadestat::source::JsonSource;
use nadestat::{BatchRunner, NadePipeline, PipelineConfig, RosterPolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Per-player grenade utility efficacy from exported replay event tables")]
struct Cli {
    /// Replay exports to analyze
    #[arg(required = true)]
    replays: Vec<String>,

    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override where the player roster comes from
    #[arg(long, value_enum)]
    roster: Option<RosterArg>,

    /// Analyze replays concurrently (needs the `parallel` feature)
    #[arg(long)]
    parallel: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum RosterArg {
    PlayerInfo,
    DamageAttackers,
}

impl From<RosterArg> for RosterPolicy {
    fn from(arg: RosterArg) -> Self {
        match arg {
            RosterArg::PlayerInfo => RosterPolicy::PlayerInfo,
            RosterArg::DamageAttackers => RosterPolicy::DamageAttackers,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(roster) = cli.roster {
        config = config.with_roster(roster.into());
    }

    let runner = BatchRunner::new(NadePipeline::new(config)?);
    let source = JsonSource::new();
    let results = if cli.parallel {
        run_parallel(&runner, &source, &cli.replays)
    } else {
        runner.run(&source, cli.replays.as_slice())
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{}", output);

    Ok(())
}

#[cfg(feature = "parallel")]
fn run_parallel(
    runner: &BatchRunner,
    source: &JsonSource,
    replays: &[String],
) -> nadestat::BatchResults {
    runner.run_parallel(source, replays)
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    runner: &BatchRunner,
    source: &JsonSource,
    replays: &[String],
) -> nadestat::BatchResults {
    tracing::warn!("built without the `parallel` feature, running sequentially");
    runner.run(source, replays)
}

/// Setup logging to stderr; `RUST_LOG` wins over `-v`.
fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
