//! Headless match runner
//!
//! Plays the agent against the in-memory host for a fixed number of frames
//! and prints a summary of what it did.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use frontier_bot::core::config::load_config;
use frontier_bot::core::types::PlayerId;
use frontier_bot::host::sim::SimulatedHost;
use frontier_bot::host::Host;
use frontier_bot::render::LogSink;
use frontier_bot::simulation::{DispatchStats, TickStatus};
use frontier_bot::{Agent, AgentConfig, Result};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Headless runner - simulated match for tuning and smoke tests
#[derive(Parser, Debug)]
#[command(name = "frontier-bot")]
#[command(about = "Run the agent against the simulated host and report what it did")]
struct Args {
    /// Frames to simulate
    #[arg(long, default_value_t = 5000)]
    frames: u64,

    /// Seed for the starting layout
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host command latency in frames
    #[arg(long, default_value_t = 2)]
    latency: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log every issued command and fired event
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    dispatched_ticks: u64,
    commands_rejected: usize,
    events_fired: usize,
    /// Dispatch counters summed over every frame
    dispatch: DispatchStats,
    minerals: u32,
    supply_used: u32,
    supply_total: u32,
    units: BTreeMap<String, usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "frontier_bot=debug"
    } else {
        "frontier_bot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, frames = args.frames, latency = args.latency, "runner starting");

    let mut host = SimulatedHost::standard_start(PlayerId(0), seed);
    host.set_latency(args.latency);
    let mut sink = LogSink;
    let mut agent = Agent::new(config);

    agent.on_start(&mut host);

    let mut summary = RunSummary {
        seed,
        frames: args.frames,
        ..RunSummary::default()
    };

    for _ in 0..args.frames {
        let report = agent.on_frame(&mut host, &mut sink);
        if report.status == TickStatus::Dispatched {
            summary.dispatched_ticks += 1;
        }
        summary.dispatch.merge(&report.dispatch);
        summary.events_fired += report.fired.len();
        host.step();
    }

    agent.on_end(false);

    summary.commands_rejected = host
        .command_log()
        .iter()
        .filter(|r| r.rejected.is_some())
        .count();
    if let Some(player) = host.self_player() {
        summary.minerals = player.minerals;
        summary.supply_used = player.supply_used;
        summary.supply_total = player.supply_total;
    }
    for unit in host.own_units() {
        *summary.units.entry(unit.kind.to_string()).or_default() += 1;
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_text(&summary),
    }

    Ok(())
}

fn print_text(summary: &RunSummary) {
    println!("Match Summary");
    println!("=============");
    println!("Frames: {} ({} dispatched)", summary.frames, summary.dispatched_ticks);
    println!(
        "Commands: {} issued, {} rejected by host",
        summary.dispatch.commands_issued, summary.commands_rejected
    );
    println!("Decision failures: {}", summary.dispatch.failures);
    println!(
        "Units: {} handled, {} unhandled, {} skipped",
        summary.dispatch.handled,
        summary.dispatch.unhandled,
        summary.dispatch.skipped_total()
    );
    println!("Deferred events fired: {}", summary.events_fired);
    println!("Minerals: {}", summary.minerals);
    println!("Supply: {}/{}", summary.supply_used, summary.supply_total);
    println!();
    for (kind, count) in &summary.units {
        println!("  {kind}: {count}");
    }
    println!();
    println!("Seed: {}", summary.seed);
}
