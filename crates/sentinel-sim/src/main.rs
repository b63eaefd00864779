//! # Sentinel Sim
//!
//! Headless harness for the Sentinel combat core.
//!
//! Runs one enemy against a scripted target at a fixed tick rate:
//! - Config: TOML encounter description with defaults
//! - Sensor: distance-based detection with target memory
//! - Scenario: target script, navigation, hit resolution, respawns

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;
mod sensor;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SimConfig;
use crate::scenario::Simulation;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "sentinel-sim", version, about = "Run a scripted Sentinel encounter")]
struct Cli {
    /// Encounter configuration (TOML). Defaults are used when missing.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ticks to run, overriding the configuration.
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,

    /// Print events and the final summary as JSON lines on stdout.
    #[arg(long)]
    json: bool,

    /// Write the default configuration to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "sentinel=debug" } else { "sentinel=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    info!("Sentinel sim {}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = cli.write_default_config {
        SimConfig::default()
            .save_to(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        return Ok(());
    }

    let mut config = cli.config.as_ref().map(SimConfig::load_from).unwrap_or_default();
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.validate();

    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    let ticks = config.ticks;
    info!("running {} ticks at {} Hz (seed {})", ticks, config.tick_rate, seed);

    let mut sim = Simulation::new(config, seed).context("invalid encounter configuration")?;

    let json = cli.json;
    let stats = sim.run(ticks, |event| {
        if json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("failed to encode event: {e}"),
            }
        } else {
            info!("[{:>8.2}s] {:?}", event.time, event.event);
        }
    });

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        let target = sim.target();
        info!(
            "finished at {:.2}s: enemy {} ({:?}, {:.0} hp), target {} ({}, {:.0} hp, holding {})",
            sim.now(),
            sim.enemy().id(),
            sim.enemy().state(),
            sim.enemy().health().current(),
            target.id(),
            if target.is_active() { "up" } else { "down" },
            target.health().current(),
            target.weapons().active_weapon().map_or("nothing", |w| w.name()),
        );
        info!("{stats:#?}");
    }

    Ok(())
}
