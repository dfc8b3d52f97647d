//! Shakedown: replay gesture traces against a live Android device while
//! injecting a reproducible sequence of Heisenbug events.

mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use shakedown_core::pipeline::{Pipeline, PipelineStage};
use shakedown_core::source::{BlankEventSource, TraceSource};
use shakedown_device::adb::AdbDevice;
use shakedown_device::status::StatusReader;
use shakedown_device::LogOnlyDevice;
use shakedown_inject::TroubleInjector;
use shakedown_replay::TroubleReplayer;

use config::{load_config, ReplayConfig, Seed};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML replay configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed override (number or text)
    #[arg(long)]
    seed: Option<String>,

    /// Injection count override
    #[arg(long)]
    injections: Option<usize>,

    /// Number of generated blank events
    #[arg(long)]
    events: Option<usize>,

    /// Spacing of generated blank events in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Device serial passed to adb (-s)
    #[arg(long)]
    serial: Option<String>,

    /// Log device commands instead of executing them
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn apply_overrides(config: &mut ReplayConfig, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.seed = match seed.parse::<u64>() {
            Ok(n) => Seed::Number(n),
            Err(_) => Seed::Text(seed.clone()),
        };
    }
    if let Some(injections) = cli.injections {
        config.injections = injections;
    }
    if let Some(events) = cli.events {
        config.source.events = events;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.source.interval_ms = interval_ms;
    }
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReplayConfig::default(),
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let seed = config.seed.to_u64();
    let injector = TroubleInjector::new(seed, &config.faults, config.injections)?;

    let source: Box<dyn PipelineStage> = match &config.source.trace {
        Some(trace) => Box::new(TraceSource::new(trace.clone())),
        None => Box::new(BlankEventSource::new(
            config.source.interval_ms,
            config.source.events,
        )),
    };

    let mut pipeline = Pipeline::new();
    pipeline.add_step(source);
    pipeline.add_step(Box::new(injector));

    if cli.dry_run {
        pipeline.add_step(Box::new(TroubleReplayer::with_rotate_settle(
            LogOnlyDevice,
            config.rotate_settle_ms,
        )));
    } else {
        let device = match &cli.serial {
            Some(serial) => AdbDevice::with_serial(serial),
            None => AdbDevice::new(),
        };
        match StatusReader::new(&device).battery_level() {
            Ok(level) => info!(level, "device battery level"),
            Err(e) => warn!(error = %e, "could not read battery level"),
        }
        pipeline.add_step(Box::new(TroubleReplayer::with_rotate_settle(
            device,
            config.rotate_settle_ms,
        )));
    }

    info!(seed, injections = config.injections, "replay started");
    pipeline.execute()?;
    info!("replay finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakedown_inject::seed_from_str;

    #[test]
    fn test_seed_override_prefers_numbers() {
        let mut config = ReplayConfig::default();
        let cli = Cli::parse_from(["shakedown", "--seed", "42"]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.seed.to_u64(), 42);
    }

    #[test]
    fn test_seed_override_hashes_text() {
        let mut config = ReplayConfig::default();
        let cli = Cli::parse_from(["shakedown", "--seed", "heisenbug"]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.seed.to_u64(), seed_from_str("heisenbug"));
    }

    #[test]
    fn test_generator_overrides() {
        let mut config = ReplayConfig::default();
        let cli = Cli::parse_from([
            "shakedown",
            "--events",
            "5",
            "--interval-ms",
            "1000",
            "--injections",
            "2",
        ]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.source.events, 5);
        assert_eq!(config.source.interval_ms, 1000);
        assert_eq!(config.injections, 2);
    }
}
