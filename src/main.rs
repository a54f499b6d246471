//! Reefmon daemon entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LinuxI2cBus    StdDelay     SystemClock     JsonFileConfig    │
//! │  (BusChannel)   (DelayNs)    (Clock)         (ConfigPort)      │
//! │  MemoryStore / JsonlStore    LogNotifier / SmtpNotifier        │
//! │  (ReadingStore)              (Notifier)      LogEventSink      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Monitor (pure logic)                      │    │
//! │  │  Poller · ProbeClient · Alerts                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

#[cfg(not(target_os = "linux"))]
compile_error!("the reefmon daemon needs Linux i2c-dev");

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use reefmon::adapters::json_config::JsonFileConfig;
use reefmon::adapters::jsonl_store::JsonlStore;
use reefmon::adapters::log_sink::LogEventSink;
use reefmon::adapters::memory_store::MemoryStore;
use reefmon::adapters::notifier::LogNotifier;
use reefmon::adapters::time::{StdDelay, SystemClock};
use reefmon::app::ports::{ConfigError, ConfigPort, Notifier, ReadingStore};
use reefmon::app::service::Monitor;
use reefmon::bus::LinuxI2cBus;
use reefmon::config::{MonitorConfig, StoreConfig};

/// Poll water-quality probes, store readings and send threshold alerts.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON configuration file.  Built-in defaults are used when omitted.
    #[arg(short, long, env = "REEFMON_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        info!("No config file given, using built-in defaults");
        return Ok(MonitorConfig::default());
    };
    match JsonFileConfig::new(path).load() {
        Ok(c) => Ok(c),
        Err(ConfigError::NotFound) => {
            anyhow::bail!("config file {} not found", path.display())
        }
        Err(e) => Err(e).with_context(|| format!("loading {}", path.display())),
    }
}

fn build_store(config: &StoreConfig) -> Result<Box<dyn ReadingStore>> {
    Ok(match config {
        StoreConfig::Memory { history } => {
            warn!("Readings are kept in memory only, last {} rows", history);
            Box::new(MemoryStore::with_history(*history))
        }
        StoreConfig::Jsonl { path } => {
            Box::new(JsonlStore::open(path).with_context(|| format!("opening store {path}"))?)
        }
    })
}

fn build_notifier(config: &MonitorConfig) -> Result<Box<dyn Notifier>> {
    match &config.smtp {
        #[cfg(feature = "smtp")]
        Some(smtp) => Ok(Box::new(
            reefmon::adapters::smtp::SmtpNotifier::new(smtp).context("configuring SMTP")?,
        )),
        #[cfg(not(feature = "smtp"))]
        Some(_) => {
            warn!("SMTP configured but built without the `smtp` feature, logging alerts instead");
            Ok(Box::new(LogNotifier::new()))
        }
        None => Ok(Box::new(LogNotifier::new())),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("reefmon v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(args.config.as_ref())?;
    let interval = Duration::from_secs(u64::from(config.poll_interval_secs));

    // ── 3. Adapters ───────────────────────────────────────────
    let mut bus = LinuxI2cBus::open(config.bus)
        .with_context(|| format!("opening I2C bus {}", config.bus))?;
    let mut store = build_store(&config.store)?;
    let mut notifier = build_notifier(&config)?;
    let mut sink = LogEventSink::new();
    let clock = SystemClock;

    // ── 4. Service ────────────────────────────────────────────
    let mut monitor = Monitor::new(config, StdDelay, &clock).context("invalid configuration")?;
    monitor.start(&mut store, &mut sink);

    // ── 5. Outer loop ─────────────────────────────────────────
    loop {
        monitor.run_once(&mut bus, &clock, &mut store, &mut notifier, &mut sink);
        if args.once {
            break;
        }
        std::thread::sleep(interval);
    }

    bus.close();
    Ok(())
}
