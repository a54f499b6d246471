//! System configuration parameters
//!
//! All tunable parameters for the monitor: which probes exist, their
//! alert bounds, timing, and where notifications go.  Loaded from JSON by
//! [`JsonFileConfig`](crate::adapters::json_config::JsonFileConfig); the
//! defaults describe the stock reef tank setup.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::adapters::memory_store::DEFAULT_HISTORY;
use crate::alerts::{CooldownMode, Threshold};
use crate::app::ports::ConfigError;
use crate::poller::FALLBACK_REFERENCE_C;
use crate::probe::ProbeTiming;
use crate::registry::{ProbeDescriptor, ProbeKind, ProbeRegistry};

/// SMTP delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub receiver: String,
}

/// Where readings are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Keep the most recent `history` rows in memory only.
    Memory {
        #[serde(default = "default_history")]
        history: usize,
    },
    /// Append rows to a JSON-lines file.
    Jsonl { path: String },
}

fn default_history() -> usize {
    DEFAULT_HISTORY
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Bus ---
    /// I2C bus number (`/dev/i2c-<bus>`).
    pub bus: u8,

    // --- Probes ---
    /// Polling order matters.
    pub probes: ProbeRegistry,
    /// Settle delays per command class.
    pub timing: ProbeTiming,
    /// Compensation temperature when no reference probe is connected.
    pub fallback_reference_c: f64,

    // --- Alerts ---
    /// Checked in order.
    pub thresholds: Vec<Threshold>,
    /// Minimum time between repeated alerts (seconds).
    pub alert_cooldown_secs: u32,
    pub cooldown_mode: CooldownMode,

    // --- Timing ---
    /// Sleep between polling cycles (seconds).
    pub poll_interval_secs: u32,

    // --- Sinks ---
    pub store: StoreConfig,
    /// `None` logs alerts instead of mailing them.
    pub smtp: Option<SmtpConfig>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bus: 1,

            probes: ProbeRegistry::new(vec![
                ProbeDescriptor::new("Temp", ProbeKind::Temperature, 102, 2).reference(),
                ProbeDescriptor::new("pH", ProbeKind::Ph, 99, 2),
                ProbeDescriptor::new("ORP", ProbeKind::Orp, 98, 0).disconnected(),
                ProbeDescriptor::new("Salinity", ProbeKind::Conductivity, 100, 2),
            ])
            .unwrap_or_default(),
            timing: ProbeTiming::default(),
            fallback_reference_c: FALLBACK_REFERENCE_C,

            thresholds: vec![
                Threshold::new("Temp", 24.0, 28.0, "C"),
                Threshold::new("pH", 7.6, 8.8, " "),
                Threshold::new("Salinity", 30.0, 37.0, " ppt"),
            ],
            alert_cooldown_secs: 21_600, // 6 h
            cooldown_mode: CooldownMode::PerMetric,

            poll_interval_secs: 300, // 5 min

            store: StoreConfig::Memory {
                history: DEFAULT_HISTORY,
            },
            smtp: None,
        }
    }
}

impl MonitorConfig {
    /// Reject configurations the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probes.validate()?;
        if self.probes.connected().next().is_none() {
            return Err(ConfigError::ValidationFailed("no connected probes"));
        }
        for t in &self.thresholds {
            if t.min > t.max {
                return Err(ConfigError::ValidationFailed("threshold min exceeds max"));
            }
            if !t.min.is_finite() || !t.max.is_finite() {
                return Err(ConfigError::ValidationFailed("threshold bounds must be finite"));
            }
        }
        if matches!(self.store, StoreConfig::Memory { history: 0 }) {
            return Err(ConfigError::ValidationFailed("store.history must be > 0"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_secs must be > 0"));
        }
        if self.timing.long_ms < self.timing.short_ms {
            return Err(ConfigError::ValidationFailed(
                "timing.long_ms must be >= timing.short_ms",
            ));
        }
        if !self.fallback_reference_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "fallback_reference_c must be finite",
            ));
        }
        Ok(())
    }

    pub fn alert_cooldown(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.alert_cooldown_secs))
    }
}
