//! Application service: the hexagonal core.
//!
//! [`Monitor`] owns the probe client, the validated configuration and the
//! alert cooldown state.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  BusChannel ──▶ ┌────────────────────────┐ ──▶ ReadingStore
//!                 │        Monitor          │ ──▶ Notifier
//!       Clock ──▶ │  Poller · Alerts        │ ──▶ EventSink
//!                 └────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::alerts::{self, AlertCooldown, AlertEvent};
use crate::bus::BusChannel;
use crate::config::MonitorConfig;
use crate::poller::{CycleReport, Poller};
use crate::probe::ProbeClient;

use super::events::{CycleSummary, MonitorEvent, SinkKind};
use super::ports::{Clock, ConfigError, EventSink, Notifier, ReadingStore};

/// Result of one [`Monitor::run_once`] iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    pub report: CycleReport,
    /// Alerts handed to the notifier (delivered or not).
    pub alerts: Vec<AlertEvent>,
}

// ───────────────────────────────────────────────────────────────
// Monitor
// ───────────────────────────────────────────────────────────────

/// The monitor orchestrates polling, persistence and alerting.
pub struct Monitor<D> {
    config: MonitorConfig,
    poller: Poller,
    client: ProbeClient<D>,
    cooldown: AlertCooldown,
    cycle_count: u64,
}

impl<D: DelayNs> Monitor<D> {
    /// Validate the configuration and build the service.  All alert
    /// gates start open at `clock.now()`.
    pub fn new(config: MonitorConfig, delay: D, clock: &impl Clock) -> Result<Self, ConfigError> {
        config.validate()?;
        let cooldown =
            AlertCooldown::new(config.cooldown_mode, config.alert_cooldown(), clock.now());
        Ok(Self {
            poller: Poller::new(config.fallback_reference_c),
            client: ProbeClient::new(delay, config.timing),
            cooldown,
            config,
            cycle_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Sync the storage schema and announce startup.
    pub fn start(&mut self, store: &mut impl ReadingStore, sink: &mut impl EventSink) {
        self.prepare_schema(store, sink);
        let connected_probes = self.config.probes.connected().count();
        sink.emit(&MonitorEvent::Started { connected_probes });
        info!("Monitor started with {} connected probes", connected_probes);
    }

    /// Add a column for every connected probe and drop the columns of
    /// disconnected ones.  Failures are logged and skipped.
    pub fn prepare_schema(&self, store: &mut impl ReadingStore, sink: &mut impl EventSink) {
        for probe in self.config.probes.iter() {
            let result = if probe.connected {
                store.add_column(&probe.id)
            } else {
                store.drop_column(&probe.id)
            };
            match result {
                Ok(true) => sink.emit(&MonitorEvent::SchemaChanged {
                    column: probe.id.clone(),
                    added: probe.connected,
                }),
                Ok(false) => {}
                Err(e) => {
                    let detail = format!("schema '{}': {}", probe.id, e);
                    sink_failed(sink, SinkKind::Store, &detail);
                }
            }
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full iteration: poll → persist → read back → alert.
    /// Alerts are only evaluated against the row this cycle stored.
    ///
    /// Never fails: probe errors are recorded in the report, sink errors
    /// are logged and emitted as [`MonitorEvent::SinkFailed`].
    pub fn run_once(
        &mut self,
        bus: &mut impl BusChannel,
        clock: &impl Clock,
        store: &mut impl ReadingStore,
        notifier: &mut impl Notifier,
        sink: &mut impl EventSink,
    ) -> Iteration {
        self.cycle_count += 1;

        // 1. Poll every connected probe
        let started_at = clock.now();
        let report = self
            .poller
            .run_cycle(&mut self.client, bus, &self.config.probes, started_at);
        for f in &report.failures {
            sink.emit(&MonitorEvent::ProbeFailed {
                probe_id: f.probe_id.clone(),
                error: f.error.clone(),
            });
        }

        // 2. Persist
        let stored = match store.insert_row(started_at, &report.readings) {
            Ok(()) => true,
            Err(e) => {
                let detail = format!("insert: {}; alerts not evaluated", e);
                sink_failed(sink, SinkKind::Store, &detail);
                false
            }
        };

        // 3. Evaluate this cycle's row as read back from the store
        let raised = if stored {
            self.evaluate_latest(&*store, sink, started_at, clock.now())
        } else {
            Vec::new()
        };

        // 4. Deliver
        for alert in &raised {
            sink.emit(&MonitorEvent::AlertRaised(alert.clone()));
            if let Err(e) = notifier.notify(alert, &alert.message()) {
                sink_failed(sink, SinkKind::Notifier, &format!("{}: {}", alert.metric, e));
            }
        }

        sink.emit(&MonitorEvent::CycleCompleted(CycleSummary {
            cycle: self.cycle_count,
            readings: report.readings.len(),
            failures: report.failures.len(),
            alerts: raised.len(),
            reference_c: report.reference_temperature,
        }));

        Iteration {
            report,
            alerts: raised,
        }
    }

    fn evaluate_latest(
        &mut self,
        store: &impl ReadingStore,
        sink: &mut impl EventSink,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        match store.latest_row() {
            Ok(Some(row)) if row.timestamp == started_at => {
                alerts::evaluate(&row, &self.config.thresholds, &mut self.cooldown, now)
            }
            Ok(Some(row)) => {
                let detail = format!("read back: stale row from {}", row.timestamp);
                sink_failed(sink, SinkKind::Store, &detail);
                Vec::new()
            }
            Ok(None) => {
                warn!("No stored row to evaluate alerts against");
                Vec::new()
            }
            Err(e) => {
                sink_failed(sink, SinkKind::Store, &format!("read back: {}", e));
                Vec::new()
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn cooldown(&self) -> &AlertCooldown {
        &self.cooldown
    }

    /// Iterations executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}

fn sink_failed(sink: &mut impl EventSink, kind: SinkKind, detail: &str) {
    warn!("{:?} sink failed: {}", kind, detail);
    sink.emit(&MonitorEvent::SinkFailed {
        sink: kind,
        detail: detail.to_string(),
    });
}
