//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured monitor events through
//! the `log` facade (stderr via `env_logger` in the daemon).

use log::{info, warn};

use crate::app::events::MonitorEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`MonitorEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Started { connected_probes } => {
                info!("START | connected_probes={}", connected_probes);
            }
            MonitorEvent::SchemaChanged { column, added } => {
                info!(
                    "SCHEMA | {} column '{}'",
                    if *added { "added" } else { "dropped" },
                    column
                );
            }
            MonitorEvent::ProbeFailed { probe_id, error } => {
                warn!("PROBE | '{}' failed: {}", probe_id, error);
            }
            MonitorEvent::CycleCompleted(s) => {
                info!(
                    "CYCLE | #{} | readings={} failures={} alerts={} | T_ref={:.2}\u{00b0}C",
                    s.cycle, s.readings, s.failures, s.alerts, s.reference_c,
                );
            }
            MonitorEvent::AlertRaised(a) => {
                warn!("ALERT | {} = {}{}", a.metric, a.value, a.unit);
            }
            MonitorEvent::SinkFailed { sink, detail } => {
                warn!("SINK | {:?}: {}", sink, detail);
            }
        }
    }
}
