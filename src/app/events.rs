//! Outbound application events.
//!
//! The [`Monitor`](super::service::Monitor) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, export, etc.

use crate::alerts::AlertEvent;
use crate::error::ProbeError;

/// Which sink a [`MonitorEvent::SinkFailed`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Store,
    Notifier,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The monitor has started; carries the number of connected probes.
    Started { connected_probes: usize },

    /// A storage column was created or dropped during schema sync.
    SchemaChanged { column: String, added: bool },

    /// A probe produced no reading this cycle.
    ProbeFailed { probe_id: String, error: ProbeError },

    /// A polling cycle finished.
    CycleCompleted(CycleSummary),

    /// An alert was handed to the notifier.
    AlertRaised(AlertEvent),

    /// A sink operation failed; the loop carries on.
    SinkFailed { sink: SinkKind, detail: String },
}

/// Per-cycle counters suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub readings: usize,
    pub failures: usize,
    pub alerts: usize,
    pub reference_c: f64,
}
