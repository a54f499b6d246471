//! Polling orchestrator: one full sampling cycle over the registry.
//!
//! ```text
//!  pass 1: Temperature probes ── R ──▶ reading (reference updates ref_temp)
//!  pass 2: other probes ── T,<ref_temp> ──▶ R ──▶ reading
//! ```
//!
//! Each compensation write is immediately followed by the read of the
//! same probe: the bus is shared and a probe only holds the latest
//! compensation value.  A failing probe is logged, recorded in the
//! report and skipped; the rest of the cycle continues.

use chrono::{DateTime, Utc};
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::bus::BusChannel;
use crate::error::ProbeError;
use crate::probe::ProbeClient;
use crate::reading::{Reading, ReadingSet, round_to};
use crate::registry::{ProbeDescriptor, ProbeRegistry};

/// Compensation temperature used when no reference probe answered.
pub const FALLBACK_REFERENCE_C: f64 = 25.0;

/// A probe that produced no reading this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeFailure {
    pub probe_id: String,
    pub error: ProbeError,
}

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Readings in registry order.
    pub readings: ReadingSet,
    pub failures: Vec<ProbeFailure>,
    /// Value sent in every `T,` command this cycle.
    pub reference_temperature: f64,
}

/// Runs sampling cycles.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    fallback_reference_c: f64,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(FALLBACK_REFERENCE_C)
    }
}

impl Poller {
    pub fn new(fallback_reference_c: f64) -> Self {
        Self {
            fallback_reference_c,
        }
    }

    /// Poll every connected probe once.
    pub fn run_cycle<D: DelayNs>(
        &self,
        client: &mut ProbeClient<D>,
        bus: &mut impl BusChannel,
        registry: &ProbeRegistry,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let mut readings = ReadingSet::new();
        let mut failures = Vec::new();
        let mut reference = self.fallback_reference_c;
        let mut measured = false;

        for probe in registry.connected().filter(|p| p.is_temperature()) {
            match read_rounded(client, bus, probe) {
                Ok(value) => {
                    if probe.is_reference {
                        reference = value;
                        measured = true;
                    }
                    readings.push(reading(probe, value, now));
                }
                Err(e) => record(&mut failures, probe, e),
            }
        }

        if measured {
            debug!("Poller: compensating at measured {} C", reference);
        } else {
            debug!("Poller: no reference reading, compensating at {} C", reference);
        }

        for probe in registry.connected().filter(|p| !p.is_temperature()) {
            if let Err(e) = client.compensate(bus, probe, reference) {
                if e.is_transport() {
                    record(&mut failures, probe, e);
                    continue;
                }
                warn!("Poller: '{}' rejected compensation: {}", probe.id, e);
            }
            match read_rounded(client, bus, probe) {
                Ok(value) => readings.push(reading(probe, value, now)),
                Err(e) => record(&mut failures, probe, e),
            }
        }

        readings.sort_by_key(|r| registry.position(&r.probe_id).unwrap_or(usize::MAX));
        info!(
            "Poller: cycle done, {} readings, {} failures",
            readings.len(),
            failures.len()
        );

        CycleReport {
            readings,
            failures,
            reference_temperature: reference,
        }
    }
}

fn read_rounded<D: DelayNs>(
    client: &mut ProbeClient<D>,
    bus: &mut impl BusChannel,
    probe: &ProbeDescriptor,
) -> Result<f64, ProbeError> {
    let raw = client.read_value(bus, probe)?;
    Ok(round_to(raw, probe.rounding_digits))
}

fn reading(probe: &ProbeDescriptor, value: f64, now: DateTime<Utc>) -> Reading {
    Reading {
        probe_id: probe.id.clone(),
        value,
        timestamp: now,
    }
}

fn record(failures: &mut Vec<ProbeFailure>, probe: &ProbeDescriptor, error: ProbeError) {
    warn!(
        "Poller: '{}' at 0x{:02X} skipped: {}",
        probe.id, probe.bus_address, error
    );
    failures.push(ProbeFailure {
        probe_id: probe.id.clone(),
        error,
    });
}
