//! Integration tests for the polling cycle against a simulated bus.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use reefmon::error::ProbeError;
use reefmon::poller::{CycleReport, FALLBACK_REFERENCE_C, Poller};
use reefmon::probe::{ProbeClient, ProbeTiming};
use reefmon::registry::{ProbeDescriptor, ProbeKind, ProbeRegistry};

use super::mock_bus::{
    LoggedDelay, ORP, Op, OpLog, PH, SAL, SimBus, SimProbe, TEMP, reef_bus,
};

fn reef_registry() -> ProbeRegistry {
    ProbeRegistry::new(vec![
        ProbeDescriptor::new("Temp", ProbeKind::Temperature, TEMP, 2).reference(),
        ProbeDescriptor::new("pH", ProbeKind::Ph, PH, 2),
        ProbeDescriptor::new("ORP", ProbeKind::Orp, ORP, 0).disconnected(),
        ProbeDescriptor::new("Salinity", ProbeKind::Conductivity, SAL, 2),
    ])
    .unwrap()
}

fn client(log: &OpLog) -> ProbeClient<LoggedDelay> {
    ProbeClient::new(LoggedDelay(log.clone()), ProbeTiming::default())
}

fn run(log: &OpLog, bus: &mut SimBus, registry: &ProbeRegistry) -> CycleReport {
    Poller::default().run_cycle(&mut client(log), bus, registry, Utc::now())
}

fn new_log() -> OpLog {
    Rc::new(RefCell::new(Vec::new()))
}

#[test]
fn full_cycle_reads_every_connected_probe_in_registry_order() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    let report = run(&log, &mut bus, &reef_registry());

    let ids: Vec<_> = report.readings.iter().map(|r| r.probe_id.as_str()).collect();
    assert_eq!(ids, ["Temp", "pH", "Salinity"]);
    assert_eq!(report.readings.get("Temp"), Some(26.37));
    assert_eq!(report.readings.get("pH"), Some(8.12));
    assert!(report.failures.is_empty());
}

#[test]
fn reference_probe_compensates_others() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    let report = run(&log, &mut bus, &reef_registry());

    assert!((report.reference_temperature - 26.37).abs() < 1e-9);
    assert_eq!(bus.probe(PH).compensation.as_deref(), Some("26.37"));
    assert_eq!(bus.probe(SAL).compensation.as_deref(), Some("26.37"));
    assert_eq!(bus.probe(TEMP).compensation, None);
}

#[test]
fn disconnected_reference_falls_back_to_25() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    let registry = ProbeRegistry::new(vec![
        ProbeDescriptor::new("Temp", ProbeKind::Temperature, TEMP, 2)
            .reference()
            .disconnected(),
        ProbeDescriptor::new("pH", ProbeKind::Ph, PH, 2),
        ProbeDescriptor::new("Salinity", ProbeKind::Conductivity, SAL, 2),
    ])
    .unwrap();

    let report = run(&log, &mut bus, &registry);

    assert!((report.reference_temperature - FALLBACK_REFERENCE_C).abs() < 1e-9);
    assert_eq!(bus.probe(PH).compensation.as_deref(), Some("25"));
    assert_eq!(bus.probe(SAL).compensation.as_deref(), Some("25"));
    assert!(!bus.ops().contains(&Op::Bind(TEMP)));
}

#[test]
fn failed_reference_read_keeps_fallback() {
    let log = new_log();
    let mut bus = reef_bus(&log).with(TEMP, SimProbe::failing(255));
    let report = run(&log, &mut bus, &reef_registry());

    assert!((report.reference_temperature - FALLBACK_REFERENCE_C).abs() < 1e-9);
    assert_eq!(bus.probe(PH).compensation.as_deref(), Some("25"));
}

#[test]
fn compensation_immediately_precedes_read() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    run(&log, &mut bus, &reef_registry());

    let ops = bus.ops();
    for addr in [PH, SAL] {
        let start = ops
            .iter()
            .position(|op| matches!(op, Op::Write(a, c) if *a == addr && c.starts_with("T,")))
            .unwrap();
        assert_eq!(
            &ops[start..start + 7],
            &[
                Op::Write(addr, "T,26.37".into()),
                Op::Wait(500),
                Op::Read(addr),
                Op::Bind(addr),
                Op::Write(addr, "R".into()),
                Op::Wait(1500),
                Op::Read(addr),
            ]
        );
        assert_eq!(ops[start - 1], Op::Bind(addr));
    }
}

#[test]
fn every_exchange_rebinds_the_address() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    run(&log, &mut bus, &reef_registry());

    let ops = bus.ops();
    for (i, op) in ops.iter().enumerate() {
        if let Op::Write(addr, _) = op {
            assert_eq!(ops[i - 1], Op::Bind(*addr), "write at {i} not preceded by bind");
        }
    }
}

#[test]
fn one_probe_protocol_error_does_not_stop_the_cycle() {
    let log = new_log();
    let mut bus = reef_bus(&log).with(PH, SimProbe::failing(2));
    let report = run(&log, &mut bus, &reef_registry());

    let ids: Vec<_> = report.readings.iter().map(|r| r.probe_id.as_str()).collect();
    assert_eq!(ids, ["Temp", "Salinity"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].probe_id, "pH");
    assert_eq!(report.failures[0].error, ProbeError::Protocol { status: 2 });
}

#[test]
fn absent_device_is_a_transport_failure() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    bus.probes.remove(&SAL);
    let report = run(&log, &mut bus, &reef_registry());

    assert_eq!(report.readings.len(), 2);
    assert!(report.failures[0].error.is_transport());
    // No read is attempted after the compensation write failed.
    assert!(!bus.ops().contains(&Op::Read(SAL)));
}

#[test]
fn rejected_compensation_still_reads() {
    let log = new_log();
    let mut probe = SimProbe::reading("8.12");
    probe.compensation_status = 2;
    let mut bus = reef_bus(&log).with(PH, probe);
    let report = run(&log, &mut bus, &reef_registry());

    assert_eq!(report.readings.get("pH"), Some(8.12));
    assert!(report.failures.is_empty());
}

#[test]
fn non_numeric_reading_is_decode_failure() {
    let log = new_log();
    let mut bus = reef_bus(&log).with(SAL, SimProbe::reading("*ER"));
    let report = run(&log, &mut bus, &reef_registry());

    assert_eq!(
        report.failures[0].error,
        ProbeError::Decode {
            text: "*ER".into()
        }
    );
    assert_eq!(report.readings.get("Salinity"), None);
}

#[test]
fn readings_are_rounded_to_probe_precision() {
    let log = new_log();
    let mut bus = reef_bus(&log)
        .with(TEMP, SimProbe::reading("26.3749"))
        .with(ORP, SimProbe::reading("391.6"));
    let registry = ProbeRegistry::new(vec![
        ProbeDescriptor::new("Temp", ProbeKind::Temperature, TEMP, 2).reference(),
        ProbeDescriptor::new("ORP", ProbeKind::Orp, ORP, 0),
    ])
    .unwrap();

    let report = run(&log, &mut bus, &registry);

    assert_eq!(report.readings.get("Temp"), Some(26.37));
    assert_eq!(report.readings.get("ORP"), Some(392.0));
    assert_eq!(bus.probe(ORP).compensation.as_deref(), Some("26.37"));
}

#[test]
fn temperature_listed_after_others_still_compensates_them() {
    let log = new_log();
    let mut bus = reef_bus(&log);
    let registry = ProbeRegistry::new(vec![
        ProbeDescriptor::new("pH", ProbeKind::Ph, PH, 2),
        ProbeDescriptor::new("Temp", ProbeKind::Temperature, TEMP, 2).reference(),
    ])
    .unwrap();

    let report = run(&log, &mut bus, &registry);

    let ids: Vec<_> = report.readings.iter().map(|r| r.probe_id.as_str()).collect();
    assert_eq!(ids, ["pH", "Temp"]);
    assert_eq!(bus.probe(PH).compensation.as_deref(), Some("26.37"));
}
