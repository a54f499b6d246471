//! Simulated probe bus and mock ports for integration tests.
//!
//! Records every bus operation (and every settle delay) in one shared
//! log so tests can assert on exact exchange order without touching real
//! I2C hardware.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use embedded_hal::delay::DelayNs;

use reefmon::adapters::memory_store::MemoryStore;
use reefmon::alerts::AlertEvent;
use reefmon::app::events::MonitorEvent;
use reefmon::app::ports::{Clock, EventSink, Notifier, NotifyError, ReadingStore, StoreError};
use reefmon::bus::BusChannel;
use reefmon::error::{BusError, BusOp};
use reefmon::probe::frame::RESPONSE_LEN;
use reefmon::reading::{ReadingSet, StoredRow};

// ── Operation record ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Bind(u8),
    Write(u8, String),
    Read(u8),
    Wait(u32),
}

pub type OpLog = Rc<RefCell<Vec<Op>>>;

// ── Simulated probe ───────────────────────────────────────────

/// What a simulated probe answers to `R`.
#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Status(u8),
}

#[derive(Debug, Clone)]
pub struct SimProbe {
    pub reading: Answer,
    /// Status answered to `T,` commands.
    pub compensation_status: u8,
    /// Last `T,` value received.
    pub compensation: Option<String>,
    last_command: String,
}

impl SimProbe {
    pub fn reading(text: &str) -> Self {
        Self {
            reading: Answer::Text(text.to_string()),
            compensation_status: 1,
            compensation: None,
            last_command: String::new(),
        }
    }

    pub fn failing(status: u8) -> Self {
        Self {
            reading: Answer::Status(status),
            ..Self::reading("")
        }
    }

    fn frame(&self) -> [u8; RESPONSE_LEN] {
        let mut buf = [0u8; RESPONSE_LEN];
        let (status, text) = if self.last_command.starts_with("T,") {
            (self.compensation_status, "")
        } else {
            match &self.reading {
                Answer::Text(t) => (1, t.as_str()),
                Answer::Status(s) => (*s, ""),
            }
        };
        buf[0] = status;
        for (i, b) in text.bytes().take(RESPONSE_LEN - 1).enumerate() {
            // Set bit 7 like the Pi's i2c-dev does.
            buf[i + 1] = b | 0x80;
        }
        buf
    }
}

// ── SimBus ────────────────────────────────────────────────────

pub struct SimBus {
    pub probes: HashMap<u8, SimProbe>,
    pub log: OpLog,
    addr: Option<u8>,
}

#[allow(dead_code)]
impl SimBus {
    pub fn new(log: OpLog) -> Self {
        Self {
            probes: HashMap::new(),
            log,
            addr: None,
        }
    }

    pub fn with(mut self, addr: u8, probe: SimProbe) -> Self {
        self.probes.insert(addr, probe);
        self
    }

    pub fn probe(&self, addr: u8) -> &SimProbe {
        &self.probes[&addr]
    }

    pub fn ops(&self) -> Vec<Op> {
        self.log.borrow().clone()
    }
}

impl BusChannel for SimBus {
    fn set_address(&mut self, addr: u8) -> Result<(), BusError> {
        reefmon::bus::check_address(addr)?;
        self.addr = Some(addr);
        self.log.borrow_mut().push(Op::Bind(addr));
        Ok(())
    }

    fn address(&self) -> Option<u8> {
        self.addr
    }

    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        let addr = self.addr.ok_or(BusError::NoAddress)?;
        let probe = self.probes.get_mut(&addr).ok_or(BusError::Io {
            op: BusOp::Write,
            kind: ErrorKind::NotFound,
        })?;
        assert_eq!(bytes.last(), Some(&0), "command must be NUL-terminated");
        let text = String::from_utf8(bytes[..bytes.len() - 1].to_vec()).unwrap();
        if let Some(t) = text.strip_prefix("T,") {
            probe.compensation = Some(t.to_string());
        }
        probe.last_command = text.clone();
        self.log.borrow_mut().push(Op::Write(addr, text));
        Ok(())
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, BusError> {
        let addr = self.addr.ok_or(BusError::NoAddress)?;
        let probe = self.probes.get(&addr).ok_or(BusError::Io {
            op: BusOp::Read,
            kind: ErrorKind::NotFound,
        })?;
        let frame = probe.frame();
        let n = buf.len().min(frame.len());
        buf[..n].copy_from_slice(&frame[..n]);
        self.log.borrow_mut().push(Op::Read(addr));
        Ok(n)
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Logs waits into the shared op log instead of sleeping.
pub struct LoggedDelay(pub OpLog);

impl DelayNs for LoggedDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(Op::Wait(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Op::Wait(ms));
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct ManualClock(Cell<DateTime<Utc>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self(Cell::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
    }

    pub fn advance(&self, by: TimeDelta) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

// ── Sinks ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Vec<(AlertEvent, String)>,
    pub fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, event: &AlertEvent, message: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("relay refused".into()));
        }
        self.sent.push((event.clone(), message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct VecSink {
    pub events: Vec<MonitorEvent>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &MonitorEvent) {
        self.events.push(event.clone());
    }
}

/// Store whose writes and reads always fail.
pub struct BrokenStore;

impl ReadingStore for BrokenStore {
    fn add_column(&mut self, _name: &str) -> Result<bool, StoreError> {
        Err(StoreError::IoError("disk gone".into()))
    }
    fn drop_column(&mut self, _name: &str) -> Result<bool, StoreError> {
        Err(StoreError::IoError("disk gone".into()))
    }
    fn insert_row(&mut self, _t: DateTime<Utc>, _r: &ReadingSet) -> Result<(), StoreError> {
        Err(StoreError::IoError("disk gone".into()))
    }
    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError> {
        Err(StoreError::IoError("disk gone".into()))
    }
}

/// Memory store whose inserts can be made to fail, or to be silently
/// lost, on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_inserts: bool,
    pub lose_inserts: bool,
}

impl ReadingStore for FlakyStore {
    fn add_column(&mut self, name: &str) -> Result<bool, StoreError> {
        self.inner.add_column(name)
    }
    fn drop_column(&mut self, name: &str) -> Result<bool, StoreError> {
        self.inner.drop_column(name)
    }
    fn insert_row(&mut self, t: DateTime<Utc>, r: &ReadingSet) -> Result<(), StoreError> {
        if self.fail_inserts {
            return Err(StoreError::IoError("disk full".into()));
        }
        if self.lose_inserts {
            return Ok(());
        }
        self.inner.insert_row(t, r)
    }
    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError> {
        self.inner.latest_row()
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub const TEMP: u8 = 102;
pub const PH: u8 = 99;
pub const ORP: u8 = 98;
pub const SAL: u8 = 100;

/// Stock reef bus: Temp 26.37, pH 8.12, Salinity 35.04.
pub fn reef_bus(log: &OpLog) -> SimBus {
    SimBus::new(log.clone())
        .with(TEMP, SimProbe::reading("26.37"))
        .with(PH, SimProbe::reading("8.12"))
        .with(SAL, SimProbe::reading("35.04"))
}
