//! Host time adapters.
//!
//! - [`SystemClock`]: wall-clock [`Clock`] for reading timestamps and
//!   alert cooldowns.
//! - [`StdDelay`]: blocking [`DelayNs`] over `std::thread::sleep`, used
//!   for probe settle delays.

use std::time::Duration;

use chrono::{DateTime, Utc};
use embedded_hal::delay::DelayNs;

use crate::app::ports::Clock;

/// UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-sleeping delay provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
