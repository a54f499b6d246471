//! Probe client: the EZO command/response protocol on a [`BusChannel`].
//!
//! One exchange:
//!
//! 1. bind the bus to the probe's address
//! 2. write the command plus a NUL terminator
//! 3. wait the command's settle delay (or return at once for `Sleep`)
//! 4. read a fixed 31-byte frame and decode it
//!
//! The delay is injected as an [`embedded_hal::delay::DelayNs`] so tests
//! can observe it without sleeping.

pub mod command;
pub mod frame;

use embedded_hal::delay::DelayNs;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bus::BusChannel;
use crate::error::{BusError, ProbeError, Result};
use crate::registry::ProbeDescriptor;
use command::{Command, Settle};
use frame::{RESPONSE_LEN, RawResponse};

/// Settle delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTiming {
    /// Readings and calibrations.
    pub long_ms: u32,
    /// All other commands.
    pub short_ms: u32,
}

impl Default for ProbeTiming {
    fn default() -> Self {
        Self {
            long_ms: 1500,
            short_ms: 500,
        }
    }
}

impl ProbeTiming {
    pub fn delay_ms(&self, settle: Settle) -> Option<u32> {
        match settle {
            Settle::Long => Some(self.long_ms),
            Settle::Short => Some(self.short_ms),
            Settle::NoResponse => None,
        }
    }
}

/// Decoded answer to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Text(String),
    /// The command put the probe to sleep; nothing was read.
    Sleeping,
}

/// Speaks the EZO protocol.  Owns the settle-delay provider; the bus is
/// borrowed per call so one bus serves every probe.
pub struct ProbeClient<D> {
    delay: D,
    timing: ProbeTiming,
}

impl<D: DelayNs> ProbeClient<D> {
    pub fn new(delay: D, timing: ProbeTiming) -> Self {
        Self { delay, timing }
    }

    /// Release the delay provider.
    pub fn into_delay(self) -> D {
        self.delay
    }

    /// Send `command` to `probe` and decode its answer.
    pub fn query(
        &mut self,
        bus: &mut impl BusChannel,
        probe: &ProbeDescriptor,
        command: &Command,
    ) -> Result<Response> {
        self.query_raw(bus, probe.bus_address, &command.to_string())
    }

    /// Send free-form command text to the device at `addr`.
    pub fn query_raw(
        &mut self,
        bus: &mut impl BusChannel,
        addr: u8,
        command: &str,
    ) -> Result<Response> {
        bus.set_address(addr)?;
        bus.write_frame(&frame::encode_command(command))?;
        trace!("probe 0x{:02X} <- {:?}", addr, command);

        let Some(wait_ms) = self.timing.delay_ms(Settle::classify(command)) else {
            debug!("probe 0x{:02X}: {:?} puts it to sleep, not reading", addr, command);
            return Ok(Response::Sleeping);
        };
        self.delay.delay_ms(wait_ms);

        let mut buf = [0u8; RESPONSE_LEN];
        let n = bus.read_frame(&mut buf)?;
        let raw = RawResponse::parse(&buf[..n]).ok_or(BusError::ShortRead)?;
        let text = raw.decode()?;
        trace!("probe 0x{:02X} -> {:?}", addr, text);
        Ok(Response::Text(text))
    }

    /// Take a reading and parse it as a number.
    pub fn read_value(
        &mut self,
        bus: &mut impl BusChannel,
        probe: &ProbeDescriptor,
    ) -> Result<f64> {
        match self.query(bus, probe, &Command::Read)? {
            Response::Text(text) => parse_value(&text),
            Response::Sleeping => Err(ProbeError::Sleeping),
        }
    }

    /// Tell the probe the liquid temperature.  The answer carries no data.
    pub fn compensate(
        &mut self,
        bus: &mut impl BusChannel,
        probe: &ProbeDescriptor,
        temperature_c: f64,
    ) -> Result<()> {
        self.query(bus, probe, &Command::Compensate(temperature_c))
            .map(|_| ())
    }
}

/// Parse a reading payload.  Non-finite values count as non-numeric.
pub fn parse_value(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProbeError::Decode {
            text: text.to_string(),
        })
}
