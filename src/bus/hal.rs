//! Bus channel over an `embedded-hal` I2C controller.
//!
//! `embedded_hal::i2c::I2c` is address-per-transaction, so the "bound"
//! address lives here and is passed on every write/read.

use embedded_hal::i2c::I2c;
use log::debug;

use super::{BusChannel, check_address};
use crate::error::{BusError, BusOp};

/// Adapts any blocking I2C controller to [`BusChannel`].
pub struct HalBus<I> {
    i2c: I,
    addr: Option<u8>,
}

impl<I: I2c> HalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c, addr: None }
    }

    /// Release the underlying controller.
    pub fn release(self) -> I {
        self.i2c
    }

    fn bound(&self) -> Result<u8, BusError> {
        self.addr.ok_or(BusError::NoAddress)
    }
}

fn hal_err<E: embedded_hal::i2c::Error>(op: BusOp, e: &E) -> BusError {
    BusError::Hal {
        op,
        detail: format!("{:?}", e.kind()),
    }
}

impl<I: I2c> BusChannel for HalBus<I> {
    fn set_address(&mut self, addr: u8) -> Result<(), BusError> {
        check_address(addr)?;
        if self.addr != Some(addr) {
            debug!("HalBus: bound to 0x{:02X}", addr);
        }
        self.addr = Some(addr);
        Ok(())
    }

    fn address(&self) -> Option<u8> {
        self.addr
    }

    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        let addr = self.bound()?;
        self.i2c
            .write(addr, bytes)
            .map_err(|e| hal_err(BusOp::Write, &e))
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, BusError> {
        let addr = self.bound()?;
        self.i2c
            .read(addr, buf)
            .map_err(|e| hal_err(BusOp::Read, &e))?;
        Ok(buf.len())
    }
}
