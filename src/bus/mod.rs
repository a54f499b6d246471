//! Bus channel: raw byte exchange with one addressable device on a
//! shared bus.
//!
//! The bus is stateful: the bound address persists across calls and is
//! shared by every probe.  Callers must re-bind before each exchange;
//! [`ProbeClient`](crate::probe::ProbeClient) always does.
//!
//! | Adapter        | Backend                                  |
//! |----------------|------------------------------------------|
//! | `LinuxI2cBus`  | `/dev/i2c-N` + `ioctl(I2C_SLAVE)`        |
//! | `HalBus`       | any `embedded_hal::i2c::I2c` controller  |

pub mod hal;
#[cfg(target_os = "linux")]
pub mod linux;

pub use hal::HalBus;
#[cfg(target_os = "linux")]
pub use linux::LinuxI2cBus;

use crate::error::BusError;

/// Highest valid 7-bit device address.
pub const MAX_ADDRESS: u8 = 0x7F;

/// Blocking byte-level access to the currently bound device.
///
/// Implementations are owned by a single thread and passed around by
/// `&mut`; they are never cloned.
pub trait BusChannel {
    /// Bind subsequent exchanges to `addr` (0–127).
    fn set_address(&mut self, addr: u8) -> Result<(), BusError>;

    /// Address currently bound, if any.
    fn address(&self) -> Option<u8>;

    /// Write `bytes` to the bound device as a single frame.
    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), BusError>;

    /// Read up to `buf.len()` bytes from the bound device.
    /// Returns the number of bytes read.
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, BusError>;
}

/// Reject addresses outside the 7-bit range before touching hardware.
pub fn check_address(addr: u8) -> Result<(), BusError> {
    if addr > MAX_ADDRESS {
        Err(BusError::InvalidAddress(addr))
    } else {
        Ok(())
    }
}
