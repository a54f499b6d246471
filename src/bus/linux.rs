//! Linux `i2c-dev` bus channel.
//!
//! Opens `/dev/i2c-<bus>` once for read/write and re-targets it with the
//! `I2C_SLAVE` ioctl.  Plain `read(2)`/`write(2)` on the file descriptor
//! then talk to the bound device.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::PathBuf;

use log::{debug, info};

use super::{BusChannel, check_address};
use crate::error::{BusError, BusOp};

/// `I2C_SLAVE` from `<linux/i2c-dev.h>`.
const I2C_SLAVE: libc::c_ulong = 0x0703;

/// Bus channel backed by a Linux I2C character device.
pub struct LinuxI2cBus {
    file: File,
    path: PathBuf,
    addr: Option<u8>,
}

impl LinuxI2cBus {
    /// Open exclusive access to `/dev/i2c-<bus>`.
    pub fn open(bus: u8) -> Result<Self, BusError> {
        let path = PathBuf::from(format!("/dev/i2c-{bus}"));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| BusError::io(BusOp::Open, &e))?;
        info!("LinuxI2cBus: opened {}", path.display());
        Ok(Self {
            file,
            path,
            addr: None,
        })
    }

    /// Release the bus.  Dropping the channel has the same effect.
    pub fn close(self) {
        info!("LinuxI2cBus: closed {}", self.path.display());
    }
}

impl BusChannel for LinuxI2cBus {
    fn set_address(&mut self, addr: u8) -> Result<(), BusError> {
        check_address(addr)?;
        // SAFETY: the fd is owned by `self.file` and open for the whole
        // call; I2C_SLAVE takes the address by value.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(addr),
            )
        };
        if ret < 0 {
            return Err(BusError::io(
                BusOp::SetAddress,
                &std::io::Error::last_os_error(),
            ));
        }
        if self.addr != Some(addr) {
            debug!("LinuxI2cBus: bound to 0x{:02X}", addr);
        }
        self.addr = Some(addr);
        Ok(())
    }

    fn address(&self) -> Option<u8> {
        self.addr
    }

    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        if self.addr.is_none() {
            return Err(BusError::NoAddress);
        }
        self.file
            .write_all(bytes)
            .map_err(|e| BusError::io(BusOp::Write, &e))
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, BusError> {
        if self.addr.is_none() {
            return Err(BusError::NoAddress);
        }
        self.file
            .read(buf)
            .map_err(|e| BusError::io(BusOp::Read, &e))
    }
}
