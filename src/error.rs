//! Unified error types for the probe stack.
//!
//! Transport failures ([`BusError`]) are raised by the bus channel and
//! wrapped by the probe client into [`ProbeError`], which also carries the
//! protocol-level (status byte) and decode-level (non-numeric payload)
//! failures.  The poller records every `ProbeError` per probe and keeps
//! going, so all variants are cheap to clone and compare.

use core::fmt;
use std::io::ErrorKind;

// ---------------------------------------------------------------------------
// Bus (transport) errors
// ---------------------------------------------------------------------------

/// The bus operation that failed, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Open,
    SetAddress,
    Write,
    Read,
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::SetAddress => write!(f, "set address"),
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Transport failure on the shared bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// An OS-level I/O call failed (device absent, permission denied,
    /// bus busy, ...).
    Io { op: BusOp, kind: ErrorKind },
    /// The device NAKed or the HAL reported a bus fault.
    Hal { op: BusOp, detail: String },
    /// Address outside the 7-bit range.
    InvalidAddress(u8),
    /// A write or read was attempted before any address was bound.
    NoAddress,
    /// The device returned zero bytes.
    ShortRead,
}

impl BusError {
    pub fn io(op: BusOp, err: &std::io::Error) -> Self {
        Self::Io {
            op,
            kind: err.kind(),
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { op, kind } => write!(f, "bus {op} failed: {kind}"),
            Self::Hal { op, detail } => write!(f, "bus {op} failed: {detail}"),
            Self::InvalidAddress(addr) => write!(f, "invalid bus address {addr} (must be 0-127)"),
            Self::NoAddress => write!(f, "no device address bound"),
            Self::ShortRead => write!(f, "device returned an empty frame"),
        }
    }
}

impl std::error::Error for BusError {}

// ---------------------------------------------------------------------------
// Probe errors
// ---------------------------------------------------------------------------

/// Every failure a single probe exchange can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The bus exchange itself failed.
    Transport(BusError),
    /// The probe answered with a non-success status byte.
    Protocol { status: u8 },
    /// The probe answered successfully but the payload is not a number.
    Decode { text: String },
    /// A value was requested from a command that puts the probe to sleep.
    Sleeping,
}

impl ProbeError {
    /// Transport errors abort the whole exchange; the rest are answers
    /// the probe actually gave.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Protocol { status } => {
                write!(f, "protocol: status {status} ({})", status_name(*status))
            }
            Self::Decode { text } => write!(f, "decode: non-numeric payload {text:?}"),
            Self::Sleeping => write!(f, "probe is sleeping"),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BusError> for ProbeError {
    fn from(e: BusError) -> Self {
        Self::Transport(e)
    }
}

/// Human-readable name of an EZO status byte.
pub fn status_name(status: u8) -> &'static str {
    match status {
        crate::probe::frame::STATUS_SUCCESS => "success",
        crate::probe::frame::STATUS_SYNTAX_ERROR => "syntax error",
        crate::probe::frame::STATUS_PENDING => "still processing",
        crate::probe::frame::STATUS_NO_DATA => "no data",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Probe-level `Result` alias.
pub type Result<T> = core::result::Result<T, ProbeError>;
