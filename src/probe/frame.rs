//! EZO wire codec.
//!
//! Outbound:
//! ```text
//! ┌──────────────────────┬──────┐
//! │ ASCII command (N B)  │ 0x00 │
//! └──────────────────────┴──────┘
//! ```
//!
//! Inbound (fixed 31 bytes):
//! ```text
//! ┌────────────┬──────────────────────────────────────────┐
//! │ Status (1B)│ Payload (30 B, bit 7 set, 0x00 padded)   │
//! └────────────┴──────────────────────────────────────────┘
//! ```
//!
//! The payload bytes arrive with bit 7 set on some hosts (a known i2c-dev
//! quirk on the Raspberry Pi).  Masking it off recovers the ASCII text.

use crate::error::ProbeError;

/// Size of every response frame.
pub const RESPONSE_LEN: usize = 31;

pub const STATUS_SUCCESS: u8 = 1;
pub const STATUS_SYNTAX_ERROR: u8 = 2;
pub const STATUS_PENDING: u8 = 254;
pub const STATUS_NO_DATA: u8 = 255;

/// A response frame split into status and payload, before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawResponse<'a> {
    pub status: u8,
    pub payload: &'a [u8],
}

impl<'a> RawResponse<'a> {
    /// Split a frame.  Returns `None` for an empty frame.
    pub fn parse(frame: &'a [u8]) -> Option<Self> {
        let (&status, payload) = frame.split_first()?;
        Some(Self { status, payload })
    }

    /// Decode into text, or the protocol error carried by the status byte.
    pub fn decode(&self) -> Result<String, ProbeError> {
        if self.status != STATUS_SUCCESS {
            return Err(ProbeError::Protocol {
                status: self.status,
            });
        }
        Ok(decode_payload(self.payload))
    }
}

/// Append the terminating NUL to a command.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(command.len() + 1);
    frame.extend_from_slice(command.as_bytes());
    frame.push(0);
    frame
}

/// Mask bit 7 of every byte and cut at the first NUL.
pub fn decode_payload(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|b| b & 0x7F)
        .take_while(|&b| b != 0)
        .map(char::from)
        .collect()
}
