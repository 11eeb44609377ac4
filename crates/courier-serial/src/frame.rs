//! Frame layout and the raw codec.
//!
//! ```text
//! +------+------+-----+-----+-----------------+----------+
//! | 0x55 | 0xAA | LEN | CMD | PAYLOAD (LEN B) | CHECKSUM |
//! +------+------+-----+-----+-----------------+----------+
//! ```
//!
//! `CHECKSUM` is the wrapping byte sum of `LEN`, `CMD` and the payload.

use alloc::vec::Vec;

use crate::error::MalformedFrame;

/// Sync marker opening every frame.
pub const SYNC: [u8; 2] = [0x55, 0xAA];

/// Bytes before the payload: sync marker, length, command.
pub const HEADER_LEN: usize = 4;

/// Bytes after the payload.
pub const CHECKSUM_LEN: usize = 1;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// A decoded frame borrowing its payload from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialFrame<'a> {
    /// Command byte.
    pub command: u8,
    /// Payload bytes, without header or checksum.
    pub data_frame: &'a [u8],
}

impl<'a> SerialFrame<'a> {
    /// Construct a frame view.
    pub const fn new(command: u8, data_frame: &'a [u8]) -> Self {
        SerialFrame {
            command,
            data_frame,
        }
    }

    /// Encode this frame back into wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MalformedFrame> {
        encode(self.command, self.data_frame)
    }
}

fn checksum(command: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold((payload.len() as u8).wrapping_add(command), |acc, b| {
            acc.wrapping_add(*b)
        })
}

/// Decode one complete frame.
///
/// The buffer must hold exactly one frame; the payload is returned as a slice
/// of `raw`.
///
/// # Errors
///
/// Returns [`MalformedFrame`] when the buffer is shorter than the header plus
/// checksum, the sync marker is wrong, the length byte disagrees with the
/// buffer, or the checksum does not match.
pub fn decode(raw: &[u8]) -> Result<SerialFrame<'_>, MalformedFrame> {
    if raw.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(MalformedFrame::TooShort { len: raw.len() });
    }
    if raw[..2] != SYNC {
        return Err(MalformedFrame::BadSync {
            found: [raw[0], raw[1]],
        });
    }

    let declared = raw[2] as usize;
    let command = raw[3];
    let available = raw.len() - HEADER_LEN - CHECKSUM_LEN;
    if declared != available {
        return Err(MalformedFrame::LengthMismatch {
            declared,
            available,
        });
    }

    let data_frame = &raw[HEADER_LEN..HEADER_LEN + declared];
    let expected = checksum(command, data_frame);
    let found = raw[raw.len() - 1];
    if expected != found {
        return Err(MalformedFrame::BadChecksum { expected, found });
    }

    Ok(SerialFrame {
        command,
        data_frame,
    })
}

/// Encode a command and payload into wire bytes.
///
/// # Errors
///
/// Returns [`MalformedFrame::PayloadTooLong`] if the payload exceeds
/// [`MAX_PAYLOAD`] bytes.
pub fn encode(command: u8, payload: &[u8]) -> Result<Vec<u8>, MalformedFrame> {
    if payload.len() > MAX_PAYLOAD {
        return Err(MalformedFrame::PayloadTooLong { len: payload.len() });
    }

    let mut raw = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    raw.extend_from_slice(&SYNC);
    raw.push(payload.len() as u8);
    raw.push(command);
    raw.extend_from_slice(payload);
    raw.push(checksum(command, payload));
    Ok(raw)
}
