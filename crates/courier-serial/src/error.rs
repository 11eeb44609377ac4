//! Error type for the serial codec.
//!
//! Every decoding failure is a malformed frame: the bytes are dropped by the
//! caller and nothing else happens.

use core::fmt;

/// Errors produced while decoding or encoding serial frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedFrame {
    /// The buffer is shorter than the fixed header plus checksum.
    TooShort {
        /// Number of bytes received.
        len: usize,
    },
    /// The first two bytes are not the sync marker.
    BadSync {
        /// The two bytes found where the sync marker was expected.
        found: [u8; 2],
    },
    /// The length byte disagrees with the number of payload bytes present.
    LengthMismatch {
        /// Payload length declared in the header.
        declared: usize,
        /// Payload bytes actually present in the buffer.
        available: usize,
    },
    /// The trailing checksum does not match the frame contents.
    BadChecksum {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte carried by the frame.
        found: u8,
    },
    /// A payload longer than the length byte can express was given to the encoder.
    PayloadTooLong {
        /// Length of the rejected payload.
        len: usize,
    },
    /// A typed message needs more payload bytes than the frame carries.
    ShortPayload {
        /// Command byte of the frame.
        command: u8,
        /// Minimum payload length for this command.
        expected: usize,
        /// Payload length received.
        found: usize,
    },
    /// A payload field holds a value outside its allowed range.
    InvalidValue {
        /// Command byte of the frame.
        command: u8,
        /// Name of the offending field.
        field: &'static str,
        /// The value received.
        value: u8,
    },
}

impl fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedFrame::TooShort { len } => {
                write!(f, "frame too short: {} bytes", len)
            }
            MalformedFrame::BadSync { found } => {
                write!(f, "bad sync bytes: {:02X} {:02X}", found[0], found[1])
            }
            MalformedFrame::LengthMismatch { declared, available } => write!(
                f,
                "length mismatch: header declares {} payload bytes, {} present",
                declared, available
            ),
            MalformedFrame::BadChecksum { expected, found } => write!(
                f,
                "bad checksum: computed {:02X}, frame carries {:02X}",
                expected, found
            ),
            MalformedFrame::PayloadTooLong { len } => {
                write!(f, "payload of {} bytes does not fit in one frame", len)
            }
            MalformedFrame::ShortPayload {
                command,
                expected,
                found,
            } => write!(
                f,
                "command {:02X} needs {} payload bytes, got {}",
                command, expected, found
            ),
            MalformedFrame::InvalidValue {
                command,
                field,
                value,
            } => write!(
                f,
                "command {:02X} carries invalid {} value {}",
                command, field, value
            ),
        }
    }
}

impl core::error::Error for MalformedFrame {}
