//! Typed payloads carried by serial frames.

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::{CMD_LCD_TEXT, CMD_TRAY_LIGHT, RESP_TRAY_BACK_BUTTON, RESP_TRAY_SENSOR};
use crate::error::MalformedFrame;
use crate::frame::SerialFrame;

/// Size of the LCD text slot in bytes.
pub const LCD_TEXT_SLOT: usize = 32;

/// An RGB colour for a tray light.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Light off.
    pub const OFF: Rgb = Rgb::new(0x00, 0x00, 0x00);
    /// Colour of a tray that has a destination bound to it.
    pub const BOUND: Rgb = Rgb::new(0x20, 0xD1, 0x99);

    /// Construct a colour.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Whether every channel is zero.
    pub const fn is_off(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

fn require(frame: &SerialFrame<'_>, expected: usize) -> Result<(), MalformedFrame> {
    if frame.data_frame.len() < expected {
        return Err(MalformedFrame::ShortPayload {
            command: frame.command,
            expected,
            found: frame.data_frame.len(),
        });
    }
    Ok(())
}

/// `CMD_TRAY_LIGHT` payload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayLight {
    /// Wire index of the tray.
    pub tray_index: u8,
    /// Colour to show; [`Rgb::OFF`] switches the light off.
    pub color: Rgb,
}

impl TrayLight {
    /// Construct a tray light command.
    pub const fn new(tray_index: u8, color: Rgb) -> Self {
        TrayLight { tray_index, color }
    }

    /// Payload bytes `[tray, r, g, b]`.
    pub const fn to_payload(&self) -> [u8; 4] {
        [self.tray_index, self.color.r, self.color.g, self.color.b]
    }

    /// Parse a `CMD_TRAY_LIGHT` frame.
    pub fn parse(frame: &SerialFrame<'_>) -> Result<Self, MalformedFrame> {
        if frame.command != CMD_TRAY_LIGHT {
            return Err(MalformedFrame::InvalidValue {
                command: frame.command,
                field: "command",
                value: frame.command,
            });
        }
        require(frame, 4)?;
        let d = frame.data_frame;
        Ok(TrayLight::new(d[0], Rgb::new(d[1], d[2], d[3])))
    }
}

/// `RESP_TRAY_SENSOR` payload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraySensor {
    /// Wire index of the tray.
    pub tray_index: u8,
    /// `true` when something rests on the tray.
    pub loaded: bool,
}

impl TraySensor {
    /// Construct a sensor reading.
    pub const fn new(tray_index: u8, loaded: bool) -> Self {
        TraySensor { tray_index, loaded }
    }

    /// Payload bytes `[tray, loaded]`.
    pub const fn to_payload(&self) -> [u8; 2] {
        [self.tray_index, self.loaded as u8]
    }

    /// Parse a `RESP_TRAY_SENSOR` frame. `loaded` must be 0 or 1.
    pub fn parse(frame: &SerialFrame<'_>) -> Result<Self, MalformedFrame> {
        require(frame, 2)?;
        let loaded = match frame.data_frame[1] {
            0 => false,
            1 => true,
            value => {
                return Err(MalformedFrame::InvalidValue {
                    command: frame.command,
                    field: "loaded",
                    value,
                });
            }
        };
        Ok(TraySensor::new(frame.data_frame[0], loaded))
    }
}

/// `RESP_TRAY_BACK_BUTTON` payload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackButton {
    /// Button event code as reported by the board.
    pub event_code: u8,
}

impl BackButton {
    /// Payload bytes `[event]`.
    pub const fn to_payload(&self) -> [u8; 1] {
        [self.event_code]
    }

    /// Parse a `RESP_TRAY_BACK_BUTTON` frame.
    pub fn parse(frame: &SerialFrame<'_>) -> Result<Self, MalformedFrame> {
        require(frame, 1)?;
        Ok(BackButton {
            event_code: frame.data_frame[0],
        })
    }
}

/// An inbound frame interpreted by command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareEvent {
    /// A tray sensor changed state.
    TraySensor(TraySensor),
    /// The back button was pressed.
    BackButton(BackButton),
    /// Any command this crate does not interpret.
    Other {
        /// Command byte of the frame.
        command: u8,
    },
}

impl HardwareEvent {
    /// Interpret a decoded frame.
    pub fn from_frame(frame: &SerialFrame<'_>) -> Result<Self, MalformedFrame> {
        match frame.command {
            RESP_TRAY_SENSOR => TraySensor::parse(frame).map(HardwareEvent::TraySensor),
            RESP_TRAY_BACK_BUTTON => BackButton::parse(frame).map(HardwareEvent::BackButton),
            command => Ok(HardwareEvent::Other { command }),
        }
    }
}

/// Fit `text` into the LCD slot.
///
/// The text is cut at [`LCD_TEXT_SLOT`] bytes and zero padded. The cut is at
/// the byte level, so a multi-byte character straddling the boundary is lost.
/// This is lossy by contract, not an error.
pub fn lcd_text(text: &str) -> [u8; LCD_TEXT_SLOT] {
    let mut slot = [0u8; LCD_TEXT_SLOT];
    let bytes = text.as_bytes();
    let n = bytes.len().min(LCD_TEXT_SLOT);
    slot[..n].copy_from_slice(&bytes[..n]);
    slot
}

/// Read the text back out of a `CMD_LCD_TEXT` frame.
///
/// Trailing zero padding is dropped and invalid UTF-8 is replaced.
pub fn read_lcd_text(frame: &SerialFrame<'_>) -> Result<String, MalformedFrame> {
    if frame.command != CMD_LCD_TEXT {
        return Err(MalformedFrame::InvalidValue {
            command: frame.command,
            field: "command",
            value: frame.command,
        });
    }
    let end = frame
        .data_frame
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |i| i + 1);
    Ok(String::from_utf8_lossy(&frame.data_frame[..end]).into_owned())
}
