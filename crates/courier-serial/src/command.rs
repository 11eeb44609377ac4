//! Command bytes understood by the tray board.
//!
//! `CMD_*` frames go from the controller to the hardware, `RESP_*` frames come
//! back from it.

/// Set the colour of one tray light. Payload: `[tray, r, g, b]`.
pub const CMD_TRAY_LIGHT: u8 = 0x11;

/// Tare the tray load sensors. Empty payload.
pub const CMD_TRAY_CALIBRATE: u8 = 0x12;

/// Write the LCD text slot. Payload: fixed-size text slot, see [`crate::LCD_TEXT_SLOT`].
pub const CMD_LCD_TEXT: u8 = 0x21;

/// A tray sensor changed state. Payload: `[tray, loaded]`.
pub const RESP_TRAY_SENSOR: u8 = 0x81;

/// The back button on the tray column was pressed. Payload: `[event]`.
pub const RESP_TRAY_BACK_BUTTON: u8 = 0x82;
