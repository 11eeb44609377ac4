#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` codec for the delivery robot's tray bus."]
#![doc = ""]
#![doc = "This crate decodes and encodes the fixed-layout frames exchanged with the"]
#![doc = "tray board (tray sensors, tray lights, back button, LCD text, calibration)."]

extern crate alloc;

pub mod command;
pub mod error;
pub mod frame;
pub mod message;

pub use error::MalformedFrame;
pub use frame::{CHECKSUM_LEN, HEADER_LEN, MAX_PAYLOAD, SYNC, SerialFrame, decode, encode};
pub use message::{
    BackButton, HardwareEvent, LCD_TEXT_SLOT, Rgb, TrayLight, TraySensor, lcd_text, read_lcd_text,
};
