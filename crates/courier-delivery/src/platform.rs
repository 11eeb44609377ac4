//! The robot the workflow drives.
//!
//! Every call is a request. Results come back later as events
//! ([`crate::Event::Navigation`], [`crate::Event::Frame`]); nothing here blocks.

use courier_serial::command::{CMD_LCD_TEXT, CMD_TRAY_CALIBRATE, CMD_TRAY_LIGHT};
use courier_serial::{MalformedFrame, Rgb, TrayLight, encode, lcd_text};

use crate::tray::Tray;

/// Diagnostic codes reported with navigation status when something is in the way.
pub const OBSTACLE_CODES: [i32; 2] = [2000, 2001];

/// Abort code meaning the robot was blocked for too long.
pub const BLOCKED_TOO_LONG: i32 = 1005;

pub trait Platform: Send {
    /// Start driving to a named location. Replaces any drive in progress.
    fn navigate_to(&mut self, location: &str);

    fn stop_movement(&mut self);

    fn speak(&mut self, phrase: &str);

    /// Write one encoded frame to the hardware bus.
    fn send_frame(&mut self, frame: Vec<u8>);

    /// Start the ambience track. Failure is reported, never fatal.
    fn start_ambience(&mut self) -> anyhow::Result<()>;

    fn stop_ambience(&mut self);

    /// Attach or detach the navigation and serial callbacks for a job.
    fn set_listeners(&mut self, attached: bool);
}

/// `CMD_TRAY_LIGHT` frame for one tray.
pub fn tray_light_frame(tray: Tray, color: Rgb) -> Result<Vec<u8>, MalformedFrame> {
    encode(CMD_TRAY_LIGHT, &TrayLight::new(tray.index(), color).to_payload())
}

/// `CMD_LCD_TEXT` frame; long text is cut to the slot.
pub fn lcd_text_frame(text: &str) -> Result<Vec<u8>, MalformedFrame> {
    encode(CMD_LCD_TEXT, &lcd_text(text))
}

pub fn calibrate_frame() -> Result<Vec<u8>, MalformedFrame> {
    encode(CMD_TRAY_CALIBRATE, &[])
}
