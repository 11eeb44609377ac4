//! A stand-in robot: drives by waiting, mirrors the tray bus into the
//! blackboard, and reports back through the event queue.

use std::time::Duration;

use anyhow::bail;
use courier_delivery::{Event, NavigationEvent, NavigationStatus, Platform};
use courier_serial::command::{CMD_LCD_TEXT, CMD_TRAY_CALIBRATE, CMD_TRAY_LIGHT};
use courier_serial::{MalformedFrame, TrayLight, decode, read_lcd_text};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::blackboard::{Blackboard, raise_fault, touch_frame};
use crate::config::SimConfig;

/// The robot's side of the event queue. Callbacks are only forwarded while a
/// job has the listeners attached.
#[derive(Clone)]
pub struct SimHardware {
    tx: mpsc::Sender<Event>,
    bb: Blackboard,
}

impl SimHardware {
    pub fn new(tx: mpsc::Sender<Event>, bb: Blackboard) -> Self {
        SimHardware { tx, bb }
    }

    pub fn current_target(&self) -> Option<String> {
        self.bb.read().target.clone()
    }

    pub async fn report(&self, location: &str, status: NavigationStatus) {
        self.forward(Event::Navigation(NavigationEvent::new(location, status)))
            .await;
    }

    /// Raw bytes as they would arrive from the tray board.
    pub async fn receive_frame(&self, frame: Vec<u8>) {
        self.forward(Event::Frame(frame)).await;
    }

    async fn forward(&self, event: Event) {
        if !self.bb.read().listeners {
            debug!(?event, "listeners detached, dropping robot callback");
            return;
        }
        if self.tx.send(event).await.is_err() {
            debug!("event queue closed, dropping robot callback");
        }
    }
}

pub struct SimRobot {
    hw: SimHardware,
    config: SimConfig,
    drive: Option<JoinHandle<()>>,
}

impl SimRobot {
    pub fn new(hw: SimHardware, config: SimConfig) -> Self {
        SimRobot {
            hw,
            config,
            drive: None,
        }
    }

    fn halt(&mut self) {
        if let Some(drive) = self.drive.take() {
            drive.abort();
        }
        self.hw.bb.write().moving = false;
    }

    fn mirror_frame(&self, raw: &[u8]) -> Result<(), MalformedFrame> {
        let frame = decode(raw)?;
        touch_frame(&self.hw.bb);
        match frame.command {
            CMD_TRAY_LIGHT => {
                let light = TrayLight::parse(&frame)?;
                let mut g = self.hw.bb.write();
                if let Some(slot) = g.tray_lights.get_mut(usize::from(light.tray_index)) {
                    *slot = light.color;
                }
                debug!(tray = light.tray_index, color = ?light.color, "tray light");
            }
            CMD_LCD_TEXT => {
                let text = read_lcd_text(&frame)?;
                info!(text = %text, "lcd");
                self.hw.bb.write().lcd_text = text;
            }
            CMD_TRAY_CALIBRATE => info!("calibrating tray sensors"),
            command => debug!(command, "unhandled outbound frame"),
        }
        Ok(())
    }
}

impl Platform for SimRobot {
    fn navigate_to(&mut self, location: &str) {
        self.halt();
        {
            let mut g = self.hw.bb.write();
            g.target = Some(location.to_string());
            g.moving = true;
        }
        info!(location = %location, "navigating");

        let hw = self.hw.clone();
        let location = location.to_string();
        let start_delay = Duration::from_millis(self.config.start_delay_ms);
        let travel = Duration::from_millis(self.config.travel_ms);
        self.drive = Some(tokio::spawn(async move {
            tokio::time::sleep(start_delay).await;
            hw.report(&location, NavigationStatus::Start).await;
            tokio::time::sleep(travel).await;
            hw.bb.write().moving = false;
            hw.report(&location, NavigationStatus::Complete).await;
        }));
    }

    fn stop_movement(&mut self) {
        info!("stopping");
        self.halt();
    }

    fn speak(&mut self, phrase: &str) {
        info!(phrase = %phrase, "speaking");
        self.hw.bb.write().last_speech = Some(phrase.to_string());
    }

    fn send_frame(&mut self, frame: Vec<u8>) {
        if let Err(e) = self.mirror_frame(&frame) {
            warn!(error = %e, "tray board rejected frame");
            raise_fault(&self.hw.bb, &format!("bad frame: {e}"));
        }
    }

    fn start_ambience(&mut self) -> anyhow::Result<()> {
        let Some(track) = &self.config.ambience_track else {
            bail!("no ambience track configured");
        };
        if !track.is_file() {
            raise_fault(&self.hw.bb, "ambience track missing");
            bail!("ambience track {} not found", track.display());
        }
        info!(track = %track.display(), "ambience on");
        self.hw.bb.write().ambience = true;
        Ok(())
    }

    fn stop_ambience(&mut self) {
        let mut g = self.hw.bb.write();
        if g.ambience {
            info!("ambience off");
        }
        g.ambience = false;
    }

    fn set_listeners(&mut self, attached: bool) {
        debug!(attached, "robot listeners");
        self.hw.bb.write().listeners = attached;
    }
}

impl Drop for SimRobot {
    fn drop(&mut self) {
        if let Some(drive) = self.drive.take() {
            drive.abort();
        }
    }
}
