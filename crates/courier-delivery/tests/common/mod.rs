#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use courier_delivery::{
    Coordinator, DestinationPolicy, Event, NavigationEvent, NavigationStatus, PhaseState,
    Platform, Scheduler, Settings, SharedSettings, TimerKind, TimerTicket, Tray, UiEvent,
};
use courier_serial::command::{
    CMD_LCD_TEXT, CMD_TRAY_CALIBRATE, CMD_TRAY_LIGHT, RESP_TRAY_BACK_BUTTON, RESP_TRAY_SENSOR,
};
use courier_serial::{Rgb, TrayLight, decode, encode, read_lcd_text};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    StopMovement,
    Speak(String),
    Frame(Vec<u8>),
    AmbienceOn,
    AmbienceOff,
    Listeners(bool),
}

pub struct RecordingPlatform {
    calls: Arc<Mutex<Vec<Call>>>,
    ambience_fails: bool,
}

impl Platform for RecordingPlatform {
    fn navigate_to(&mut self, location: &str) {
        self.calls.lock().push(Call::Navigate(location.to_string()));
    }

    fn stop_movement(&mut self) {
        self.calls.lock().push(Call::StopMovement);
    }

    fn speak(&mut self, phrase: &str) {
        self.calls.lock().push(Call::Speak(phrase.to_string()));
    }

    fn send_frame(&mut self, frame: Vec<u8>) {
        self.calls.lock().push(Call::Frame(frame));
    }

    fn start_ambience(&mut self) -> anyhow::Result<()> {
        if self.ambience_fails {
            anyhow::bail!("no track");
        }
        self.calls.lock().push(Call::AmbienceOn);
        Ok(())
    }

    fn stop_ambience(&mut self) {
        self.calls.lock().push(Call::AmbienceOff);
    }

    fn set_listeners(&mut self, attached: bool) {
        self.calls.lock().push(Call::Listeners(attached));
    }
}

/// Holds armed tickets until a test fires them by hand.
pub struct ManualScheduler {
    armed: Arc<Mutex<Vec<(TimerTicket, Duration)>>>,
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, ticket: TimerTicket, after: Duration) {
        let mut armed = self.armed.lock();
        armed.retain(|(t, _)| t.kind != ticket.kind);
        armed.push((ticket, after));
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.armed.lock().retain(|(t, _)| t.kind != kind);
    }
}

pub struct Harness {
    pub coordinator: Coordinator,
    pub settings: SharedSettings,
    calls: Arc<Mutex<Vec<Call>>>,
    armed: Arc<Mutex<Vec<(TimerTicket, Duration)>>>,
}

pub const HOME: &str = "home base";

impl Harness {
    pub fn new() -> Self {
        Harness::build(DestinationPolicy::Exclusive, Settings::default(), false)
    }

    pub fn grouped() -> Self {
        Harness::build(DestinationPolicy::Grouped, Settings::default(), false)
    }

    pub fn with_settings(settings: Settings) -> Self {
        Harness::build(DestinationPolicy::Exclusive, settings, false)
    }

    pub fn without_ambience() -> Self {
        Harness::build(DestinationPolicy::Exclusive, Settings::default(), true)
    }

    fn build(policy: DestinationPolicy, settings: Settings, ambience_fails: bool) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let armed = Arc::new(Mutex::new(Vec::new()));
        let settings = SharedSettings::new(settings);
        let coordinator = Coordinator::with_destination_policy(
            Box::new(RecordingPlatform {
                calls: calls.clone(),
                ambience_fails,
            }),
            Box::new(ManualScheduler {
                armed: armed.clone(),
            }),
            settings.clone(),
            policy,
        );
        Harness {
            coordinator,
            settings,
            calls,
            armed,
        }
    }

    pub fn phase(&self) -> &PhaseState {
        self.coordinator.phase()
    }

    pub fn ui(&mut self, event: UiEvent) {
        self.coordinator.dispatch(Event::Ui(event));
    }

    pub fn nav(&mut self, location: &str, status: NavigationStatus) {
        self.coordinator
            .dispatch(Event::Navigation(NavigationEvent::new(location, status)));
    }

    pub fn sensor(&mut self, tray: Tray, loaded: bool) {
        let raw = encode(RESP_TRAY_SENSOR, &[tray.index(), loaded as u8]).unwrap();
        self.coordinator.dispatch(Event::Frame(raw));
    }

    pub fn back_button(&mut self) {
        let raw = encode(RESP_TRAY_BACK_BUTTON, &[1]).unwrap();
        self.coordinator.dispatch(Event::Frame(raw));
    }

    pub fn bind(&mut self, tray: Tray, location: &str) {
        self.ui(UiEvent::SelectTray(tray));
        self.ui(UiEvent::SelectDestination(location.to_string()));
    }

    pub fn type_password(&mut self, digits: &str) {
        for d in digits.bytes() {
            self.ui(UiEvent::PasswordDigit(d - b'0'));
        }
        self.ui(UiEvent::PasswordConfirm);
    }

    /// Bind, press Go, and drop the recorded calls.
    pub fn start_job(&mut self, stops: &[(Tray, &str)]) {
        for (tray, location) in stops {
            self.bind(*tray, location);
        }
        self.ui(UiEvent::Go);
        self.take_calls();
    }

    /// Start a job and drive to its first stop.
    pub fn arrive_at_first(&mut self, stops: &[(Tray, &str)]) {
        self.start_job(stops);
        self.nav(stops[0].1, NavigationStatus::Start);
        self.nav(stops[0].1, NavigationStatus::Complete);
        self.take_calls();
    }

    pub fn armed(&self, kind: TimerKind) -> Option<Duration> {
        self.armed
            .lock()
            .iter()
            .find(|(t, _)| t.kind == kind)
            .map(|(_, after)| *after)
    }

    /// Deliver the pending ticket of `kind`, as the runtime would after its delay.
    pub fn fire(&mut self, kind: TimerKind) -> bool {
        let ticket = {
            let mut armed = self.armed.lock();
            let Some(index) = armed.iter().position(|(t, _)| t.kind == kind) else {
                return false;
            };
            armed.remove(index).0
        };
        self.coordinator.dispatch(Event::Timer(ticket));
        true
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Navigate(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Speak(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn tray_lights(&self) -> Vec<TrayLight> {
        self.frames(CMD_TRAY_LIGHT)
            .iter()
            .map(|p| TrayLight::new(p[0], Rgb::new(p[1], p[2], p[3])))
            .collect()
    }

    pub fn lcd_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Frame(raw) => {
                    let frame = decode(&raw).unwrap();
                    (frame.command == CMD_LCD_TEXT).then(|| read_lcd_text(&frame).unwrap())
                }
                _ => None,
            })
            .collect()
    }

    pub fn calibrations(&self) -> usize {
        self.frames(CMD_TRAY_CALIBRATE).len()
    }

    fn frames(&self, command: u8) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Frame(raw) => {
                    let frame = decode(&raw).unwrap();
                    (frame.command == command).then(|| frame.data_frame.to_vec())
                }
                _ => None,
            })
            .collect()
    }
}

pub fn going_index(phase: &PhaseState) -> Option<usize> {
    match phase {
        PhaseState::Going(s) => Some(s.stop_index),
        _ => None,
    }
}

pub fn arrived(phase: &PhaseState) -> Option<courier_delivery::ArrivedState> {
    match phase {
        PhaseState::Arrived(s) => Some(*s),
        _ => None,
    }
}
