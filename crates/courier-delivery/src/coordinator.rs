//! The phase coordinator: owns the [`PhaseState`] and routes every event to
//! the handler for the current phase.
//!
//! Handlers take the phase by value and hand back the phase to continue in
//! (see [`Step`]), so a half-applied transition is never observable. The
//! phase specific handlers live in `idle.rs`, `going.rs` and `arrival.rs`.

use core::mem;

use courier_serial::{HardwareEvent, MalformedFrame, Rgb, decode};
use tracing::{debug, error, info, warn};

use crate::assignment::DestinationPolicy;
use crate::error::DeliveryError;
use crate::event::{Event, NavigationEvent, UiEvent};
use crate::job::Job;
use crate::password::PasswordGate;
use crate::phase::{GoingState, IdleState, PhaseState, Step};
use crate::platform::{Platform, lcd_text_frame, tray_light_frame};
use crate::settings::{SettingUpdate, Settings, SharedSettings};
use crate::timer::{Scheduler, TimerTicket, Timers};
use crate::tray::Tray;
use crate::view::{DeliveryView, PhaseKind};

pub struct Coordinator {
    pub(crate) phase: PhaseState,
    pub(crate) job: Job,
    pub(crate) gate: PasswordGate,
    pub(crate) timers: Timers,
    pub(crate) platform: Box<dyn Platform>,
    pub(crate) scheduler: Box<dyn Scheduler>,
    pub(crate) settings: SharedSettings,
    pub(crate) locations: Vec<String>,
    pub(crate) policy: DestinationPolicy,
}

impl Coordinator {
    pub fn new(
        platform: Box<dyn Platform>,
        scheduler: Box<dyn Scheduler>,
        settings: SharedSettings,
    ) -> Self {
        Coordinator::with_destination_policy(
            platform,
            scheduler,
            settings,
            DestinationPolicy::default(),
        )
    }

    pub fn with_destination_policy(
        platform: Box<dyn Platform>,
        scheduler: Box<dyn Scheduler>,
        settings: SharedSettings,
        policy: DestinationPolicy,
    ) -> Self {
        Coordinator {
            phase: PhaseState::Idle(IdleState::new(policy)),
            job: Job::default(),
            gate: PasswordGate::default(),
            timers: Timers::default(),
            platform,
            scheduler,
            settings,
            locations: Vec::new(),
            policy,
        }
    }

    pub fn phase(&self) -> &PhaseState {
        &self.phase
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn gate(&self) -> &PasswordGate {
        &self.gate
    }

    /// Process one event to completion. Errors are logged, never returned:
    /// nothing that happens here may take the process down.
    pub fn dispatch(&mut self, event: Event) {
        if let Err(e) = self.handle(event) {
            match e {
                DeliveryError::InvalidTransition { event, phase } => {
                    debug!(event, phase, "event ignored");
                }
                e => warn!(error = %e, "event rejected"),
            }
        }
    }

    pub fn handle(&mut self, event: Event) -> Result<(), DeliveryError> {
        match event {
            Event::Ui(ev) => self.handle_ui_event(ev),
            Event::Navigation(ev) => self.handle_navigation_callback(ev),
            Event::Frame(raw) => self.handle_serial_frame(&raw),
            Event::Settings(update) => self.handle_settings_update(update),
            Event::Timer(ticket) => self.handle_timer(ticket),
            Event::Locations(list) => {
                self.set_locations(list);
                Ok(())
            }
            Event::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }

    pub fn handle_ui_event(&mut self, event: UiEvent) -> Result<(), DeliveryError> {
        let name = event.name();
        // Digit entry only touches the prompt, whatever the phase.
        match event {
            UiEvent::PasswordDigit(d) if self.gate.is_open() => {
                self.gate.push_digit(d);
                return Ok(());
            }
            UiEvent::PasswordDelete if self.gate.is_open() => {
                self.gate.delete();
                return Ok(());
            }
            _ => {}
        }

        let from = self.phase.name();
        let step = match mem::take(&mut self.phase) {
            PhaseState::Idle(s) => self.idle_ui(s, event),
            PhaseState::Going(s) => self.going_ui(s, event),
            PhaseState::Arrived(s) => self.arrived_ui(s, event),
            PhaseState::AdminMenu(ret) => self.menu_ui(ret, event),
        };
        self.settle(from, step, name)
    }

    pub fn handle_navigation_callback(
        &mut self,
        event: NavigationEvent,
    ) -> Result<(), DeliveryError> {
        let name = event.status.name();
        let from = self.phase.name();
        let step = match mem::take(&mut self.phase) {
            PhaseState::Going(s) => self.going_navigation(s, event),
            other => Step::Ignored(other),
        };
        self.settle(from, step, name)
    }

    pub fn handle_serial_frame(&mut self, raw: &[u8]) -> Result<(), DeliveryError> {
        let frame = decode(raw)?;
        let from = self.phase.name();
        let step = match HardwareEvent::from_frame(&frame)? {
            HardwareEvent::TraySensor(reading) => match mem::take(&mut self.phase) {
                PhaseState::Arrived(s) => self.arrived_sensor(s, reading),
                other => Step::Ignored(other),
            },
            HardwareEvent::BackButton(button) => {
                debug!(code = button.event_code, "back button");
                match mem::take(&mut self.phase) {
                    PhaseState::Going(s) if !s.paused => Step::Next(self.pause_going(s)),
                    other => Step::Ignored(other),
                }
            }
            HardwareEvent::Other { command } => {
                debug!(command, "unhandled serial command");
                return Ok(());
            }
        };
        self.settle(from, step, "serial_frame")
    }

    /// Store one settings field. Takes effect at the next point of use.
    pub fn handle_settings_update(&mut self, update: SettingUpdate) -> Result<(), DeliveryError> {
        let field = update.field();
        let version = self.settings.apply(update)?;
        info!(%field, version, "setting updated");
        Ok(())
    }

    pub fn handle_timer(&mut self, ticket: TimerTicket) -> Result<(), DeliveryError> {
        if !self.timers.fire(ticket) {
            return Ok(());
        }
        let from = self.phase.name();
        let step = match mem::take(&mut self.phase) {
            PhaseState::Going(s) => self.going_timer(s, ticket.kind),
            PhaseState::Arrived(s) => self.arrived_timer(s, ticket.kind),
            other => Step::Ignored(other),
        };
        self.settle(from, step, ticket.kind.name())
    }

    pub fn set_locations(&mut self, mut locations: Vec<String>) {
        locations.sort();
        locations.dedup();
        info!(count = locations.len(), "locations updated");
        self.locations = locations;
    }

    /// Release everything tied to the current job and go back to Idle.
    pub fn shutdown(&mut self) {
        if matches!(self.phase, PhaseState::Going(_)) {
            self.platform.stop_movement();
        }
        let next = self.finish_job();
        self.phase = next;
        info!("coordinator shut down");
    }

    fn settle(
        &mut self,
        from: &'static str,
        step: Step,
        event: &'static str,
    ) -> Result<(), DeliveryError> {
        match step {
            Step::Next(next) => {
                if next.name() != from {
                    info!(from, to = next.name(), event, "phase transition");
                }
                self.phase = next;
                Ok(())
            }
            Step::Ignored(phase) => {
                let name = phase.name();
                self.phase = phase;
                Err(DeliveryError::InvalidTransition { event, phase: name })
            }
        }
    }

    pub(crate) fn live(&self) -> Settings {
        self.settings.snapshot()
    }

    pub(crate) fn send_frame(&mut self, frame: Result<Vec<u8>, MalformedFrame>) {
        match frame {
            Ok(bytes) => self.platform.send_frame(bytes),
            Err(e) => error!(error = %e, "could not encode outbound frame"),
        }
    }

    pub(crate) fn set_tray_light(&mut self, tray: Tray, color: Rgb) {
        self.send_frame(tray_light_frame(tray, color));
    }

    pub(crate) fn set_lcd_text(&mut self, text: &str) {
        self.send_frame(lcd_text_frame(text));
    }

    /// Drive to the job's current stop.
    pub(crate) fn enter_going(&mut self) -> PhaseState {
        let Some(location) = self.job.first_location().map(str::to_string) else {
            warn!("job has no stops left, returning to idle");
            return self.finish_job();
        };
        let stop_index = self.job.completed();
        info!(%location, stop_index, "navigating");
        self.platform.navigate_to(&location);
        self.start_ambience();
        PhaseState::Going(GoingState {
            stop_index,
            paused: false,
        })
    }

    pub(crate) fn start_ambience(&mut self) {
        if let Err(e) = self.platform.start_ambience() {
            warn!(error = %e, "ambience unavailable");
        }
    }

    /// Tear down the job and reset the Idle surface.
    pub(crate) fn finish_job(&mut self) -> PhaseState {
        self.timers.cancel_all(&mut *self.scheduler);
        self.platform.stop_ambience();
        self.platform.set_listeners(false);
        for tray in Tray::ALL {
            self.set_tray_light(tray, Rgb::OFF);
        }
        self.set_lcd_text("");
        self.gate.dismiss();
        if !self.job.is_empty() || self.job.completed() > 0 {
            info!(completed = self.job.completed(), "job finished");
        }
        self.job = Job::default();
        PhaseState::Idle(IdleState::new(self.policy))
    }

    pub fn view(&self) -> DeliveryView {
        let idle_location = self.settings.read(|s| s.idle_location.clone());
        let mut view = DeliveryView {
            prompt_digits: self.gate.input().map(str::len),
            target: self.job.first_location().map(str::to_string),
            tray: self.job.first().filter(|s| !s.is_return()).map(|s| s.tray),
            stops_left: self.job.len(),
            ..DeliveryView::default()
        };
        let (phase, inner) = match &self.phase {
            PhaseState::AdminMenu(inner) => (PhaseKind::AdminMenu, inner.as_ref()),
            other => (kind_of(other), other),
        };
        view.phase = phase;
        if phase == PhaseKind::AdminMenu {
            view.interrupted = Some(kind_of(inner));
        }
        match inner {
            PhaseState::Idle(s) => {
                let a = &s.assignment;
                view.settings_unlocked = s.settings_unlocked;
                view.bindings = a.bindings().iter().map(|(t, n)| (*t, n.clone())).collect();
                view.selected_tray = a.selected();
                view.pending = a.pending().to_vec();
                view.destinations = a.destinations(&self.locations, &idle_location);
                view.can_start = a.can_start();
            }
            PhaseState::Going(s) => {
                view.stop_index = s.stop_index;
                view.paused = s.paused;
            }
            PhaseState::Arrived(s) => {
                view.stop_index = s.stop_index;
                view.paused = s.paused;
                view.wrong_tray = s.wrong_tray;
                view.remaining_secs = Some(s.remaining_millis.div_ceil(1000));
            }
            PhaseState::AdminMenu(_) => {}
        }
        view
    }
}

fn kind_of(phase: &PhaseState) -> PhaseKind {
    match phase {
        PhaseState::Idle(_) => PhaseKind::Idle,
        PhaseState::Going(_) => PhaseKind::Going,
        PhaseState::Arrived(_) => PhaseKind::Arrived,
        PhaseState::AdminMenu(_) => PhaseKind::AdminMenu,
    }
}
