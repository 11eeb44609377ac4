//! Idle phase: binding trays to destinations and starting the job.

use courier_serial::Rgb;
use tracing::{debug, info};

use crate::coordinator::Coordinator;
use crate::event::UiEvent;
use crate::password::Verdict;
use crate::phase::{IdleState, PhaseState, Step};
use crate::platform::calibrate_frame;

impl Coordinator {
    pub(crate) fn idle_ui(&mut self, mut s: IdleState, event: UiEvent) -> Step {
        match event {
            UiEvent::SelectTray(tray) => {
                let selected = s.assignment.select_tray(tray);
                debug!(?tray, ?selected, "tray selection");
            }
            UiEvent::SelectDestination(name) => {
                if !self.locations.is_empty() && self.locations.binary_search(&name).is_err() {
                    debug!(location = %name, "unknown destination");
                    return Step::Ignored(PhaseState::Idle(s));
                }
                let idle_location = self.settings.read(|c| c.idle_location.clone());
                match s.assignment.bind_location(&name, &idle_location) {
                    Some(bound) => {
                        info!(tray = ?bound.tray, location = %name, replaced = ?bound.replaced, "tray bound");
                        self.set_tray_light(bound.tray, Rgb::BOUND);
                    }
                    None => debug!(location = %name, "destination not bindable"),
                }
            }
            UiEvent::UnbindTray(tray) => match s.assignment.unbind_tray(tray) {
                Some(name) => {
                    info!(?tray, location = %name, "tray unbound");
                    self.set_tray_light(tray, Rgb::OFF);
                }
                None => return Step::Ignored(PhaseState::Idle(s)),
            },
            UiEvent::Go => {
                let Some(job) = s.assignment.take_job() else {
                    return Step::Ignored(PhaseState::Idle(s));
                };
                let start_speech = self.settings.read(|c| c.start_speech.clone());
                info!(stops = job.len(), "job started");
                self.job = job;
                self.gate.dismiss();
                self.platform.speak(&start_speech);
                self.platform.set_listeners(true);
                return Step::Next(self.enter_going());
            }
            UiEvent::OpenSettings => self.gate.open(),
            UiEvent::PasswordConfirm => {
                let password = self.settings.read(|c| c.password.clone());
                match self.gate.confirm(&password) {
                    Some(Verdict::Granted) => {
                        info!("settings unlocked");
                        s.settings_unlocked = true;
                    }
                    Some(Verdict::Mismatch) => debug!("settings password mismatch"),
                    None => return Step::Ignored(PhaseState::Idle(s)),
                }
            }
            UiEvent::PasswordDismiss => {
                if !self.gate.dismiss() {
                    return Step::Ignored(PhaseState::Idle(s));
                }
            }
            UiEvent::CloseSettings => s.settings_unlocked = false,
            UiEvent::CalibrateTrays => {
                if !s.settings_unlocked {
                    return Step::Ignored(PhaseState::Idle(s));
                }
                info!("calibrating trays");
                self.send_frame(calibrate_frame());
            }
            _ => return Step::Ignored(PhaseState::Idle(s)),
        }
        Step::Next(PhaseState::Idle(s))
    }
}
