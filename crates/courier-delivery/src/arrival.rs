//! Arrived phase: pickup countdown and tray checks.

use courier_serial::{Rgb, TraySensor};
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::event::UiEvent;
use crate::password::Verdict;
use crate::phase::{ArrivedState, PhaseState, Step};
use crate::timer::{COUNTDOWN_TICK, TimerKind, UNLOAD_GRACE, WRONG_TRAY_WARNING};
use crate::tray::Tray;

impl Coordinator {
    pub(crate) fn enter_arrived(&mut self, stop_index: usize) -> PhaseState {
        let timeout = self.settings.read(|c| c.arrive_timeout());
        self.timers
            .start(&mut *self.scheduler, TimerKind::ArriveCountdown, COUNTDOWN_TICK);
        PhaseState::Arrived(ArrivedState {
            stop_index,
            remaining_millis: timeout.as_millis() as u64,
            ..ArrivedState::default()
        })
    }

    pub(crate) fn arrived_ui(&mut self, mut s: ArrivedState, event: UiEvent) -> Step {
        let busy = s.paused || s.unload_pending;
        match event {
            UiEvent::Go if !busy => Step::Next(self.advance()),
            UiEvent::Pause if !busy => {
                info!(remaining_millis = s.remaining_millis, "countdown paused");
                self.timers
                    .cancel(&mut *self.scheduler, TimerKind::ArriveCountdown);
                self.timers
                    .cancel(&mut *self.scheduler, TimerKind::WrongTrayWarning);
                self.gate.open();
                s.wrong_tray = false;
                s.paused = true;
                Step::Next(PhaseState::Arrived(s))
            }
            UiEvent::PasswordConfirm if s.paused && self.gate.is_open() => {
                let password = self.settings.read(|c| c.password.clone());
                match self.gate.confirm(&password) {
                    Some(Verdict::Granted) => {
                        info!("admin menu opened");
                        Step::Next(PhaseState::AdminMenu(Box::new(PhaseState::Arrived(s))))
                    }
                    _ => {
                        debug!("password mismatch, resuming countdown");
                        Step::Next(self.resume_arrived(s))
                    }
                }
            }
            UiEvent::PasswordDismiss if s.paused && self.gate.is_open() => {
                Step::Next(self.resume_arrived(s))
            }
            _ => Step::Ignored(PhaseState::Arrived(s)),
        }
    }

    pub(crate) fn arrived_sensor(&mut self, mut s: ArrivedState, reading: TraySensor) -> Step {
        if s.paused || s.unload_pending {
            return Step::Ignored(PhaseState::Arrived(s));
        }
        if reading.loaded {
            debug!(tray_index = reading.tray_index, "tray loaded");
            return Step::Next(PhaseState::Arrived(s));
        }
        let Some(tray) = Tray::from_index(reading.tray_index) else {
            warn!(tray_index = reading.tray_index, "sensor reading for unknown tray");
            return Step::Next(PhaseState::Arrived(s));
        };
        // Arrived never holds the return stop; the home leg drops sensor frames in Going.
        let Some(expected) = self.job.first_tray() else {
            return Step::Ignored(PhaseState::Arrived(s));
        };

        if tray == expected {
            info!(?tray, "correct tray emptied");
            self.timers
                .cancel(&mut *self.scheduler, TimerKind::ArriveCountdown);
            self.timers
                .start(&mut *self.scheduler, TimerKind::UnloadGrace, UNLOAD_GRACE);
            s.unload_pending = true;
        } else {
            info!(?tray, ?expected, "wrong tray emptied");
            let phrase = self.settings.read(|c| c.wrong_tray_speech.clone());
            self.platform.speak(&phrase);
            self.timers.start(
                &mut *self.scheduler,
                TimerKind::WrongTrayWarning,
                WRONG_TRAY_WARNING,
            );
            s.wrong_tray = true;
        }
        Step::Next(PhaseState::Arrived(s))
    }

    pub(crate) fn arrived_timer(&mut self, mut s: ArrivedState, kind: TimerKind) -> Step {
        match kind {
            TimerKind::ArriveCountdown if !s.paused && !s.unload_pending => {
                let tick = COUNTDOWN_TICK.as_millis() as u64;
                s.remaining_millis = s.remaining_millis.saturating_sub(tick);
                if s.remaining_millis == 0 {
                    info!(stop_index = s.stop_index, "pickup time over");
                    return Step::Next(self.advance());
                }
                self.timers
                    .start(&mut *self.scheduler, TimerKind::ArriveCountdown, COUNTDOWN_TICK);
                Step::Next(PhaseState::Arrived(s))
            }
            TimerKind::UnloadGrace if s.unload_pending => Step::Next(self.advance()),
            TimerKind::WrongTrayWarning => {
                s.wrong_tray = false;
                Step::Next(PhaseState::Arrived(s))
            }
            _ => Step::Ignored(PhaseState::Arrived(s)),
        }
    }

    pub(crate) fn resume_arrived(&mut self, mut s: ArrivedState) -> PhaseState {
        self.gate.dismiss();
        s.paused = false;
        info!(remaining_millis = s.remaining_millis, "countdown resumed");
        self.timers
            .start(&mut *self.scheduler, TimerKind::ArriveCountdown, COUNTDOWN_TICK);
        PhaseState::Arrived(s)
    }

    /// Finish the current stop and head for the next one, or home.
    pub(crate) fn advance(&mut self) -> PhaseState {
        for kind in [
            TimerKind::ArriveCountdown,
            TimerKind::UnloadGrace,
            TimerKind::WrongTrayWarning,
        ] {
            self.timers.cancel(&mut *self.scheduler, kind);
        }

        if let Some(done) = self.job.remove_first() {
            if !done.is_return() {
                self.set_tray_light(done.tray, Rgb::OFF);
            }
            info!(location = %done.location, tray = ?done.tray, "stop done");
        }

        let settings = self.live();
        if self.job.is_empty() {
            self.job.ensure_return(&settings.idle_location);
        } else {
            self.platform.speak(&settings.next_location_speech);
        }
        self.enter_going()
    }
}
