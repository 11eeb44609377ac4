//! Going phase: driving to the current stop.

use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::event::{NavigationEvent, NavigationStatus, UiEvent};
use crate::password::Verdict;
use crate::phase::{GoingState, PhaseState, Step};
use crate::platform::{BLOCKED_TOO_LONG, OBSTACLE_CODES};
use crate::timer::TimerKind;

impl Coordinator {
    pub(crate) fn going_ui(&mut self, s: GoingState, event: UiEvent) -> Step {
        match event {
            UiEvent::Pause if !s.paused => Step::Next(self.pause_going(s)),
            UiEvent::PasswordConfirm if s.paused && self.gate.is_open() => {
                let password = self.settings.read(|c| c.password.clone());
                match self.gate.confirm(&password) {
                    Some(Verdict::Granted) => {
                        self.timers.cancel(&mut *self.scheduler, TimerKind::AutoResume);
                        info!("admin menu opened");
                        Step::Next(PhaseState::AdminMenu(Box::new(PhaseState::Going(s))))
                    }
                    _ => {
                        debug!("password mismatch, resuming");
                        Step::Next(self.resume_going(s))
                    }
                }
            }
            UiEvent::PasswordDismiss if s.paused && self.gate.is_open() => {
                Step::Next(self.resume_going(s))
            }
            _ => Step::Ignored(PhaseState::Going(s)),
        }
    }

    pub(crate) fn going_navigation(&mut self, s: GoingState, event: NavigationEvent) -> Step {
        if s.paused {
            return Step::Ignored(PhaseState::Going(s));
        }
        let NavigationEvent { location, status } = event;
        let target = self.job.first_location().unwrap_or_default().to_string();
        let returning = self.job.first().is_some_and(|stop| stop.is_return());
        let settings = self.live();

        match status {
            NavigationStatus::Start => {
                if location == target {
                    self.set_lcd_text(&location);
                } else {
                    debug!(%location, %target, "stale start");
                }
            }
            NavigationStatus::Obstacle(code) => {
                if OBSTACLE_CODES.contains(&code) {
                    self.platform.speak(&settings.obstacle_speech);
                } else {
                    debug!(code, "obstacle code without phrase");
                }
            }
            NavigationStatus::Complete => {
                let home = returning && location == target;
                // A delivery stop that shares the idle location's name is still delivered.
                if home || (location == settings.idle_location && location != target) {
                    if !returning {
                        debug!(%location, %target, "complete at idle location, dropping remaining stops");
                    }
                    info!(%location, "back at idle location");
                    self.platform.stop_ambience();
                    return Step::Next(self.finish_job());
                }
                if location != target {
                    debug!(%location, %target, "stale complete");
                    return Step::Next(PhaseState::Going(s));
                }
                info!(%location, stop_index = s.stop_index, "arrived");
                self.platform.stop_ambience();
                self.platform.speak(&settings.arrive_speech);
                return Step::Next(self.enter_arrived(s.stop_index));
            }
            NavigationStatus::Abort(BLOCKED_TOO_LONG) => {
                warn!(%location, "blocked too long, pausing");
                let next = self.pause_going(s);
                self.timers.start(
                    &mut *self.scheduler,
                    TimerKind::AutoResume,
                    settings.pause_timeout(),
                );
                return Step::Next(next);
            }
            NavigationStatus::Abort(code) => {
                warn!(%location, code, "navigation aborted, no recovery for this code");
            }
        }
        Step::Next(PhaseState::Going(s))
    }

    pub(crate) fn going_timer(&mut self, s: GoingState, kind: TimerKind) -> Step {
        match kind {
            TimerKind::AutoResume if s.paused => {
                info!("auto-resume");
                Step::Next(self.resume_going(s))
            }
            _ => Step::Ignored(PhaseState::Going(s)),
        }
    }

    /// Stop the robot and ask for the password.
    pub(crate) fn pause_going(&mut self, mut s: GoingState) -> PhaseState {
        info!(stop_index = s.stop_index, "paused");
        self.platform.stop_movement();
        self.platform.stop_ambience();
        self.gate.open();
        s.paused = true;
        PhaseState::Going(s)
    }

    /// Drive on to the current stop.
    pub(crate) fn resume_going(&mut self, mut s: GoingState) -> PhaseState {
        self.timers.cancel(&mut *self.scheduler, TimerKind::AutoResume);
        self.gate.dismiss();
        let Some(location) = self.job.first_location().map(str::to_string) else {
            return self.finish_job();
        };
        info!(%location, "resuming");
        self.platform.navigate_to(&location);
        self.start_ambience();
        s.paused = false;
        PhaseState::Going(s)
    }
}
