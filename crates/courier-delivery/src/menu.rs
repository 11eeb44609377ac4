use tracing::info;

use crate::coordinator::Coordinator;
use crate::event::{MenuChoice, UiEvent};
use crate::phase::{PhaseState, Step};

impl Coordinator {
    /// Admin menu on top of a paused Going or Arrived phase.
    pub(crate) fn menu_ui(&mut self, interrupted: Box<PhaseState>, event: UiEvent) -> Step {
        let choice = match event {
            UiEvent::AdminMenu(choice) => choice,
            UiEvent::MenuDismiss => MenuChoice::Resume,
            _ => return Step::Ignored(PhaseState::AdminMenu(interrupted)),
        };
        info!(?choice, "admin menu");

        match (choice, *interrupted) {
            (MenuChoice::AbortJob, PhaseState::Going(_)) => {
                self.platform.stop_movement();
                Step::Next(self.finish_job())
            }
            (MenuChoice::AbortJob, PhaseState::Arrived(_)) => Step::Next(self.finish_job()),
            (MenuChoice::SkipToIdle, PhaseState::Going(_) | PhaseState::Arrived(_)) => {
                let idle_location = self.settings.read(|c| c.idle_location.clone());
                self.timers.cancel_all(&mut *self.scheduler);
                self.job.skip_to_return(&idle_location);
                Step::Next(self.enter_going())
            }
            (MenuChoice::Resume, PhaseState::Going(s)) => Step::Next(self.resume_going(s)),
            (MenuChoice::Resume, PhaseState::Arrived(s)) => Step::Next(self.resume_arrived(s)),
            (_, other) => Step::Ignored(PhaseState::AdminMenu(Box::new(other))),
        }
    }
}
