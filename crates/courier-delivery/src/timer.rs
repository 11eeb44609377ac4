//! Cancellable timers on the coordinator's timeline.
//!
//! The coordinator never sleeps. It asks a [`Scheduler`] to deliver a
//! [`TimerTicket`] back into the event queue later, and keeps the generation
//! it armed per [`TimerKind`]. A ticket whose generation is no longer armed
//! is stale and is dropped, which makes cancel idempotent and a firing that
//! races a cancel harmless.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

/// Countdown granularity in the Arrived phase.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
/// Delay between a correct unload and the advance to the next stop.
pub const UNLOAD_GRACE: Duration = Duration::from_secs(5);
/// How long the wrong-tray warning stays up.
pub const WRONG_TRAY_WARNING: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One second of the pickup countdown.
    ArriveCountdown,
    /// Resume after an obstacle abort.
    AutoResume,
    /// Grace period after the right tray was emptied.
    UnloadGrace,
    /// Clears the wrong-tray warning.
    WrongTrayWarning,
}

impl TimerKind {
    pub const fn name(self) -> &'static str {
        match self {
            TimerKind::ArriveCountdown => "arrive_countdown",
            TimerKind::AutoResume => "auto_resume",
            TimerKind::UnloadGrace => "unload_grace",
            TimerKind::WrongTrayWarning => "wrong_tray_warning",
        }
    }
}

/// Identifies one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Delivers tickets back to the coordinator after a delay.
///
/// Implementations push `Event::Timer(ticket)` into the same ordered queue as
/// every other event. Scheduling a kind that is already pending replaces it.
pub trait Scheduler: Send {
    fn schedule(&mut self, ticket: TimerTicket, after: Duration);
    fn cancel(&mut self, kind: TimerKind);
}

/// Armed generations, one slot per kind.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    next_generation: u64,
    armed: HashMap<TimerKind, u64>,
}

impl Timers {
    pub(crate) fn start(
        &mut self,
        scheduler: &mut dyn Scheduler,
        kind: TimerKind,
        after: Duration,
    ) -> TimerTicket {
        self.next_generation += 1;
        let ticket = TimerTicket {
            kind,
            generation: self.next_generation,
        };
        self.armed.insert(kind, ticket.generation);
        scheduler.schedule(ticket, after);
        ticket
    }

    /// No-op when the kind is not armed.
    pub(crate) fn cancel(&mut self, scheduler: &mut dyn Scheduler, kind: TimerKind) {
        if self.armed.remove(&kind).is_some() {
            scheduler.cancel(kind);
        }
    }

    pub(crate) fn cancel_all(&mut self, scheduler: &mut dyn Scheduler) {
        for (kind, _) in self.armed.drain() {
            scheduler.cancel(kind);
        }
    }

    /// Accept a fired ticket, disarming its kind. Stale tickets return `false`.
    pub(crate) fn fire(&mut self, ticket: TimerTicket) -> bool {
        match self.armed.get(&ticket.kind) {
            Some(generation) if *generation == ticket.generation => {
                self.armed.remove(&ticket.kind);
                true
            }
            _ => {
                debug!(timer = ticket.kind.name(), generation = ticket.generation, "stale timer ticket");
                false
            }
        }
    }

    pub(crate) fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }
}
