use crate::assignment::{DestinationPolicy, TrayAssignment};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdleState {
    pub assignment: TrayAssignment,
    /// The settings password was entered; calibration is allowed.
    pub settings_unlocked: bool,
}

impl IdleState {
    pub fn new(policy: DestinationPolicy) -> Self {
        IdleState {
            assignment: TrayAssignment::new(policy),
            settings_unlocked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoingState {
    pub stop_index: usize,
    /// Robot stopped and the password prompt is up.
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrivedState {
    pub stop_index: usize,
    pub remaining_millis: u64,
    pub wrong_tray: bool,
    /// Countdown stopped and the password prompt is up.
    pub paused: bool,
    /// The right tray was emptied; the grace delay is running.
    pub unload_pending: bool,
}

/// The workflow's single source of truth. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseState {
    Idle(IdleState),
    Going(GoingState),
    Arrived(ArrivedState),
    /// Admin menu on top of the phase it interrupted.
    AdminMenu(Box<PhaseState>),
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState::Idle(IdleState::default())
    }
}

impl PhaseState {
    pub fn name(&self) -> &'static str {
        match self {
            PhaseState::Idle(_) => "idle",
            PhaseState::Going(_) => "going",
            PhaseState::Arrived(_) => "arrived",
            PhaseState::AdminMenu(_) => "admin_menu",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PhaseState::Idle(_))
    }
}

/// What a phase handler did with an event.
#[derive(Debug)]
pub(crate) enum Step {
    /// The event applied; this is the phase to continue in.
    Next(PhaseState),
    /// The event does not apply here; the phase is handed back untouched.
    Ignored(PhaseState),
}
