//! Read-only snapshot of the workflow for whatever draws the screen.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::assignment::Destination;
use crate::job::Stop;
use crate::tray::Tray;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseKind {
    #[default]
    Idle,
    Going,
    Arrived,
    AdminMenu,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryView {
    pub phase: PhaseKind,
    /// Phase under the admin menu, when it is open.
    pub interrupted: Option<PhaseKind>,
    pub target: Option<String>,
    pub tray: Option<Tray>,
    pub stop_index: usize,
    pub stops_left: usize,
    pub remaining_secs: Option<u64>,
    pub wrong_tray: bool,
    pub paused: bool,
    /// Digits typed into the open password prompt.
    pub prompt_digits: Option<usize>,
    pub settings_unlocked: bool,
    pub bindings: Vec<(Tray, String)>,
    pub selected_tray: Option<Tray>,
    pub pending: Vec<Stop>,
    pub destinations: Vec<Destination>,
    pub can_start: bool,
}

impl DeliveryView {
    pub fn menu_open(&self) -> bool {
        self.phase == PhaseKind::AdminMenu
    }

    /// One line for the log.
    pub fn summary(&self) -> String {
        match self.phase {
            PhaseKind::Idle => format!(
                "idle: {} bound, selected {:?}",
                self.bindings.len(),
                self.selected_tray
            ),
            PhaseKind::Going => format!(
                "going to {} (stop {}, paused {})",
                self.target.as_deref().unwrap_or("-"),
                self.stop_index,
                self.paused
            ),
            PhaseKind::Arrived => format!(
                "arrived at {}, tray {:?}, {} s left{}",
                self.target.as_deref().unwrap_or("-"),
                self.tray,
                self.remaining_secs.unwrap_or(0),
                if self.wrong_tray { ", wrong tray" } else { "" }
            ),
            PhaseKind::AdminMenu => format!("admin menu over {:?}", self.interrupted),
        }
    }
}
