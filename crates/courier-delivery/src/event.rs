//! Everything that can happen to the workflow, merged into one type so the
//! sources can share a single ordered queue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::settings::SettingUpdate;
use crate::timer::TimerTicket;
use crate::tray::Tray;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Ui(UiEvent),
    Navigation(NavigationEvent),
    /// Raw bytes received from the hardware bus.
    Frame(Vec<u8>),
    Settings(SettingUpdate),
    Timer(TimerTicket),
    /// The platform's current list of known locations.
    Locations(Vec<String>),
    Shutdown,
}

/// Admin menu entries, numbered as shown to the operator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1: drop the job and go back to Idle.
    AbortJob,
    /// 2: drop the remaining stops and drive to the idle location.
    SkipToIdle,
    /// 3: carry on with whatever was interrupted.
    Resume,
}

impl MenuChoice {
    pub fn from_number(n: u8) -> Option<MenuChoice> {
        match n {
            1 => Some(MenuChoice::AbortJob),
            2 => Some(MenuChoice::SkipToIdle),
            3 => Some(MenuChoice::Resume),
            _ => None,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectTray(Tray),
    SelectDestination(String),
    UnbindTray(Tray),
    /// Start the job in Idle, advance immediately in Arrived.
    Go,
    Pause,
    PasswordDigit(u8),
    PasswordDelete,
    PasswordConfirm,
    PasswordDismiss,
    AdminMenu(MenuChoice),
    MenuDismiss,
    OpenSettings,
    CloseSettings,
    CalibrateTrays,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::SelectTray(_) => "select_tray",
            UiEvent::SelectDestination(_) => "select_destination",
            UiEvent::UnbindTray(_) => "unbind_tray",
            UiEvent::Go => "go",
            UiEvent::Pause => "pause",
            UiEvent::PasswordDigit(_) => "password_digit",
            UiEvent::PasswordDelete => "password_delete",
            UiEvent::PasswordConfirm => "password_confirm",
            UiEvent::PasswordDismiss => "password_dismiss",
            UiEvent::AdminMenu(_) => "admin_menu",
            UiEvent::MenuDismiss => "menu_dismiss",
            UiEvent::OpenSettings => "open_settings",
            UiEvent::CloseSettings => "close_settings",
            UiEvent::CalibrateTrays => "calibrate_trays",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
    Start,
    /// Still driving; the code says what is in the way.
    Obstacle(i32),
    Complete,
    Abort(i32),
}

impl NavigationStatus {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationStatus::Start => "start",
            NavigationStatus::Obstacle(_) => "obstacle",
            NavigationStatus::Complete => "complete",
            NavigationStatus::Abort(_) => "abort",
        }
    }
}

/// Status callback for a navigation request.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub location: String,
    pub status: NavigationStatus,
}

impl NavigationEvent {
    pub fn new(location: impl Into<String>, status: NavigationStatus) -> Self {
        NavigationEvent {
            location: location.into(),
            status,
        }
    }
}
