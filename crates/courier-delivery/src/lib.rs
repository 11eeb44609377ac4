#![doc = "Delivery workflow for a three-tray delivery robot."]
#![doc = ""]
#![doc = "The [`Coordinator`] owns the workflow phase (Idle, Going, Arrived, admin"]
#![doc = "menu) and reacts to UI input, navigation status, tray bus frames, settings"]
#![doc = "writes and timer tickets. The robot itself and the timer runtime are"]
#![doc = "injected through the [`Platform`] and [`Scheduler`] traits."]

pub mod assignment;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod job;
pub mod password;
pub mod phase;
pub mod platform;
pub mod settings;
pub mod timer;
pub mod tray;
pub mod view;

mod arrival;
mod going;
mod idle;
mod menu;

pub use assignment::{Destination, DestinationPolicy, TrayAssignment};
pub use coordinator::Coordinator;
pub use error::DeliveryError;
pub use event::{Event, MenuChoice, NavigationEvent, NavigationStatus, UiEvent};
pub use job::{Job, Stop, StopKind};
pub use password::{PasswordGate, Verdict};
pub use phase::{ArrivedState, GoingState, IdleState, PhaseState};
pub use platform::{BLOCKED_TOO_LONG, OBSTACLE_CODES, Platform};
pub use settings::{SettingField, SettingUpdate, Settings, SharedSettings};
pub use timer::{Scheduler, TimerKind, TimerTicket};
pub use tray::Tray;
pub use view::{DeliveryView, PhaseKind};
