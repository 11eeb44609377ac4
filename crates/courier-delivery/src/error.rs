use thiserror::Error;

use crate::settings::SettingField;

/// Everything the delivery core can report back to its caller.
///
/// None of these is fatal: [`crate::Coordinator::dispatch`] logs them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// An inbound serial buffer could not be decoded.
    #[error("malformed serial frame: {0}")]
    MalformedFrame(#[from] courier_serial::MalformedFrame),

    /// The event does not apply to the phase the workflow is in.
    #[error("{event} is not accepted while {phase}")]
    InvalidTransition {
        event: &'static str,
        phase: &'static str,
    },

    /// A settings write was rejected; the previous value stays.
    #[error("invalid value for {field}: {reason}")]
    InvalidSetting { field: SettingField, reason: String },

    /// The settings source could not be read; last-known values stay in effect.
    #[error("settings unavailable: {0}")]
    SettingsUnavailable(String),
}

impl DeliveryError {
    pub(crate) fn invalid_setting(field: SettingField, reason: impl Into<String>) -> Self {
        DeliveryError::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
