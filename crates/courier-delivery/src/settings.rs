//! Live operator settings.
//!
//! Each field is its own cell: writes are last-write-wins and never grouped.
//! The coordinator reads a snapshot at the point of use, so a change is
//! picked up by the next operation that needs it.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

pub const DEFAULT_PASSWORD: &str = "0000";
pub const DEFAULT_IDLE_LOCATION: &str = "home base";
pub const DEFAULT_ARRIVE_TIMEOUT_SECS: u32 = 30;
pub const DEFAULT_PAUSE_TIMEOUT_SECS: u32 = 30;

/// Longest accepted timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u32 = 3600;
/// Longest accepted password.
pub const MAX_PASSWORD_DIGITS: usize = 4;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub password: String,
    pub idle_location: String,
    pub arrive_timeout_secs: u32,
    pub pause_timeout_secs: u32,
    pub start_speech: String,
    pub obstacle_speech: String,
    pub arrive_speech: String,
    pub next_location_speech: String,
    pub wrong_tray_speech: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            password: DEFAULT_PASSWORD.to_string(),
            idle_location: DEFAULT_IDLE_LOCATION.to_string(),
            arrive_timeout_secs: DEFAULT_ARRIVE_TIMEOUT_SECS,
            pause_timeout_secs: DEFAULT_PAUSE_TIMEOUT_SECS,
            start_speech: "Start delivery".to_string(),
            obstacle_speech: "Obstacle detected".to_string(),
            arrive_speech: "Arrived at location. Please take your order from the tray."
                .to_string(),
            next_location_speech: "Going to next location".to_string(),
            wrong_tray_speech:
                "Wrong tray, please put the tray back and take the correct tray.".to_string(),
        }
    }
}

impl Settings {
    pub fn arrive_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.arrive_timeout_secs))
    }

    pub fn pause_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.pause_timeout_secs))
    }

    /// Validate and write one field; on error the field keeps its value.
    pub fn set(&mut self, update: SettingUpdate) -> Result<(), DeliveryError> {
        update.validate()?;
        match update {
            SettingUpdate::Password(v) => self.password = v,
            SettingUpdate::IdleLocation(v) => self.idle_location = v,
            SettingUpdate::ArriveTimeout(v) => self.arrive_timeout_secs = v,
            SettingUpdate::PauseTimeout(v) => self.pause_timeout_secs = v,
            SettingUpdate::StartSpeech(v) => self.start_speech = v,
            SettingUpdate::ObstacleSpeech(v) => self.obstacle_speech = v,
            SettingUpdate::ArriveSpeech(v) => self.arrive_speech = v,
            SettingUpdate::NextLocationSpeech(v) => self.next_location_speech = v,
            SettingUpdate::WrongTraySpeech(v) => self.wrong_tray_speech = v,
        }
        Ok(())
    }

    /// Updates that would turn `self` into `other`, one per differing field.
    pub fn diff(&self, other: &Settings) -> Vec<SettingUpdate> {
        let mut out = Vec::new();
        if self.password != other.password {
            out.push(SettingUpdate::Password(other.password.clone()));
        }
        if self.idle_location != other.idle_location {
            out.push(SettingUpdate::IdleLocation(other.idle_location.clone()));
        }
        if self.arrive_timeout_secs != other.arrive_timeout_secs {
            out.push(SettingUpdate::ArriveTimeout(other.arrive_timeout_secs));
        }
        if self.pause_timeout_secs != other.pause_timeout_secs {
            out.push(SettingUpdate::PauseTimeout(other.pause_timeout_secs));
        }
        if self.start_speech != other.start_speech {
            out.push(SettingUpdate::StartSpeech(other.start_speech.clone()));
        }
        if self.obstacle_speech != other.obstacle_speech {
            out.push(SettingUpdate::ObstacleSpeech(other.obstacle_speech.clone()));
        }
        if self.arrive_speech != other.arrive_speech {
            out.push(SettingUpdate::ArriveSpeech(other.arrive_speech.clone()));
        }
        if self.next_location_speech != other.next_location_speech {
            out.push(SettingUpdate::NextLocationSpeech(
                other.next_location_speech.clone(),
            ));
        }
        if self.wrong_tray_speech != other.wrong_tray_speech {
            out.push(SettingUpdate::WrongTraySpeech(other.wrong_tray_speech.clone()));
        }
        out
    }
}

/// Name of a settings field, in snake case on the wire and in config files.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    Password,
    IdleLocation,
    ArriveTimeout,
    PauseTimeout,
    StartSpeech,
    ObstacleSpeech,
    ArriveSpeech,
    NextLocationSpeech,
    WrongTraySpeech,
}

impl SettingField {
    pub const ALL: [SettingField; 9] = [
        SettingField::Password,
        SettingField::IdleLocation,
        SettingField::ArriveTimeout,
        SettingField::PauseTimeout,
        SettingField::StartSpeech,
        SettingField::ObstacleSpeech,
        SettingField::ArriveSpeech,
        SettingField::NextLocationSpeech,
        SettingField::WrongTraySpeech,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SettingField::Password => "password",
            SettingField::IdleLocation => "idle_location",
            SettingField::ArriveTimeout => "arrive_timeout_secs",
            SettingField::PauseTimeout => "pause_timeout_secs",
            SettingField::StartSpeech => "start_speech",
            SettingField::ObstacleSpeech => "obstacle_speech",
            SettingField::ArriveSpeech => "arrive_speech",
            SettingField::NextLocationSpeech => "next_location_speech",
            SettingField::WrongTraySpeech => "wrong_tray_speech",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown setting '{}'", s))
    }
}

/// A write to a single settings field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingUpdate {
    Password(String),
    IdleLocation(String),
    ArriveTimeout(u32),
    PauseTimeout(u32),
    StartSpeech(String),
    ObstacleSpeech(String),
    ArriveSpeech(String),
    NextLocationSpeech(String),
    WrongTraySpeech(String),
}

impl SettingUpdate {
    /// Build an update from a field and its textual value, then validate it.
    pub fn parse(field: SettingField, value: &str) -> Result<Self, DeliveryError> {
        let seconds = |v: &str| {
            v.trim().parse::<u32>().map_err(|e| {
                DeliveryError::invalid_setting(field, format!("'{}' is not a number: {}", v, e))
            })
        };
        let update = match field {
            SettingField::Password => SettingUpdate::Password(value.trim().to_string()),
            SettingField::IdleLocation => SettingUpdate::IdleLocation(value.trim().to_string()),
            SettingField::ArriveTimeout => SettingUpdate::ArriveTimeout(seconds(value)?),
            SettingField::PauseTimeout => SettingUpdate::PauseTimeout(seconds(value)?),
            SettingField::StartSpeech => SettingUpdate::StartSpeech(value.to_string()),
            SettingField::ObstacleSpeech => SettingUpdate::ObstacleSpeech(value.to_string()),
            SettingField::ArriveSpeech => SettingUpdate::ArriveSpeech(value.to_string()),
            SettingField::NextLocationSpeech => {
                SettingUpdate::NextLocationSpeech(value.to_string())
            }
            SettingField::WrongTraySpeech => SettingUpdate::WrongTraySpeech(value.to_string()),
        };
        update.validate()?;
        Ok(update)
    }

    pub fn field(&self) -> SettingField {
        match self {
            SettingUpdate::Password(_) => SettingField::Password,
            SettingUpdate::IdleLocation(_) => SettingField::IdleLocation,
            SettingUpdate::ArriveTimeout(_) => SettingField::ArriveTimeout,
            SettingUpdate::PauseTimeout(_) => SettingField::PauseTimeout,
            SettingUpdate::StartSpeech(_) => SettingField::StartSpeech,
            SettingUpdate::ObstacleSpeech(_) => SettingField::ObstacleSpeech,
            SettingUpdate::ArriveSpeech(_) => SettingField::ArriveSpeech,
            SettingUpdate::NextLocationSpeech(_) => SettingField::NextLocationSpeech,
            SettingUpdate::WrongTraySpeech(_) => SettingField::WrongTraySpeech,
        }
    }

    /// Password: 1 to 4 ASCII digits. Timeouts: 1 to 3600 seconds.
    /// Idle location: not blank. Phrases: anything.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        let field = self.field();
        match self {
            SettingUpdate::Password(p) => {
                if p.is_empty() || p.len() > MAX_PASSWORD_DIGITS {
                    return Err(DeliveryError::invalid_setting(
                        field,
                        format!("must be 1 to {} digits", MAX_PASSWORD_DIGITS),
                    ));
                }
                if !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DeliveryError::invalid_setting(field, "digits only"));
                }
            }
            SettingUpdate::IdleLocation(l) => {
                if l.trim().is_empty() {
                    return Err(DeliveryError::invalid_setting(field, "must not be empty"));
                }
            }
            SettingUpdate::ArriveTimeout(secs) | SettingUpdate::PauseTimeout(secs) => {
                if !(1..=MAX_TIMEOUT_SECS).contains(secs) {
                    return Err(DeliveryError::invalid_setting(
                        field,
                        format!("{} s is outside 1..={}", secs, MAX_TIMEOUT_SECS),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Versioned {
    settings: Settings,
    version: u64,
}

/// Shared, versioned settings snapshot.
///
/// Cloning is cheap; every clone sees the same cells.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Versioned>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        SharedSettings {
            inner: Arc::new(RwLock::new(Versioned {
                settings,
                version: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner.read().settings.clone()
    }

    /// Read a single value without cloning the whole snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        f(&self.inner.read().settings)
    }

    /// Bumped once per accepted write.
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Validate and store one field. Returns the new version.
    pub fn apply(&self, update: SettingUpdate) -> Result<u64, DeliveryError> {
        let mut g = self.inner.write();
        g.settings.set(update)?;
        g.version += 1;
        Ok(g.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.password, "0000");
        assert_eq!(s.idle_location, "home base");
        assert_eq!(s.arrive_timeout(), Duration::from_secs(30));
        assert_eq!(s.pause_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_apply_bumps_version_per_field() {
        let shared = SharedSettings::default();
        assert_eq!(shared.version(), 0);
        assert_eq!(shared.apply(SettingUpdate::Password("1234".into())), Ok(1));
        assert_eq!(shared.apply(SettingUpdate::ArriveTimeout(10)), Ok(2));

        let snap = shared.snapshot();
        assert_eq!(snap.password, "1234");
        assert_eq!(snap.arrive_timeout_secs, 10);
        assert_eq!(snap.pause_timeout_secs, DEFAULT_PAUSE_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let shared = SharedSettings::default();
        for bad in [
            SettingUpdate::Password("12345".into()),
            SettingUpdate::Password("12a4".into()),
            SettingUpdate::Password(String::new()),
            SettingUpdate::ArriveTimeout(0),
            SettingUpdate::PauseTimeout(MAX_TIMEOUT_SECS + 1),
            SettingUpdate::IdleLocation("   ".into()),
        ] {
            let field = bad.field();
            assert!(matches!(
                shared.apply(bad),
                Err(DeliveryError::InvalidSetting { field: f, .. }) if f == field
            ));
        }
        assert_eq!(shared.version(), 0);
        assert_eq!(shared.snapshot(), Settings::default());
    }

    #[test]
    fn test_parse_from_text() {
        assert_eq!(
            SettingUpdate::parse(SettingField::PauseTimeout, " 45 "),
            Ok(SettingUpdate::PauseTimeout(45))
        );
        assert!(SettingUpdate::parse(SettingField::ArriveTimeout, "soon").is_err());
        assert_eq!(
            "next_location_speech".parse::<SettingField>(),
            Ok(SettingField::NextLocationSpeech)
        );
        assert!("volume".parse::<SettingField>().is_err());
    }

    #[test]
    fn test_diff_lists_changed_fields_only() {
        let old = Settings::default();
        let mut new = old.clone();
        new.idle_location = "dock".into();
        new.pause_timeout_secs = 12;
        assert_eq!(
            old.diff(&new),
            vec![
                SettingUpdate::IdleLocation("dock".into()),
                SettingUpdate::PauseTimeout(12)
            ]
        );
        assert!(new.diff(&new).is_empty());
    }
}
