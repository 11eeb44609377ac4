use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use courier_delivery::{DestinationPolicy, SettingUpdate, Settings};
use serde::Deserialize;
use tracing::{error, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub settings: SettingsFile,
    pub delivery: DeliveryConfig,
    pub runtime: RuntimeConfig,
    pub sim: SimConfig,
}

/// `[settings]`: initial operator settings. Missing fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SettingsFile {
    pub password: Option<String>,
    pub idle_location: Option<String>,
    pub arrive_timeout_secs: Option<u32>,
    pub pause_timeout_secs: Option<u32>,
    pub start_speech: Option<String>,
    pub obstacle_speech: Option<String>,
    pub arrive_speech: Option<String>,
    pub next_location_speech: Option<String>,
    pub wrong_tray_speech: Option<String>,
}

impl SettingsFile {
    /// One update per field present in the file.
    pub fn updates(&self) -> Vec<SettingUpdate> {
        let f = self.clone();
        [
            f.password.map(SettingUpdate::Password),
            f.idle_location.map(SettingUpdate::IdleLocation),
            f.arrive_timeout_secs.map(SettingUpdate::ArriveTimeout),
            f.pause_timeout_secs.map(SettingUpdate::PauseTimeout),
            f.start_speech.map(SettingUpdate::StartSpeech),
            f.obstacle_speech.map(SettingUpdate::ObstacleSpeech),
            f.arrive_speech.map(SettingUpdate::ArriveSpeech),
            f.next_location_speech.map(SettingUpdate::NextLocationSpeech),
            f.wrong_tray_speech.map(SettingUpdate::WrongTraySpeech),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Overlay the file on `base`. Invalid values are logged and skipped, so
    /// the field keeps whatever `base` had.
    pub fn overlay(&self, base: &Settings) -> Settings {
        let mut out = base.clone();
        for update in self.updates() {
            let field = update.field();
            if let Err(e) = out.set(update) {
                warn!(%field, error = %e, "ignoring setting from config file");
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeliveryConfig {
    pub shared_destinations: bool,
}

impl DeliveryConfig {
    pub fn policy(&self) -> DestinationPolicy {
        if self.shared_destinations {
            DestinationPolicy::Grouped
        } else {
            DestinationPolicy::Exclusive
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bound of the ordered event queue.
    pub event_capacity: usize,
    pub settings_poll_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            event_capacity: 64,
            settings_poll_secs: 5,
        }
    }
}

impl RuntimeConfig {
    pub fn settings_poll(&self) -> Duration {
        Duration::from_secs(self.settings_poll_secs.max(1))
    }
}

/// `[sim]`: the simulated robot.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimConfig {
    pub locations: Vec<String>,
    pub start_delay_ms: u64,
    pub travel_ms: u64,
    pub ambience_track: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            locations: vec![
                courier_delivery::settings::DEFAULT_IDLE_LOCATION.to_string(),
                "Room 101".to_string(),
                "Room 102".to_string(),
            ],
            start_delay_ms: 300,
            travel_ms: 4000,
            ambience_track: None,
        }
    }
}

/// `COURIER__<SECTION>__<FIELD>` overrides. Values stay strings until serde
/// asks for a number, so a password like `0042` keeps its leading zeros.
fn environment() -> Environment {
    Environment::with_prefix("COURIER")
        .prefix_separator("__")
        .separator("__")
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: Environment,
) -> Result<AppConfig, ConfigError> {
    builder.add_source(env).build()?.try_deserialize()
}

/// Read the file and environment without logging; the settings feed calls
/// this on every poll.
pub fn read_config(path: &str) -> Result<AppConfig, ConfigError> {
    build(
        Config::builder().add_source(File::new(path, FileFormat::Toml).required(true)),
        environment(),
    )
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    match read_config(path) {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Like [`load_config`], but a missing or broken file means defaults.
pub fn load_or_default(path: &str) -> AppConfig {
    load_config(path).unwrap_or_else(|e| {
        warn!(error = %e, "using built-in configuration");
        AppConfig::default()
    })
}
