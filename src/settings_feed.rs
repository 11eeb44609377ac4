use std::time::Duration;

use courier_delivery::{DeliveryError, Event, SettingUpdate, Settings};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{SettingsFile, read_config};

/// Fields that differ between what the feed last saw and what the file says
/// now. `known` is moved forward to the new values.
pub fn changes(known: &mut Settings, file: &SettingsFile) -> Vec<SettingUpdate> {
    let next = file.overlay(known);
    let updates = known.diff(&next);
    *known = next;
    updates
}

fn read_settings(path: &str) -> Result<SettingsFile, DeliveryError> {
    read_config(path)
        .map(|config| config.settings)
        .map_err(|e| DeliveryError::SettingsUnavailable(e.to_string()))
}

/// Re-read `[settings]` every `period` and queue whatever changed.
/// An unreadable file keeps the last-known values.
pub async fn settings_feed(
    path: String,
    period: Duration,
    mut known: Settings,
    tx: mpsc::Sender<Event>,
) -> anyhow::Result<()> {
    info!(path = %path, ?period, "Settings feed started.");
    let mut tick = time::interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and startup already applied the file.
    tick.tick().await;

    loop {
        tick.tick().await;
        let file = match read_settings(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "keeping last-known settings");
                continue;
            }
        };

        for update in changes(&mut known, &file) {
            debug!(field = %update.field(), "settings file changed");
            if tx.send(Event::Settings(update)).await.is_err() {
                info!("Event queue closed, settings feed stopping.");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_delivery::SettingField;

    #[test]
    fn test_changes_reports_only_differences() {
        let mut known = Settings::default();
        let file = SettingsFile {
            password: Some("0000".into()),
            arrive_timeout_secs: Some(45),
            idle_location: Some("dock".into()),
            ..SettingsFile::default()
        };

        let updates = changes(&mut known, &file);
        let fields: Vec<SettingField> = updates.iter().map(SettingUpdate::field).collect();
        assert_eq!(
            fields,
            vec![SettingField::IdleLocation, SettingField::ArriveTimeout]
        );
        assert_eq!(known.arrive_timeout_secs, 45);

        assert!(changes(&mut known, &file).is_empty());
    }

    #[test]
    fn test_invalid_value_keeps_last_known() {
        let mut known = Settings::default();
        let file = SettingsFile {
            pause_timeout_secs: Some(0),
            ..SettingsFile::default()
        };
        assert!(changes(&mut known, &file).is_empty());
        assert_eq!(known.pause_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        assert!(matches!(
            read_settings("config/does-not-exist.toml"),
            Err(DeliveryError::SettingsUnavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_survives_missing_file() {
        let (tx, mut rx) = mpsc::channel(4);
        let feed = tokio::spawn(settings_feed(
            "config/does-not-exist.toml".into(),
            Duration::from_secs(1),
            Settings::default(),
            tx,
        ));
        time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
        assert!(!feed.is_finished());
        feed.abort();
    }
}
