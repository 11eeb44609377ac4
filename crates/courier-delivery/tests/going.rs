mod common;

use std::time::Duration;

use common::{Call, HOME, Harness, arrived, going_index};
use courier_delivery::{
    BLOCKED_TOO_LONG, GoingState, MenuChoice, NavigationStatus, PhaseState, SettingUpdate,
    TimerKind, Tray, UiEvent,
};
use courier_serial::Rgb;

fn paused(h: &Harness) -> bool {
    matches!(h.phase(), PhaseState::Going(GoingState { paused: true, .. }))
}

#[test]
fn test_start_shows_destination_on_lcd() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Start);
    assert_eq!(h.lcd_texts(), vec!["Room 5".to_string()]);
}

#[test]
fn test_obstacle_speaks_without_phase_change() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Obstacle(2001));
    h.nav("Room 5", NavigationStatus::Obstacle(17));
    assert_eq!(h.spoken(), vec!["Obstacle detected".to_string()]);
    assert_eq!(going_index(h.phase()), Some(0));
}

#[test]
fn test_complete_at_destination_arrives() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Complete);

    let state = arrived(h.phase()).unwrap();
    assert_eq!(state.stop_index, 0);
    assert_eq!(state.remaining_millis, 30_000);
    assert!(!state.wrong_tray);
    assert_eq!(
        h.calls(),
        vec![
            Call::AmbienceOff,
            Call::Speak("Arrived at location. Please take your order from the tray.".into()),
        ]
    );
    assert_eq!(h.armed(TimerKind::ArriveCountdown), Some(Duration::from_secs(1)));
}

#[test]
fn test_stale_complete_is_ignored() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 9", NavigationStatus::Complete);
    assert_eq!(going_index(h.phase()), Some(0));
    assert!(h.calls().is_empty());
}

#[test]
fn test_complete_at_idle_location_returns_to_idle() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav(HOME, NavigationStatus::Complete);

    assert!(h.phase().is_idle());
    assert!(h.coordinator.job().is_empty());
    let calls = h.calls();
    assert!(calls.contains(&Call::AmbienceOff));
    assert!(calls.contains(&Call::Listeners(false)));
    assert_eq!(h.tray_lights().len(), 3);
    assert!(h.tray_lights().iter().all(|l| l.color == Rgb::OFF));
    assert_eq!(h.lcd_texts(), vec![String::new()]);
}

#[test]
fn test_delivery_stop_named_like_idle_location_is_delivered() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5"), (Tray::Middle, "Room 6")]);
    h.settings
        .apply(SettingUpdate::IdleLocation("Room 5".into()))
        .unwrap();

    h.nav("Room 5", NavigationStatus::Complete);
    let state = arrived(h.phase()).unwrap();
    assert_eq!(state.stop_index, 0);
    assert_eq!(h.coordinator.job().len(), 2);
}

#[test]
fn test_complete_at_idle_location_drops_remaining_stops() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5"), (Tray::Middle, "Room 6")]);
    h.nav(HOME, NavigationStatus::Complete);

    assert!(h.phase().is_idle());
    assert!(h.coordinator.job().is_empty());
}

#[test]
fn test_pause_stops_robot_and_opens_prompt() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.ui(UiEvent::Pause);

    assert!(paused(&h));
    assert!(h.coordinator.gate().is_open());
    assert_eq!(h.calls(), vec![Call::StopMovement, Call::AmbienceOff]);

    // Navigation callbacks while paused are dropped.
    h.nav("Room 5", NavigationStatus::Complete);
    assert!(paused(&h));
}

#[test]
fn test_wrong_password_resumes_unchanged() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.ui(UiEvent::Pause);
    h.take_calls();

    h.type_password("9999");
    assert!(!h.coordinator.gate().is_open());
    assert_eq!(
        h.phase(),
        &PhaseState::Going(GoingState {
            stop_index: 0,
            paused: false
        })
    );
    assert_eq!(h.navigations(), vec!["Room 5".to_string()]);
}

#[test]
fn test_dismissing_prompt_resumes() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.ui(UiEvent::Pause);
    h.ui(UiEvent::PasswordDigit(4));
    h.ui(UiEvent::PasswordDismiss);
    assert!(!paused(&h));
    assert_eq!(h.navigations(), vec!["Room 5".to_string()]);
}

#[test]
fn test_back_button_pauses() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.back_button();
    assert!(paused(&h));
    assert!(h.calls().contains(&Call::StopMovement));
}

#[test]
fn test_blocked_abort_pauses_and_auto_resumes() {
    let mut h = Harness::new();
    h.settings.apply(SettingUpdate::PauseTimeout(12)).unwrap();
    h.start_job(&[(Tray::Top, "Room 5")]);

    h.nav("Room 5", NavigationStatus::Abort(BLOCKED_TOO_LONG));
    assert!(paused(&h));
    assert!(h.coordinator.gate().is_open());
    assert_eq!(h.armed(TimerKind::AutoResume), Some(Duration::from_secs(12)));
    h.take_calls();

    assert!(h.fire(TimerKind::AutoResume));
    assert!(!paused(&h));
    assert!(!h.coordinator.gate().is_open());
    assert_eq!(h.navigations(), vec!["Room 5".to_string()]);
    assert_eq!(going_index(h.phase()), Some(0));
}

#[test]
fn test_other_abort_codes_are_not_handled() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Abort(1));
    assert!(!paused(&h));
    assert_eq!(h.armed(TimerKind::AutoResume), None);
}

#[test]
fn test_manual_action_cancels_auto_resume() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Abort(BLOCKED_TOO_LONG));
    h.type_password("0000");

    assert!(matches!(h.phase(), PhaseState::AdminMenu(_)));
    assert_eq!(h.armed(TimerKind::AutoResume), None);
}

#[test]
fn test_menu_abort_returns_to_idle() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5"), (Tray::Middle, "Room 6")]);
    h.ui(UiEvent::Pause);
    h.type_password("0000");
    h.take_calls();

    h.ui(UiEvent::AdminMenu(MenuChoice::AbortJob));
    assert!(h.phase().is_idle());
    assert!(h.coordinator.job().is_empty());
    let calls = h.calls();
    assert!(calls.contains(&Call::StopMovement));
    assert!(calls.contains(&Call::Listeners(false)));
    assert!(h.navigations().is_empty());
}

#[test]
fn test_menu_skip_to_idle_retargets_home() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5"), (Tray::Middle, "Room 6")]);
    h.ui(UiEvent::Pause);
    h.type_password("0000");
    h.take_calls();

    h.ui(UiEvent::AdminMenu(MenuChoice::SkipToIdle));
    assert!(!paused(&h));
    assert_eq!(h.navigations(), vec![HOME.to_string()]);
    assert_eq!(h.coordinator.job().len(), 1);
    assert!(h.coordinator.job().first().unwrap().is_return());

    h.nav(HOME, NavigationStatus::Complete);
    assert!(h.phase().is_idle());
}

#[test]
fn test_menu_resume_and_dismiss() {
    for event in [UiEvent::AdminMenu(MenuChoice::Resume), UiEvent::MenuDismiss] {
        let mut h = Harness::new();
        h.start_job(&[(Tray::Top, "Room 5")]);
        h.ui(UiEvent::Pause);
        h.type_password("0000");
        h.take_calls();

        h.ui(event);
        assert_eq!(going_index(h.phase()), Some(0));
        assert!(!paused(&h));
        assert_eq!(h.navigations(), vec!["Room 5".to_string()]);
    }
}

#[test]
fn test_ambience_failure_is_not_fatal() {
    let mut h = Harness::without_ambience();
    h.bind(Tray::Top, "Room 5");
    h.ui(UiEvent::Go);
    assert_eq!(going_index(h.phase()), Some(0));
    assert_eq!(h.navigations(), vec!["Room 5".to_string()]);
    assert!(!h.calls().contains(&Call::AmbienceOn));

    h.nav("Room 5", NavigationStatus::Complete);
    assert!(arrived(h.phase()).is_some());
}

#[test]
fn test_shutdown_releases_job_resources() {
    let mut h = Harness::new();
    h.start_job(&[(Tray::Top, "Room 5")]);
    h.nav("Room 5", NavigationStatus::Abort(BLOCKED_TOO_LONG));
    h.take_calls();

    h.coordinator.dispatch(courier_delivery::Event::Shutdown);
    assert!(h.phase().is_idle());
    assert_eq!(h.armed(TimerKind::AutoResume), None);
    let calls = h.calls();
    assert!(calls.contains(&Call::StopMovement));
    assert!(calls.contains(&Call::AmbienceOff));
    assert!(calls.contains(&Call::Listeners(false)));
}
