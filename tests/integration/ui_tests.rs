//! Two-button UI: gesture → command → screen / link / log effects.

use super::mock_board::{CaptureLink, MockBoard, Rig, temp_log};

use levelsense::app::commands::AppCommand;
use levelsense::app::events::AppEvent;
use levelsense::config::DeviceSettings;
use levelsense::drivers::button::ButtonId;
use levelsense::fsm::StateId;
use levelsense::link::MessageType;
use levelsense::logstore::LOG_SIZE_LIMIT;
use levelsense::power::WakeReason;
use levelsense::sensors::water_level::WaterLevel;
use levelsense::ui::{ClockText, Menu};

/// Display stays on for the whole of each test.
fn ui_settings() -> DeviceSettings {
    DeviceSettings {
        display_sleep_timeout_secs: 30,
        ..DeviceSettings::default()
    }
}

fn active(name: &str) -> Rig {
    let mut rig = Rig::boot(
        ui_settings(),
        WakeReason::ExternalSignal,
        temp_log(name, LOG_SIZE_LIMIT),
    );
    rig.poll_at(0);
    rig
}

#[test]
fn instructions_drawn_on_first_refresh() {
    let mut rig = active("ui-instructions");
    assert!(rig.hw.renders().is_empty());
    rig.poll_at(500);
    let drawn = rig.hw.renders();
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].starts_with("LeftButton: [Water Level]"));
}

#[test]
fn left_click_shows_water_level() {
    let mut rig = active("ui-water");
    rig.click(ButtonId::Left);
    assert_eq!(rig.svc.ui().menu(), Menu::WaterLevel);

    rig.seconds(1);
    assert_eq!(rig.hw.renders().last().copied(), Some("Water Level is\nOK"));
}

#[test]
fn water_screen_redraws_when_the_level_changes() {
    let mut rig = active("ui-water-change");
    rig.click(ButtonId::Left);
    rig.seconds(1);
    let before = rig.hw.renders().len();

    // Unchanged value: no redraw.
    rig.seconds(1);
    assert_eq!(rig.hw.renders().len(), before);

    // Next sampling period picks up the new level.
    rig.hw.water = Ok(WaterLevel::Low);
    rig.seconds(8);
    assert_eq!(rig.hw.renders().last().copied(), Some("Water Level is\nLOW"));
}

#[test]
fn right_click_shows_battery() {
    let mut rig = active("ui-battery");
    rig.click(ButtonId::Right);
    rig.seconds(1);
    assert_eq!(
        rig.hw.renders().last().copied(),
        Some("Charge: 70%\nVoltage: 3.90V")
    );
}

#[test]
fn left_long_press_scans_networks() {
    let link = CaptureLink {
        networks: vec![("home", -40), ("guest", -70)],
        ..CaptureLink::default()
    };
    let mut rig = Rig::boot_with(
        ui_settings(),
        MockBoard::new(WakeReason::ExternalSignal),
        link,
        temp_log("ui-scan", LOG_SIZE_LIMIT),
    );
    rig.poll_at(0);

    rig.long_press(ButtonId::Left);
    assert!(rig.sink.contains(&AppEvent::Command(AppCommand::WifiScan)));
    assert_eq!(rig.svc.ui().networks().len(), 2);

    rig.seconds(1);
    assert_eq!(
        rig.hw.renders().last().copied(),
        Some("Scan Network\nhome (-40)\nguest (-70)")
    );
}

#[test]
fn right_long_press_goes_to_sleep() {
    let mut rig = active("ui-sleep-now");
    rig.long_press(ButtonId::Right);

    assert!(rig.sink.contains(&AppEvent::Command(AppCommand::SleepNow)));
    assert_eq!(rig.svc.ui().menu(), Menu::DeepSleep);
    assert_eq!(rig.hw.renders().last().copied(), Some("Press again to wake up"));
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);
}

#[test]
fn right_double_click_publishes_log_tail() {
    let mut rig = active("ui-publish");
    rig.svc.log().append("[INFO] tank: refilled").unwrap();

    rig.double_click(ButtonId::Right);
    assert!(rig.sink.contains(&AppEvent::Command(AppCommand::PublishLog)));

    let logs = rig.link.messages_of(MessageType::Log);
    assert_eq!(logs.len(), 1);
    let doc: serde_json::Value = serde_json::from_str(&logs[0]).unwrap();
    assert_eq!(doc["content"], "[INFO] tank: refilled\n");
}

#[test]
fn left_double_click_truncates_log() {
    let mut rig = active("ui-truncate");
    rig.svc.log().append("[INFO] tank: refilled").unwrap();
    assert!(rig.svc.log().size() > 0);

    rig.double_click(ButtonId::Left);
    assert!(rig.sink.contains(&AppEvent::Command(AppCommand::TruncateLog)));
    assert_eq!(rig.svc.log().size(), 0);
}

#[test]
fn clock_drawn_once_per_change() {
    let mut rig = active("ui-clock");
    rig.hw.clock = ClockText::try_from("2024-05-01 14:03:12").ok();
    rig.seconds(2);
    let clock_draws = |rig: &Rig| {
        rig.hw
            .renders()
            .iter()
            .filter(|s| s.starts_with("2024-"))
            .count()
    };
    assert_eq!(clock_draws(&rig), 1);

    rig.hw.clock = ClockText::try_from("2024-05-01 14:03:13").ok();
    rig.seconds(1);
    assert_eq!(clock_draws(&rig), 2);
}
