//! Power lifecycle: wake classification, idle countdowns and the
//! deep-sleep entry sequence.

use super::mock_board::{BoardCall, Rig, quick_settings, temp_log};

use levelsense::app::commands::AppCommand;
use levelsense::app::events::AppEvent;
use levelsense::drivers::button::ButtonId;
use levelsense::fsm::StateId;
use levelsense::link::MessageType;
use levelsense::logstore::LOG_SIZE_LIMIT;
use levelsense::pins;
use levelsense::power::{SleepAction, WakeReason};
use levelsense::ui::Menu;

fn interactive(wake: WakeReason, name: &str) -> Rig {
    let mut rig = Rig::boot(quick_settings(), wake, temp_log(name, LOG_SIZE_LIMIT));
    rig.poll_at(0);
    rig
}

// ── Wake classification ───────────────────────────────────────

#[test]
fn button_wake_activates_display_and_samples_at_boot() {
    let rig = interactive(WakeReason::ExternalSignal, "button-wake");

    assert_eq!(rig.svc.state(), StateId::Active);
    assert_eq!(rig.hw.count(&BoardCall::PowerOn), 1);
    assert!(rig.sink.contains(&AppEvent::Booted {
        wake: WakeReason::ExternalSignal,
        boot_count: 1,
    }));

    let sent = rig.link.messages_of(MessageType::SensorInfo);
    assert_eq!(
        sent,
        vec![
            r#"{"idx":8,"nvalue":0}"#.to_string(),
            r#"[{"idx":6,"nvalue":0,"svalue":"3.90"},{"idx":7,"nvalue":0,"svalue":"70"}]"#
                .to_string(),
        ]
    );
}

#[test]
fn timer_wake_never_powers_the_display() {
    let mut rig = interactive(WakeReason::Timer, "timer-wake");
    assert_eq!(rig.svc.state(), StateId::DisplaySleeping);
    assert!(rig.svc.context().display_suppressed);

    rig.seconds(5);
    rig.click(ButtonId::Right);
    assert_eq!(rig.svc.state(), StateId::DisplaySleeping);
    // The press only resets the countdown; no menu command runs.
    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::Command(_))));

    rig.seconds(9);
    assert_eq!(rig.svc.state(), StateId::DisplaySleeping);
    rig.seconds(1);
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);

    assert_eq!(rig.hw.count(&BoardCall::PowerOn), 0);
    assert!(rig.hw.renders().is_empty());
}

// ── Idle countdowns ───────────────────────────────────────────

#[test]
fn timers_reset_to_max_after_n_minus_one_ticks_and_a_press() {
    let mut rig = interactive(WakeReason::ExternalSignal, "timer-reset");

    rig.seconds(2);
    assert_eq!(rig.svc.context().display_timer.remaining(), 1);
    assert_eq!(rig.svc.context().deep_sleep_timer.remaining(), 8);

    rig.click(ButtonId::Right);
    assert_eq!(rig.svc.context().display_timer.remaining(), 3);
    assert_eq!(rig.svc.context().deep_sleep_timer.remaining(), 10);
    assert_eq!(rig.svc.state(), StateId::Active);
    assert!(rig
        .sink
        .contains(&AppEvent::Command(AppCommand::ShowMenu(Menu::BatteryInfo))));
}

#[test]
fn display_sleeps_then_wakes_on_press() {
    let mut rig = interactive(WakeReason::ExternalSignal, "display-cycle");

    rig.seconds(3);
    assert_eq!(rig.svc.state(), StateId::DisplaySleeping);
    let last_power = rig
        .hw
        .calls
        .iter()
        .rev()
        .find(|c| matches!(c, BoardCall::PowerOn | BoardCall::PowerOff));
    assert_eq!(last_power, Some(&BoardCall::PowerOff));
    assert!(matches!(rig.svc.next_sleep_action(), SleepAction::LightSleep(_)));

    rig.click(ButtonId::Left);
    assert_eq!(rig.svc.state(), StateId::Active);
    assert_eq!(rig.hw.count(&BoardCall::PowerOn), 2);
    assert!(matches!(rig.svc.next_sleep_action(), SleepAction::Delay(_)));
}

#[test]
fn inactivity_leads_to_deep_sleep_pending() {
    let mut rig = interactive(WakeReason::Unknown, "inactivity");

    rig.seconds(9);
    assert_eq!(rig.svc.state(), StateId::DisplaySleeping);
    rig.seconds(1);
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);
    assert_eq!(rig.svc.next_sleep_action(), SleepAction::DeepSleep);
}

// ── Deep-sleep entry ──────────────────────────────────────────

#[test]
fn deep_sleep_arms_both_wake_sources_before_halting() {
    let mut rig = interactive(WakeReason::ExternalSignal, "arm-order");
    rig.seconds(10);
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);

    rig.enter_deep_sleep().unwrap();

    let ext = rig
        .hw
        .position(&BoardCall::ArmExternal {
            gpio: pins::WAKE_GPIO,
            level: pins::WAKE_LEVEL,
        })
        .expect("external wake armed");
    let timer = rig.hw.position(&BoardCall::ArmTimer(600)).expect("timer wake armed");
    let halt = rig.hw.position(&BoardCall::DeepSleep).expect("halted");
    let settle = rig
        .hw
        .calls
        .iter()
        .rposition(|c| matches!(c, BoardCall::LightSleep(_)))
        .expect("settle delay");

    assert!(settle < ext && settle < timer);
    assert!(ext < halt && timer < halt);
    assert_eq!(rig.hw.calls.last(), Some(&BoardCall::DeepSleep));
    assert_eq!(rig.svc.state(), StateId::DeepSleep);
    assert!(rig.sink.contains(&AppEvent::EnteringDeepSleep { wakeup_secs: 600 }));
}

#[test]
fn failing_wake_source_is_fatal_and_never_halts() {
    let mut rig = interactive(WakeReason::ExternalSignal, "arm-fail");
    rig.hw.fail_timer_arm = true;

    let err = rig.enter_deep_sleep().unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(rig.hw.count(&BoardCall::DeepSleep), 0);
    assert_ne!(rig.svc.state(), StateId::DeepSleep);
}
