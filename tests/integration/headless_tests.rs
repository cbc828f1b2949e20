//! Headless mode: one sampling pass, then straight to deep sleep.

use core::sync::atomic::AtomicU32;

use super::mock_board::{BoardCall, CaptureLink, MockBoard, RecordingSink, Rig, temp_log};

use levelsense::app::events::AppEvent;
use levelsense::app::service::DeviceService;
use levelsense::config::{DeviceSettings, RunMode};
use levelsense::drivers::button::ButtonId;
use levelsense::error::SensorError;
use levelsense::fsm::StateId;
use levelsense::link::{MessageType, NullTransport};
use levelsense::logstore::LOG_SIZE_LIMIT;
use levelsense::power::{BootCounter, SleepAction, WakeReason};

fn headless() -> DeviceSettings {
    DeviceSettings {
        run_mode: RunMode::Headless,
        deep_sleep_wakeup_secs: 1800,
        ..DeviceSettings::default()
    }
}

#[test]
fn one_pass_then_deep_sleep_with_no_periodic_tasks() {
    let mut rig = Rig::boot(
        headless(),
        WakeReason::Timer,
        temp_log("hl-pass", LOG_SIZE_LIMIT),
    );

    assert_eq!(rig.svc.scheduler().registered_count(), 0);
    assert_eq!(rig.svc.state(), StateId::IdlePolling);
    assert!(rig.link.frames.is_empty());

    rig.poll_at(0);
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);
    assert_eq!(rig.link.messages_of(MessageType::SensorInfo).len(), 2);
    assert_eq!(rig.svc.next_sleep_action(), SleepAction::DeepSleep);

    rig.enter_deep_sleep().unwrap();
    let ext = rig.hw.calls.iter().position(|c| matches!(c, BoardCall::ArmExternal { .. }));
    let timer = rig.hw.position(&BoardCall::ArmTimer(1800));
    let halt = rig.hw.position(&BoardCall::DeepSleep);
    assert!(ext.is_some() && timer.is_some());
    assert!(ext < halt && timer < halt);

    assert_eq!(rig.hw.count(&BoardCall::PowerOn), 0);
    assert_eq!(rig.svc.scheduler().registered_count(), 0);
}

#[test]
fn buttons_are_ignored() {
    let mut rig = Rig::boot(
        headless(),
        WakeReason::ExternalSignal,
        temp_log("hl-buttons", LOG_SIZE_LIMIT),
    );
    rig.hw.pressed = Some(ButtonId::Right);
    rig.poll_at(0);
    rig.poll_at(100);
    rig.hw.pressed = None;
    rig.poll_at(500);

    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::Command(_))));
    assert_eq!(rig.hw.count(&BoardCall::PowerOn), 0);
    assert!(rig.hw.renders().is_empty());
}

#[test]
fn failed_read_sends_nothing_for_that_sensor() {
    let mut hw = MockBoard::new(WakeReason::Timer);
    hw.battery = Err(SensorError::OutOfRange);
    let mut rig = Rig::boot_with(
        headless(),
        hw,
        CaptureLink::default(),
        temp_log("hl-fail", LOG_SIZE_LIMIT),
    );
    rig.poll_at(0);

    assert_eq!(
        rig.link.messages_of(MessageType::SensorInfo),
        vec![r#"{"idx":8,"nvalue":0}"#.to_string()]
    );
    assert_eq!(rig.svc.state(), StateId::DeepSleepPending);
    assert!(rig.svc.battery().value().current().is_none());
}

#[test]
fn full_log_is_drained_over_the_link_before_sleep() {
    let log = temp_log("hl-drain", 20);
    log.append("0123456789abcdefghi").unwrap();
    assert!(log.is_full());

    let mut rig = Rig::boot(headless(), WakeReason::Timer, log);
    rig.poll_at(0);
    rig.enter_deep_sleep().unwrap();

    assert!(rig.sink.contains(&AppEvent::LogRotated { drained: true }));
    assert_eq!(
        rig.link.messages_of(MessageType::Log),
        vec!["0123456789abcdefghi\n".to_string()]
    );
    assert_eq!(rig.svc.log().size(), 0);
}

#[test]
fn full_log_is_reset_when_the_link_refuses() {
    let log = temp_log("hl-reset", 20);
    log.append("0123456789abcdefghi").unwrap();

    let link = CaptureLink {
        reject: true,
        ..CaptureLink::default()
    };
    let mut rig = Rig::boot_with(headless(), MockBoard::new(WakeReason::Timer), link, log);
    rig.poll_at(0);
    assert!(rig.sink.contains(&AppEvent::SendFailed {
        kind: MessageType::SensorInfo
    }));

    rig.enter_deep_sleep().unwrap();
    assert!(rig.sink.contains(&AppEvent::LogRotated { drained: false }));
    assert_eq!(rig.svc.log().size(), 0);
    assert_eq!(rig.hw.count(&BoardCall::DeepSleep), 1);
}

#[test]
fn full_log_is_kept_while_the_link_is_offline() {
    let log = temp_log("hl-offline", 20);
    log.append("0123456789abcdefghi").unwrap();
    assert!(log.is_full());

    let cell: &'static AtomicU32 = Box::leak(Box::new(AtomicU32::new(0)));
    let mut hw = MockBoard::new(WakeReason::Timer);
    let mut link = NullTransport;
    let mut sink = RecordingSink::default();
    let mut svc = DeviceService::new(headless(), log);
    svc.boot(&BootCounter::with_cell(cell), &mut hw, &mut link, &mut sink);
    svc.poll(0, &mut hw, &mut link, &mut sink);
    svc.enter_deep_sleep(&mut hw, &mut link, &mut sink).unwrap();

    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::LogRotated { .. })));
    assert_eq!(svc.log().size(), 20);
    assert_eq!(svc.log().read_tail().unwrap(), b"0123456789abcdefghi\n");
    assert_eq!(hw.count(&BoardCall::DeepSleep), 1);
}
