use gmc_core::{FailReason, SeverityBand};
use gmc_health::{network_ok, ChannelLevels, HealthMonitor, LampMode, StatusLamp};

const RED: ChannelLevels = ChannelLevels {
    red: true,
    green: false,
    blue: false,
};
const DARK: ChannelLevels = ChannelLevels {
    red: false,
    green: false,
    blue: false,
};

#[test]
fn test_level_is_max_of_floors() {
    let mut mon = HealthMonitor::new(3);

    // All clear.
    let h = mon.assess(SeverityBand::Normal, false, false, true);
    assert_eq!(h.level, 0);

    // Network floor alone.
    let h = mon.assess(SeverityBand::Normal, false, false, false);
    assert_eq!(h.level, 1);
    assert!(h.network_stale);

    // Warn band floor dominates the network floor.
    let h = mon.assess(SeverityBand::Warn, false, false, false);
    assert_eq!(h.level, 2);

    // Critical floor dominates everything below it.
    let h = mon.assess(SeverityBand::Danger, true, true, false);
    assert_eq!(h.level, 3);

    // Ambient critical raises to 3 even with a quiet tube.
    mon.observe_rate(30);
    let h = mon.assess(SeverityBand::Normal, false, true, true);
    assert_eq!(h.level, 3);
}

#[test]
fn test_zero_streak_latch_and_clear() {
    let mut mon = HealthMonitor::new(3);

    mon.observe_rate(0);
    mon.observe_rate(0);
    assert!(!mon.sensor_fault(), "streak of 2 must not trip a limit of 3");

    mon.observe_rate(0);
    assert!(mon.sensor_fault());
    assert_eq!(mon.assess(SeverityBand::Low, false, false, true).level, 2);

    // One live window clears the fault on that same cycle.
    mon.observe_rate(17);
    assert_eq!(mon.zero_streak(), 0);
    assert!(!mon.sensor_fault());
    assert_eq!(mon.assess(SeverityBand::Low, false, false, true).level, 0);
}

#[test]
fn test_network_recency_rule() {
    // Never succeeded.
    assert!(!network_ok(10_000, None, 900_000, FailReason::None));

    // Fresh success.
    assert!(network_ok(10_000, Some(9_000), 900_000, FailReason::None));

    // Stale success.
    assert!(!network_ok(1_000_000, Some(50_000), 900_000, FailReason::None));

    // A failed upload does not unhealth a recent success...
    assert!(network_ok(10_000, Some(9_000), 900_000, FailReason::ResponseNotOk));
    // ...but losing the address does, regardless of recency.
    assert!(!network_ok(
        10_000,
        Some(9_000),
        900_000,
        FailReason::AddressAcquisitionFailed
    ));
}

#[test]
fn test_lamp_mapping() {
    assert_eq!(LampMode::for_level(0), LampMode::GreenSolid);
    assert_eq!(LampMode::for_level(1), LampMode::YellowSolid);
    assert_eq!(LampMode::for_level(2), LampMode::RedSolid);
    assert_eq!(LampMode::for_level(3), LampMode::RedFlash);
}

#[test]
fn test_flash_toggles_on_period() {
    let mut lamp = StatusLamp::new(500);

    let out = lamp.set_level(3, 1_000);
    assert_eq!(out, RED);

    // Inside the period: no output change.
    assert_eq!(lamp.tick(1_200), None);
    assert_eq!(lamp.tick(1_499), None);

    // Period elapsed: dark phase.
    assert_eq!(lamp.tick(1_500), Some(DARK));
    assert_eq!(lamp.tick(1_900), None);
    assert_eq!(lamp.tick(2_000), Some(RED));
}

#[test]
fn test_solid_modes_never_toggle() {
    let mut lamp = StatusLamp::new(500);
    lamp.set_level(2, 0);
    for t in (0..10_000).step_by(100) {
        assert_eq!(lamp.tick(t), None, "solid red must not blink");
    }
}

#[test]
fn test_downgrade_stops_flashing_immediately() {
    let mut lamp = StatusLamp::new(500);
    lamp.set_level(3, 0);
    assert_eq!(lamp.tick(500), Some(DARK), "mid-flash, output dark");

    // Dropping below 3 sets a solid output on the same cycle.
    let out = lamp.set_level(2, 600);
    assert_eq!(out, RED);
    assert_eq!(lamp.mode(), LampMode::RedSolid);
    assert_eq!(lamp.tick(2_000), None);
}
