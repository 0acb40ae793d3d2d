//! Property get/set behavior through a built laser.

mod common;

use cobolt_laser::adapters::MockAdapter;
use cobolt_laser::laser::TypedValue;
use cobolt_laser::{ErrorKind, LaserError};
use common::{build_laser, COMPACT05_MODEL, DPL06_MODEL};

fn text(value: &str) -> TypedValue {
    TypedValue::String(value.to_string())
}

#[test]
fn numeric_setpoint_accepts_range_bounds() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    laser.set("Power Setpoint [mW]", "0").unwrap();
    assert_eq!(laser.get("Power Setpoint [mW]").unwrap(), TypedValue::Float(0.0));
    laser.set("Power Setpoint [mW]", "100").unwrap();
    assert_eq!(laser.get("Power Setpoint [mW]").unwrap(), TypedValue::Float(100.0));

    assert_eq!(log.commands(), vec!["slp 0", "glp?", "slp 100", "glp?"]);
}

#[test]
fn numeric_setpoint_rejects_out_of_range_without_sending() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    for value in ["100.01", "-0.1", "lots"] {
        let err = laser.set("Power Setpoint [mW]", value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPropertyValue, "value {}", value);
        assert_eq!(err.code(), 3);
    }
    let err = laser.set("Current Setpoint [mA]", "3.5").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPropertyValue);

    assert!(log.is_empty());
}

#[test]
fn enumeration_round_trips_every_value() {
    let (mut laser, _) = build_laser(MockAdapter::new(DPL06_MODEL));

    for mode in ["Constant Current", "Constant Power", "Modulation"] {
        laser.set("Run Mode", mode).unwrap();
        assert_eq!(laser.get("Run Mode").unwrap(), text(mode));
        laser.set("Run Mode", mode).unwrap();
        assert_eq!(laser.get("Run Mode").unwrap(), text(mode));
    }

    for impedance in ["low", "high"] {
        laser.set("Analog Impedance", impedance).unwrap();
        assert_eq!(laser.get("Analog Impedance").unwrap(), text(impedance));
    }
}

#[test]
fn enumeration_rejects_unregistered_label() {
    let (mut laser, log) = build_laser(MockAdapter::new(COMPACT05_MODEL));
    log.clear();

    let err = laser.set("Run Mode", "Modulation").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPropertyValue);
    assert!(log.is_empty());
}

#[test]
fn toggle_uses_both_command_pairs() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    laser.set("On-Off Switch", "On").unwrap();
    assert_eq!(laser.get("On-Off Switch").unwrap(), text("On"));
    laser.set("On-Off Switch", "Off").unwrap();
    assert_eq!(laser.get("On-Off Switch").unwrap(), text("Off"));

    assert_eq!(log.commands(), vec!["l1", "l?", "l0", "l?"]);
}

#[test]
fn modulation_switches_use_enable_disable() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    laser.set("Digital Modulation", "Enable").unwrap();
    assert_eq!(laser.get("Digital Modulation").unwrap(), text("Enable"));
    laser.set("Analog Modulation", "Enable").unwrap();
    laser.set("Analog Modulation", "Disable").unwrap();
    assert_eq!(laser.get("Analog Modulation").unwrap(), text("Disable"));

    let err = laser.set("Digital Modulation", "On").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPropertyValue);

    assert_eq!(
        log.commands(),
        vec!["sdmes 1", "gdmes?", "sames 1", "sames 0", "games?"]
    );
}

#[test]
fn native_pause_goes_to_the_instrument() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    assert!(!laser.pause_is_simulated());
    log.clear();

    laser.set("Paused", "On").unwrap();
    assert_eq!(laser.get("Paused").unwrap(), text("On"));
    laser.set("Paused", "Off").unwrap();
    assert!(!laser.is_paused().unwrap());

    assert_eq!(log.commands(), vec!["l1r", "l?r", "l0r", "l?r"]);
}

#[test]
fn simulated_pause_stays_on_the_host() {
    let (mut laser, log) = build_laser(MockAdapter::new(COMPACT05_MODEL).without_pause_support());
    assert!(laser.pause_is_simulated());
    log.clear();

    assert_eq!(laser.get("Paused").unwrap(), text("Off"));
    laser.set("Paused", "On").unwrap();
    assert!(laser.is_paused().unwrap());

    assert!(log.is_empty());
}

#[test]
fn readings_follow_emission() {
    let adapter = MockAdapter::new(DPL06_MODEL)
        .switched_on()
        .with_value("glp?", "40.0");
    let (mut laser, _) = build_laser(adapter);

    assert_eq!(laser.get("Power Reading [mW]").unwrap(), TypedValue::Float(40.0));
    laser.set_paused(true).unwrap();
    assert_eq!(laser.get("Power Reading [mW]").unwrap(), TypedValue::Float(0.0));
}

#[test]
fn read_only_and_unknown_properties() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    let err = laser.set("Serial Number", "1").unwrap_err();
    assert!(matches!(err, LaserError::ReadOnlyProperty(ref name) if name == "Serial Number"));

    let err = laser.get("Wavelength [nm]").unwrap_err();
    assert!(matches!(err, LaserError::UnknownProperty(_)));

    assert!(log.is_empty());
}

#[test]
fn rejected_set_surfaces_as_unsupported_command() {
    let adapter = MockAdapter::new(DPL06_MODEL).with_response("slmp 20", "Syntax error: illegal command");
    let (mut laser, _) = build_laser(adapter);

    let err = laser.set("Modulation Power Setpoint", "20").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedCommand);
    assert_eq!(err.code(), 11);
}

#[test]
fn describe_reports_failures_per_property() {
    let adapter = MockAdapter::new(DPL06_MODEL).with_response("hrs?", "error: not available");
    let (mut laser, _) = build_laser(adapter);

    let snapshots = laser.describe();
    assert_eq!(snapshots.len(), 17);

    let hours = snapshots.iter().find(|s| s.name == "Operating Hours").unwrap();
    assert!(hours.value.is_none());
    assert!(hours.error.as_deref().unwrap().contains("rejected"));

    let run_mode = snapshots.iter().find(|s| s.name == "Run Mode").unwrap();
    assert_eq!(run_mode.value, Some(text("Constant Power")));
    assert!(run_mode.mutable);
}
