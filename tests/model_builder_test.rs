//! Model detection and property assembly against the simulated laser.

mod common;

use cobolt_laser::adapters::MockAdapter;
use cobolt_laser::laser::{Family, LaserBuilder, Stereotype, TypedValue};
use cobolt_laser::ErrorKind;
use common::{
    build_laser, build_laser_with_sink, COMPACT05_MODEL, DPL06_MODEL, UNKNOWN_MODEL,
};
use tracing::Level;

#[test]
fn dpl06_laser_has_full_property_set() {
    let (laser, _) = build_laser(MockAdapter::new(DPL06_MODEL));

    assert_eq!(laser.family(), Family::Dpl06);
    assert_eq!(laser.name(), "06-DPL");
    assert_eq!(laser.wavelength(), "0532");
    assert_eq!(laser.current_unit(), "mA");
    assert_eq!(laser.power_unit(), "mW");
    assert_eq!(laser.max_current_setpoint(), 3.0);
    assert_eq!(laser.max_power_setpoint(), 100.0);

    let names: Vec<&str> = laser.property_names().collect();
    assert_eq!(
        names,
        vec![
            "Name",
            "Model",
            "Wavelength",
            "Serial Number",
            "Firmware Version",
            "Operating Hours",
            "Paused",
            "On-Off Switch",
            "Current Setpoint [mA]",
            "Measured Current [mA]",
            "Power Setpoint [mW]",
            "Power Reading [mW]",
            "Run Mode",
            "Digital Modulation",
            "Analog Modulation",
            "Modulation Power Setpoint",
            "Analog Impedance",
        ]
    );
}

#[test]
fn compact05_laser_has_no_modulation_properties() {
    let (laser, _) = build_laser(MockAdapter::new(COMPACT05_MODEL));

    assert_eq!(laser.family(), Family::Compact05);
    assert_eq!(laser.name(), "Compact 05");
    assert_eq!(laser.current_unit(), "A");
    assert_eq!(laser.properties().count(), 13);
    assert!(laser.property("Current Setpoint [A]").is_some());
    assert!(laser.property("Digital Modulation").is_none());
    assert_eq!(
        laser.property("Run Mode").map(|p| p.allowed_values()),
        Some(vec![
            "Constant Current".to_string(),
            "Constant Power".to_string()
        ])
    );
}

#[test]
fn unknown_laser_keeps_only_base_properties() {
    let (laser, _) = build_laser(MockAdapter::new(UNKNOWN_MODEL));

    assert_eq!(laser.family(), Family::Unknown);
    assert_eq!(laser.name(), "Unknown");
    assert_eq!(laser.wavelength(), "0660");
    assert_eq!(laser.current_unit(), "?");
    assert_eq!(laser.properties().count(), 8);
}

#[test]
fn build_sends_only_identification_and_probe() {
    let (_, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    assert_eq!(log.commands(), vec!["glm?", "l0r"]);
}

#[test]
fn static_properties_reflect_classification() {
    let (mut laser, log) = build_laser(MockAdapter::new(DPL06_MODEL));
    log.clear();

    assert_eq!(
        laser.get("Name").unwrap(),
        TypedValue::String("06-DPL".into())
    );
    assert_eq!(
        laser.get("Wavelength").unwrap(),
        TypedValue::String("0532".into())
    );
    assert!(log.is_empty());

    assert_eq!(
        laser.get("Model").unwrap(),
        TypedValue::String(DPL06_MODEL.into())
    );
    assert_eq!(
        laser.get("Serial Number").unwrap(),
        TypedValue::String("20950".into())
    );
}

#[test]
fn property_metadata() {
    let (laser, _) = build_laser(MockAdapter::new(DPL06_MODEL));

    let setpoint = laser.property("Power Setpoint [mW]").unwrap();
    assert_eq!(setpoint.stereotype(), Stereotype::Float);
    assert!(setpoint.is_mutable());
    assert_eq!(setpoint.limits(), Some((0.0, 100.0)));

    let reading = laser.property("Power Reading [mW]").unwrap();
    assert!(!reading.is_mutable());

    let toggle = laser.property("On-Off Switch").unwrap();
    assert!(toggle.is_boolean());
    assert_eq!(toggle.allowed_values(), vec!["On", "Off"]);

    let impedance = laser.property("Analog Impedance").unwrap();
    assert_eq!(impedance.allowed_values(), vec!["low", "high"]);
}

#[test]
fn creation_is_logged() {
    let (_, _, sink) = build_laser_with_sink(MockAdapter::new(DPL06_MODEL));
    assert!(sink.contains(Level::INFO, "Created laser '06-DPL'"));
    assert!(sink.contains(Level::DEBUG, "Sent: glm? Reply received: "));
}

#[test]
fn pause_probe_fallback_is_logged() {
    let (laser, _, sink) =
        build_laser_with_sink(MockAdapter::new(COMPACT05_MODEL).without_pause_support());

    assert!(laser.pause_is_simulated());
    assert!(sink.contains(Level::WARN, "pause will be simulated"));
    assert!(sink.contains(Level::WARN, "Sent: l0r Reply received: Syntax error"));
}

#[test]
fn failed_identification_aborts_build() {
    let err = LaserBuilder::default()
        .build(Box::new(MockAdapter::new(DPL06_MODEL).with_failing_writes()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelDetectionFailed);
    assert_eq!(err.code(), 1);

    let err = LaserBuilder::default()
        .build(Box::new(
            MockAdapter::new(DPL06_MODEL).with_response("glm?", "Syntax error: illegal command"),
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelDetectionFailed);
}
