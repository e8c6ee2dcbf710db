//! Device app assembled from TOML config files.

use std::io::Write;
use std::thread;
use std::time::Duration;

use cda::data::{HVAC_ACTUATOR_NAME, LED_DISPLAY_ACTUATOR_TYPE, TEMP_SENSOR_NAME};
use cda::{DeviceApp, DeviceConfig, Error};

fn config_from(text: &str) -> DeviceConfig {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(text.as_bytes()).unwrap();
    DeviceConfig::load(Some(f.path())).unwrap()
}

#[test]
fn sensing_only_config_never_actuates() {
    let cfg = config_from(
        r#"
        [device]
        enable_system_perf = false
        enable_actuation = false
        poll_interval_secs = 1
        trigger_hvac_temp_floor = 100.0
        trigger_hvac_temp_ceiling = 200.0
        "#,
    );
    let mut app = DeviceApp::new(&cfg).unwrap();
    assert!(app.start().unwrap());
    thread::sleep(Duration::from_millis(1300));
    assert!(app.stop());

    let c = app.coordinator();
    assert!(c.actuators().is_none());
    assert!(c.get_latest_sensor(TEMP_SENSOR_NAME).is_some());
    assert!(c.get_latest_actuator(HVAC_ACTUATOR_NAME).is_none());
    assert!(c.get_latest_performance("SystemPerfMsg").is_none());
}

#[test]
fn dataset_source_stays_within_kind_range() {
    let cfg = config_from(
        r#"
        [device]
        enable_system_perf = false
        sensor_source = "dataset"
        poll_interval_secs = 1
        "#,
    );
    let mut app = DeviceApp::new(&cfg).unwrap();
    app.start().unwrap();
    thread::sleep(Duration::from_millis(1300));
    app.stop();

    let t = app.coordinator().get_latest_sensor(TEMP_SENSOR_NAME).unwrap();
    assert!((14.0..=30.0).contains(&t.value()));
}

#[test]
fn negative_poll_interval_still_starts() {
    let cfg = config_from("[device]\npoll_interval_secs = -4\nenable_system_perf = false\n");
    let mut app = DeviceApp::new(&cfg).unwrap();
    assert!(app.start().unwrap());
    assert!(app.stop());
}

#[test]
fn led_display_is_reachable_through_coordinator() {
    let app = DeviceApp::new(&DeviceConfig::default()).unwrap();
    let actuators = app.coordinator().actuators().unwrap();
    assert_eq!(actuators.display_text(LED_DISPLAY_ACTUATOR_TYPE).as_deref(), Some(""));
}

#[test]
fn inverted_band_in_file_is_a_startup_error() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        "[device]\ntrigger_hvac_temp_floor = 25.0\ntrigger_hvac_temp_ceiling = 20.0"
    )
    .unwrap();
    assert!(matches!(DeviceConfig::load(Some(f.path())), Err(Error::Config(_))));
}

#[test]
fn mqtt_enabled_app_starts_without_broker() {
    let cfg = config_from(
        r#"
        [device]
        enable_mqtt_client = true
        enable_system_perf = false
        enable_sensing = false

        [mqtt]
        host = "127.0.0.1"
        port = 1
        default_qos = 5
        "#,
    );
    let mut app = DeviceApp::new(&cfg).unwrap();
    assert!(app.start().unwrap());
    assert!(app.stop());
}
