//! Coordinator fan-in / fan-out against mock actuators and listeners.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cda::Coordinator;
use cda::actuators::{ActuatorKind, ActuatorManager, ActuatorTask};
use cda::adapters::bus::BusListener;
use cda::app::ThresholdPolicy;
use cda::app::ports::{DataMessageListener, ResourceName};
use cda::data::codec;
use cda::data::{
    ActuatorRecord, Command, HVAC_ACTUATOR_NAME, HVAC_ACTUATOR_TYPE, PerformanceRecord,
    SensorRecord, TEMP_SENSOR_NAME, TEMP_SENSOR_TYPE,
};
use cda::sensors::{SampleSource, SensorKind, SensorManager, SensorTask};

use crate::mock_hw::{ActuatorCall, CallLog, MockActuator, MockPubSub, RecordingListener, scripted};

fn hvac_coordinator() -> (Coordinator, CallLog) {
    let (dev, calls) = MockActuator::new();
    let c = Coordinator::new(true)
        .with_policy(ThresholdPolicy::hvac(18.0, 24.0))
        .with_actuator_manager(ActuatorManager::new([ActuatorTask::new(
            HVAC_ACTUATOR_NAME,
            HVAC_ACTUATOR_TYPE,
            ActuatorKind::Device(Box::new(dev)),
        )]));
    (c, calls)
}

fn temp(v: f64) -> SensorRecord {
    SensorRecord::new(TEMP_SENSOR_NAME, TEMP_SENSOR_TYPE).with_value(v)
}

#[test]
fn hysteresis_drives_hvac_with_dedup() {
    let (c, calls) = hvac_coordinator();
    for v in [25.0, 26.0, 21.0, 22.0, 16.0, 17.0] {
        assert!(c.on_sensor_event(Some(temp(v))));
    }
    // 25 and 26 both target the ceiling: one activation.  Both in-band
    // readings produce OFF: one deactivation.  16 and 17 target the floor.
    assert_eq!(
        *calls.lock(),
        [
            ActuatorCall::Activate { value: 24.0, state_data: String::new() },
            ActuatorCall::Deactivate,
            ActuatorCall::Activate { value: 18.0, state_data: String::new() },
        ]
    );
    let latest = c.get_latest_actuator(HVAC_ACTUATOR_NAME).unwrap();
    assert_eq!((latest.command(), latest.value()), (Command::On, 18.0));
}

#[test]
fn non_temperature_readings_do_not_actuate() {
    let (c, calls) = hvac_coordinator();
    let humid = SensorRecord::new("HumiditySensor", 1).with_value(99.0);
    assert!(c.on_sensor_event(Some(humid)));
    assert!(calls.lock().is_empty());
    assert!(c.get_latest_sensor("HumiditySensor").is_some());
}

#[test]
fn upstream_sees_cached_records() {
    let up = Arc::new(RecordingListener::default());
    let (c, _) = hvac_coordinator();
    let c = c.with_upstream(up.clone());

    c.on_sensor_event(Some(temp(30.0)));
    c.on_performance_event(Some(PerformanceRecord::new()));

    assert_eq!(up.sensors.lock().len(), 1);
    assert_eq!(up.perf.lock().len(), 1);
    let responses = up.responses.lock();
    assert_eq!(responses.len(), 1);
    assert!(responses[0].is_response());
}

#[test]
fn refusing_upstream_does_not_fail_events() {
    let up = Arc::new(RecordingListener::refusing());
    let (c, _) = hvac_coordinator();
    let c = c.with_upstream(up);
    assert!(c.on_sensor_event(Some(temp(20.0))));
    assert!(c.on_performance_event(Some(PerformanceRecord::new())));
}

#[test]
fn bus_upstream_publishes_json() {
    let bus = Arc::new(MockPubSub::default());
    let (c, _) = hvac_coordinator();
    let c = c.with_upstream(Arc::new(BusListener::new(bus.clone(), 1)));

    c.on_sensor_event(Some(temp(12.0)));

    let sensor_msgs = bus.on(ResourceName::SensorMsg);
    assert_eq!(sensor_msgs.len(), 1);
    let decoded: SensorRecord = codec::from_json(sensor_msgs[0].as_bytes()).unwrap();
    assert_eq!(decoded.value(), 12.0);

    let responses = bus.on(ResourceName::ActuatorResponse);
    assert_eq!(responses.len(), 1);
    let resp: ActuatorRecord = codec::from_json(responses[0].as_bytes()).unwrap();
    assert!(resp.is_response());
    assert_eq!(resp.value(), 18.0);
}

#[test]
fn offline_bus_is_tolerated() {
    let (c, _) = hvac_coordinator();
    let c = c.with_upstream(Arc::new(BusListener::new(Arc::new(MockPubSub::offline()), 1)));
    assert!(c.on_sensor_event(Some(temp(40.0))));
    assert!(c.get_latest_actuator(HVAC_ACTUATOR_NAME).is_some());
}

#[test]
fn inbound_command_reaches_actuator() {
    let (c, calls) = hvac_coordinator();
    let cmd = ActuatorRecord::new(HVAC_ACTUATOR_NAME, HVAC_ACTUATOR_TYPE)
        .with_command(Command::On, 21.0);
    let json = codec::to_json(&cmd).unwrap();
    assert!(c.on_incoming_message(ResourceName::ActuatorCmd, json.as_bytes()));
    assert_eq!(calls.lock().len(), 1);
}

#[test]
fn concurrent_writers_leave_last_write() {
    let (c, _) = hvac_coordinator();
    let c = Arc::new(c);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                for i in 0..200 {
                    let own = SensorRecord::new(format!("sensor-{t}"), 50).with_value(f64::from(i));
                    c.on_sensor_event(Some(own));
                    c.on_sensor_event(Some(temp(f64::from(t * 1000 + i))));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for t in 0..8 {
        let own = c.get_latest_sensor(&format!("sensor-{t}")).unwrap();
        assert_eq!(own.value(), 199.0);
    }
    let shared = c.get_latest_sensor(TEMP_SENSOR_NAME).unwrap().value();
    assert!((0..8).any(|t| shared == f64::from(t * 1000 + 199)));

    c.on_sensor_event(Some(temp(-1.0)));
    assert_eq!(c.get_latest_sensor(TEMP_SENSOR_NAME).unwrap().value(), -1.0);
}

#[test]
fn started_coordinator_polls_until_stopped() {
    let (c, calls) = hvac_coordinator();
    let sensors = SensorManager::new(
        vec![SensorTask::new(
            SensorKind::Temperature,
            SampleSource::Device(Box::new(scripted(vec![30.0, 30.0, 10.0]))),
        )],
        "lab",
        Duration::from_millis(10),
    );
    let c = Arc::new(c.with_sensor_manager(sensors));

    assert!(c.start().unwrap());
    thread::sleep(Duration::from_millis(100));
    assert!(c.stop());

    let reading = c.get_latest_sensor(TEMP_SENSOR_NAME).unwrap();
    assert_eq!(reading.meta().location_id(), "lab");
    assert_eq!(reading.value(), 10.0);
    assert_eq!(calls.lock().len(), 2, "ceiling then floor, duplicates suppressed");

    let frozen = c.get_latest_sensor(TEMP_SENSOR_NAME).unwrap().meta().time_stamp();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        c.get_latest_sensor(TEMP_SENSOR_NAME).unwrap().meta().time_stamp(),
        frozen,
        "no callback after stop"
    );
}

#[test]
fn dropping_coordinator_releases_managers() {
    let (c, _) = hvac_coordinator();
    let sensors = SensorManager::new(
        vec![SensorTask::random(SensorKind::Temperature)],
        "lab",
        Duration::from_millis(10),
    );
    let c = Arc::new(c.with_sensor_manager(sensors));
    c.start().unwrap();
    let weak = Arc::downgrade(&c);
    drop(c);
    thread::sleep(Duration::from_millis(30));
    assert!(weak.upgrade().is_none());
}
