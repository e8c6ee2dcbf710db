//! Actuator task and manager behaviour against a recording device.

use std::sync::Arc;
use std::thread;

use cda::actuators::{ActuatorKind, ActuatorManager, ActuatorTask, STATUS_UNKNOWN_COMMAND};
use cda::data::{ActuatorRecord, Command};

use crate::mock_hw::{ActuatorCall, MockActuator};

const PUMP_TYPE: i32 = 300;

fn pump_cmd(command: Command, value: f64) -> ActuatorRecord {
    ActuatorRecord::new("PumpActuator", PUMP_TYPE).with_command(command, value)
}

fn pump_task() -> (ActuatorTask, crate::mock_hw::CallLog) {
    let (dev, calls) = MockActuator::new();
    (
        ActuatorTask::new("PumpActuator", PUMP_TYPE, ActuatorKind::Device(Box::new(dev))),
        calls,
    )
}

#[test]
fn repeated_command_fires_hook_once() {
    let (mut task, calls) = pump_task();
    let on = pump_cmd(Command::On, 3.0).with_state_data("fast");

    assert!(task.update_actuator(Some(&on)).is_some());
    assert!(task.update_actuator(Some(&on)).is_none());
    assert!(task.update_actuator(Some(&on.clone())).is_none());

    assert_eq!(
        *calls.lock(),
        [ActuatorCall::Activate {
            value: 3.0,
            state_data: "fast".into()
        }]
    );
}

#[test]
fn on_off_on_fires_each_hook() {
    let (mut task, calls) = pump_task();
    task.update_actuator(Some(&pump_cmd(Command::On, 1.0)));
    task.update_actuator(Some(&pump_cmd(Command::Off, 0.0)));
    task.update_actuator(Some(&pump_cmd(Command::On, 1.0)));
    let calls = calls.lock();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1], ActuatorCall::Deactivate);
}

#[test]
fn unknown_command_fires_no_hook() {
    let (mut task, calls) = pump_task();
    let resp = task
        .update_actuator(Some(&pump_cmd(Command::Unknown(8), 1.0)))
        .unwrap();
    assert_eq!(resp.meta().status_code(), STATUS_UNKNOWN_COMMAND);
    assert!(calls.lock().is_empty());
}

#[test]
fn failing_hook_reports_status_without_side_effects() {
    let (dev, calls) = MockActuator::failing(4);
    let mut task =
        ActuatorTask::new("PumpActuator", PUMP_TYPE, ActuatorKind::Device(Box::new(dev)));
    let resp = task.update_actuator(Some(&pump_cmd(Command::On, 2.0))).unwrap();
    assert_eq!(resp.meta().status_code(), 4);
    assert!(resp.meta().has_error());
    assert!(calls.lock().is_empty());
}

#[test]
fn response_mirrors_request() {
    let (mut task, _) = pump_task();
    let mut req = pump_cmd(Command::On, 9.5).with_state_data("x");
    req.meta_mut().set_location_id("basement");
    let resp = task.update_actuator(Some(&req)).unwrap();
    assert!(resp.is_response());
    assert_eq!(resp.name(), req.name());
    assert_eq!(resp.value(), 9.5);
    assert_eq!(resp.state_data(), "x");
    assert_eq!(resp.meta().location_id(), "basement");
}

#[test]
fn concurrent_duplicates_apply_once() {
    let (dev, calls) = MockActuator::new();
    let manager = Arc::new(ActuatorManager::new([ActuatorTask::new(
        "PumpActuator",
        PUMP_TYPE,
        ActuatorKind::Device(Box::new(dev)),
    )]));
    let cmd = pump_cmd(Command::On, 5.0);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&manager);
            let c = cmd.clone();
            thread::spawn(move || m.send_command(&c).is_some())
        })
        .collect();
    let applied = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|a| *a)
        .count();

    assert_eq!(applied, 1);
    assert_eq!(calls.lock().len(), 1);
}
