//! Mock adapters for integration tests.
//!
//! Records every actuator hook call, every publish and every listener
//! callback so tests can assert on the full history without a broker or
//! real devices.

use std::sync::Arc;

use cda::app::ports::{ActuatorPort, DataMessageListener, PubSubPort, ResourceName};
use cda::data::{ActuatorRecord, PerformanceRecord, SensorRecord};
use parking_lot::Mutex;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Activate { value: f64, state_data: String },
    Deactivate,
}

pub type CallLog = Arc<Mutex<Vec<ActuatorCall>>>;

// ── MockActuator ──────────────────────────────────────────────

/// Actuator hooks that only record.  `fail_with` makes activation fail.
pub struct MockActuator {
    calls: CallLog,
    fail_with: i32,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> (Self, CallLog) {
        let calls = CallLog::default();
        (
            Self {
                calls: Arc::clone(&calls),
                fail_with: 0,
            },
            calls,
        )
    }

    pub fn failing(code: i32) -> (Self, CallLog) {
        let (mut a, calls) = Self::new();
        a.fail_with = code;
        (a, calls)
    }
}

impl ActuatorPort for MockActuator {
    fn activate(&mut self, value: f64, state_data: &str) -> i32 {
        if self.fail_with != 0 {
            return self.fail_with;
        }
        self.calls.lock().push(ActuatorCall::Activate {
            value,
            state_data: state_data.to_owned(),
        });
        0
    }

    fn deactivate(&mut self, _value: f64, _state_data: &str) -> i32 {
        self.calls.lock().push(ActuatorCall::Deactivate);
        0
    }
}

// ── MockPubSub ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPubSub {
    pub published: Mutex<Vec<(ResourceName, String)>>,
    /// When set, every publish reports failure.
    pub offline: bool,
}

#[allow(dead_code)]
impl MockPubSub {
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn on(&self, resource: ResourceName) -> Vec<String> {
        self.published
            .lock()
            .iter()
            .filter(|(r, _)| *r == resource)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl PubSubPort for MockPubSub {
    fn publish(&self, resource: ResourceName, payload: &str, _qos: i32) -> bool {
        if self.offline {
            return false;
        }
        self.published.lock().push((resource, payload.to_owned()));
        true
    }

    fn subscribe(&self, _resource: ResourceName, _qos: i32) -> bool {
        !self.offline
    }

    fn unsubscribe(&self, _resource: ResourceName) -> bool {
        !self.offline
    }
}

// ── RecordingListener ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingListener {
    pub sensors: Mutex<Vec<SensorRecord>>,
    pub perf: Mutex<Vec<PerformanceRecord>>,
    pub responses: Mutex<Vec<ActuatorRecord>>,
    /// Value returned from every callback.
    pub refuse: bool,
}

#[allow(dead_code)]
impl RecordingListener {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

impl DataMessageListener for RecordingListener {
    fn on_sensor_event(&self, record: Option<SensorRecord>) -> bool {
        let Some(r) = record else { return false };
        self.sensors.lock().push(r);
        !self.refuse
    }

    fn on_performance_event(&self, record: Option<PerformanceRecord>) -> bool {
        let Some(r) = record else { return false };
        self.perf.lock().push(r);
        !self.refuse
    }

    fn on_actuator_response(&self, record: Option<ActuatorRecord>) -> bool {
        let Some(r) = record else { return false };
        self.responses.lock().push(r);
        !self.refuse
    }

    fn on_actuator_command_request(
        &self,
        _record: Option<ActuatorRecord>,
    ) -> Option<ActuatorRecord> {
        None
    }
}

// ── Scripted readings ─────────────────────────────────────────

/// A reading source that replays `values`, then repeats the last one.
#[allow(dead_code)]
pub fn scripted(values: Vec<f64>) -> impl FnMut() -> f64 + Send {
    let last = values.last().copied().unwrap_or(0.0);
    let mut it = values.into_iter();
    move || it.next().unwrap_or(last)
}
