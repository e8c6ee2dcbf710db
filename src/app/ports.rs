//! Port traits forming the boundary between coordination logic and the outside world.
//!
//! ```text
//!   SensorManager ──┐                         ┌──▶ BusListener ──▶ PubSubPort
//!   PerfManager ────┼──▶ DataMessageListener ─┤
//!   MqttConnector ──┘     (Coordinator)       └──▶ LogListener
//! ```
//!
//! Every subsystem talks to its neighbours only through
//! [`DataMessageListener`].  The coordinator implements it for fan-in;
//! adapters implement it for upstream forwarding.  The transport and raw
//! reading capabilities are likewise traits, so the core never touches a
//! broker or an OS metric directly.

use core::fmt;

use crate::data::{ActuatorRecord, PerformanceRecord, SensorRecord};

// ───────────────────────────────────────────────────────────────
// Listener port (subsystems → coordinator, coordinator → upstream)
// ───────────────────────────────────────────────────────────────

/// Uniform callback surface shared by the coordinator and its collaborators.
///
/// Absent records are modelled as `None` and always yield the failure
/// sentinel (`false` / `None`); implementations must never panic on them.
/// Methods take `&self` because callbacks arrive concurrently from timer
/// threads and the inbound message thread.
pub trait DataMessageListener: Send + Sync {
    /// A fresh sensor reading.
    fn on_sensor_event(&self, record: Option<SensorRecord>) -> bool;

    /// A fresh CPU / memory sample.
    fn on_performance_event(&self, record: Option<PerformanceRecord>) -> bool;

    /// The response an actuator produced for a command.
    fn on_actuator_response(&self, record: Option<ActuatorRecord>) -> bool;

    /// A command to be applied by an actuator; returns its response, if any.
    fn on_actuator_command_request(&self, record: Option<ActuatorRecord>)
    -> Option<ActuatorRecord>;

    /// A raw inbound payload from the pub/sub transport.
    ///
    /// Listeners that do not consume inbound traffic keep the default.
    fn on_incoming_message(&self, resource: ResourceName, payload: &[u8]) -> bool {
        let _ = (resource, payload);
        false
    }
}

// ───────────────────────────────────────────────────────────────
// Pub/sub port (coordinator → transport)
// ───────────────────────────────────────────────────────────────

/// Publish / subscribe capability.
///
/// Out-of-range QoS values are coerced to the configured default rather
/// than rejected.  A `false` return means "delivery not guaranteed"; the
/// caller never retries.
pub trait PubSubPort: Send + Sync {
    fn publish(&self, resource: ResourceName, payload: &str, qos: i32) -> bool;

    fn subscribe(&self, resource: ResourceName, qos: i32) -> bool;

    fn unsubscribe(&self, resource: ResourceName) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (actuator task → hardware)
// ───────────────────────────────────────────────────────────────

/// Hooks an external actuator device exposes.
///
/// Both return a status code: `0` on success, nonzero on failure.  A
/// failing hook must not leave side effects behind beyond that code.
pub trait ActuatorPort: Send {
    fn activate(&mut self, value: f64, state_data: &str) -> i32;

    fn deactivate(&mut self, value: f64, state_data: &str) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Raw reading port (hardware / OS → sampling tasks)
// ───────────────────────────────────────────────────────────────

/// Anything that yields a numeric reading on demand.
pub trait ReadingSource: Send {
    fn read(&mut self) -> f64;
}

impl<F: FnMut() -> f64 + Send> ReadingSource for F {
    fn read(&mut self) -> f64 {
        self()
    }
}

// ───────────────────────────────────────────────────────────────
// Resource names
// ───────────────────────────────────────────────────────────────

/// Logical message channels.  The transport maps each to a topic
/// under its configured prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceName {
    ActuatorCmd,
    ActuatorResponse,
    SensorMsg,
    SystemPerfMsg,
    MgmtStatusMsg,
}

impl ResourceName {
    pub const ALL: [Self; 5] = [
        Self::ActuatorCmd,
        Self::ActuatorResponse,
        Self::SensorMsg,
        Self::SystemPerfMsg,
        Self::MgmtStatusMsg,
    ];

    /// Final topic segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActuatorCmd => "ActuatorCmd",
            Self::ActuatorResponse => "ActuatorResponse",
            Self::SensorMsg => "SensorMsg",
            Self::SystemPerfMsg => "SystemPerfMsg",
            Self::MgmtStatusMsg => "MgmtStatusMsg",
        }
    }

    /// Full topic under `prefix`.
    pub fn topic(self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.as_str())
    }

    /// Reverse of [`topic`](Self::topic).
    pub fn from_topic(prefix: &str, topic: &str) -> Option<Self> {
        let rest = topic.strip_prefix(prefix.trim_end_matches('/'))?;
        let segment = rest.strip_prefix('/')?;
        Self::ALL.into_iter().find(|r| r.as_str() == segment)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
