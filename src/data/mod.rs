//! Record types exchanged between sensing, actuation and the coordinator.
//!
//! ```text
//!   SensorTask ──▶ SensorRecord ──────┐
//!   PerformanceTask ──▶ PerformanceRecord ──▶ Coordinator caches
//!   ActuatorTask ◀── ActuatorRecord (request) ──┘
//!        └──▶ ActuatorRecord (response) ──▶ Coordinator caches
//! ```
//!
//! Every record embeds a [`RecordMeta`].  Each setter refreshes the
//! timestamp, so `time_stamp` marks freshness rather than creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod actuator;
pub mod codec;
pub mod perf;
pub mod sensor;

pub use actuator::{ActuatorRecord, Command};
pub use perf::PerformanceRecord;
pub use sensor::SensorRecord;

// ───────────────────────────────────────────────────────────────
// Type IDs and well-known names
// ───────────────────────────────────────────────────────────────

pub const NOT_SET: &str = "Not Set";
pub const DEFAULT_VAL: f64 = 0.0;
pub const DEFAULT_TYPE_ID: i32 = 0;

pub const HUMIDITY_SENSOR_TYPE: i32 = 1;
pub const PRESSURE_SENSOR_TYPE: i32 = 2;
pub const TEMP_SENSOR_TYPE: i32 = 3;

pub const HVAC_ACTUATOR_TYPE: i32 = 1;
pub const HUMIDIFIER_ACTUATOR_TYPE: i32 = 2;
pub const LED_DISPLAY_ACTUATOR_TYPE: i32 = 100;

pub const SYSTEM_PERF_TYPE: i32 = 9000;
pub const CPU_UTIL_TYPE: i32 = 9001;
pub const MEM_UTIL_TYPE: i32 = 9002;

pub const TEMP_SENSOR_NAME: &str = "TempSensor";
pub const HUMIDITY_SENSOR_NAME: &str = "HumiditySensor";
pub const PRESSURE_SENSOR_NAME: &str = "PressureSensor";
pub const HVAC_ACTUATOR_NAME: &str = "HvacActuator";
pub const HUMIDIFIER_ACTUATOR_NAME: &str = "HumidifierActuator";
pub const LED_DISPLAY_ACTUATOR_NAME: &str = "LedDisplayActuator";
pub const SYSTEM_PERF_NAME: &str = "SystemPerfMsg";
pub const CPU_UTIL_NAME: &str = "DeviceCpuUtil";
pub const MEM_UTIL_NAME: &str = "DeviceMemUtil";

// ───────────────────────────────────────────────────────────────
// Shared metadata
// ───────────────────────────────────────────────────────────────

/// Fields common to every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    name: String,
    #[serde(rename = "typeID")]
    type_id: i32,
    time_stamp: DateTime<Utc>,
    #[serde(rename = "locationID", default)]
    location_id: String,
    #[serde(default)]
    status_code: i32,
    #[serde(default)]
    has_error: bool,
}

impl RecordMeta {
    pub fn new(name: impl Into<String>, type_id: i32) -> Self {
        Self {
            name: name.into(),
            type_id,
            time_stamp: Utc::now(),
            location_id: NOT_SET.into(),
            status_code: 0,
            has_error: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    pub fn time_stamp(&self) -> DateTime<Utc> {
        self.time_stamp
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_location_id(&mut self, location_id: impl Into<String>) {
        self.location_id = location_id.into();
        self.touch();
    }

    /// A nonzero status also raises the error flag; zero clears it.
    pub fn set_status_code(&mut self, code: i32) {
        self.status_code = code;
        self.has_error = code != 0;
        self.touch();
    }

    /// Refresh the freshness marker.
    pub fn touch(&mut self) {
        let now = Utc::now();
        // Wall clock may step backwards; freshness must not.
        self.time_stamp = now.max(self.time_stamp);
    }

    /// Copy every field of `other` into `self`, then refresh the timestamp.
    pub(crate) fn update_from(&mut self, other: &Self) {
        self.name.clone_from(&other.name);
        self.type_id = other.type_id;
        self.location_id.clone_from(&other.location_id);
        self.status_code = other.status_code;
        self.has_error = other.has_error;
        self.touch();
    }
}
