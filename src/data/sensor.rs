//! Sensor telemetry record.

use serde::{Deserialize, Serialize};

use super::{DEFAULT_VAL, RecordMeta};

/// One sampled reading from a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(default)]
    value: f64,
}

impl SensorRecord {
    pub fn new(name: impl Into<String>, type_id: i32) -> Self {
        Self {
            meta: RecordMeta::new(name, type_id),
            value: DEFAULT_VAL,
        }
    }

    pub fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn type_id(&self) -> i32 {
        self.meta.type_id()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.meta.touch();
    }

    /// Builder-style variant of [`set_value`](Self::set_value).
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.set_value(value);
        self
    }
}
