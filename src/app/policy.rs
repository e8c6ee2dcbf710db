//! Threshold control policy.
//!
//! A hysteresis band `[floor, ceiling]` over one sensor type drives one
//! actuator type:
//!
//! ```text
//!   value <  floor    ──▶ ON,  target = floor
//!   floor..=ceiling   ──▶ OFF
//!   value >  ceiling  ──▶ ON,  target = ceiling
//! ```
//!
//! Evaluation is memoryless.  An in-band reading always yields a fresh OFF
//! command; suppressing repeats is the actuator task's job.

use crate::data::{
    ActuatorRecord, Command, DEFAULT_VAL, HVAC_ACTUATOR_NAME, HVAC_ACTUATOR_TYPE, SensorRecord,
    TEMP_SENSOR_TYPE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    pub sensor_type_id: i32,
    pub actuator_type_id: i32,
    pub actuator_name: String,
    pub floor: f64,
    pub ceiling: f64,
}

impl ThresholdPolicy {
    pub fn new(
        sensor_type_id: i32,
        actuator_type_id: i32,
        actuator_name: impl Into<String>,
        floor: f64,
        ceiling: f64,
    ) -> Self {
        Self {
            sensor_type_id,
            actuator_type_id,
            actuator_name: actuator_name.into(),
            floor,
            ceiling,
        }
    }

    /// Temperature sensor → HVAC actuator.
    pub fn hvac(floor: f64, ceiling: f64) -> Self {
        Self::new(TEMP_SENSOR_TYPE, HVAC_ACTUATOR_TYPE, HVAC_ACTUATOR_NAME, floor, ceiling)
    }

    pub fn applies_to(&self, reading: &SensorRecord) -> bool {
        reading.type_id() == self.sensor_type_id
    }

    /// The command for `reading`, or `None` if the reading is from a
    /// sensor type this policy does not watch.
    pub fn evaluate(&self, reading: &SensorRecord) -> Option<ActuatorRecord> {
        if !self.applies_to(reading) {
            return None;
        }
        let mut cmd = ActuatorRecord::new(self.actuator_name.as_str(), self.actuator_type_id);
        cmd.meta_mut()
            .set_location_id(reading.meta().location_id());

        let value = reading.value();
        if value > self.ceiling {
            cmd.set_command(Command::On);
            cmd.set_value(self.ceiling);
        } else if value < self.floor {
            cmd.set_command(Command::On);
            cmd.set_value(self.floor);
        } else {
            cmd.set_command(Command::Off);
            cmd.set_value(DEFAULT_VAL);
        }
        Some(cmd)
    }
}
