//! Routes commands to the actuator task registered for their type ID.

use std::collections::HashMap;

use log::{info, warn};
use parking_lot::Mutex;

use super::ActuatorTask;
use crate::data::ActuatorRecord;

/// One task per actuator type, each behind its own lock so commands for
/// the same actuator are serialised while different actuators proceed
/// independently.
pub struct ActuatorManager {
    tasks: HashMap<i32, Mutex<ActuatorTask>>,
}

impl ActuatorManager {
    pub fn new(tasks: impl IntoIterator<Item = ActuatorTask>) -> Self {
        let mut map = HashMap::new();
        for task in tasks {
            let type_id = task.type_id();
            if map.insert(type_id, Mutex::new(task)).is_some() {
                warn!("actuator type {} registered twice, keeping the last", type_id);
            }
        }
        info!("actuator manager: {} actuators", map.len());
        Self { tasks: map }
    }

    /// HVAC, humidifier and LED display emulators.
    pub fn with_emulators() -> Self {
        Self::new([
            ActuatorTask::hvac(),
            ActuatorTask::humidifier(),
            ActuatorTask::led_display(),
        ])
    }

    pub fn has_actuator(&self, type_id: i32) -> bool {
        self.tasks.contains_key(&type_id)
    }

    /// Hand `record` to the task for its type ID and return its response.
    pub fn send_command(&self, record: &ActuatorRecord) -> Option<ActuatorRecord> {
        let Some(task) = self.tasks.get(&record.type_id()) else {
            warn!("no actuator for type {}", record.type_id());
            return None;
        };
        task.lock().update_actuator(Some(record))
    }

    pub fn latest_response(&self, type_id: i32) -> Option<ActuatorRecord> {
        self.tasks
            .get(&type_id)
            .map(|t| t.lock().latest_response().clone())
    }

    pub fn display_text(&self, type_id: i32) -> Option<String> {
        let task = self.tasks.get(&type_id)?.lock();
        task.display_text().map(str::to_owned)
    }
}
