//! Message-bus listener adapter.
//!
//! Implements [`DataMessageListener`] on top of any [`PubSubPort`]: each
//! record is JSON-encoded and published to its resource channel.
//!
//! | Event              | Channel            |
//! |--------------------|--------------------|
//! | sensor             | `SensorMsg`        |
//! | performance        | `SystemPerfMsg`    |
//! | actuator response  | `ActuatorResponse` |

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::{DataMessageListener, PubSubPort, ResourceName};
use crate::data::codec;
use crate::data::{ActuatorRecord, PerformanceRecord, SensorRecord};

pub struct BusListener<P: PubSubPort> {
    port: Arc<P>,
    qos: i32,
}

impl<P: PubSubPort> BusListener<P> {
    pub fn new(port: Arc<P>, qos: i32) -> Self {
        Self { port, qos }
    }

    fn send<T: Serialize>(&self, resource: ResourceName, record: Option<T>) -> bool {
        let Some(record) = record else {
            warn!("bus: nothing to publish on {}", resource);
            return false;
        };
        match codec::to_json(&record) {
            Ok(payload) => self.port.publish(resource, &payload, self.qos),
            Err(e) => {
                warn!("bus: encode for {} failed: {}", resource, e);
                false
            }
        }
    }
}

impl<P: PubSubPort> DataMessageListener for BusListener<P> {
    fn on_sensor_event(&self, record: Option<SensorRecord>) -> bool {
        self.send(ResourceName::SensorMsg, record)
    }

    fn on_performance_event(&self, record: Option<PerformanceRecord>) -> bool {
        self.send(ResourceName::SystemPerfMsg, record)
    }

    fn on_actuator_response(&self, record: Option<ActuatorRecord>) -> bool {
        self.send(ResourceName::ActuatorResponse, record)
    }

    fn on_actuator_command_request(
        &self,
        record: Option<ActuatorRecord>,
    ) -> Option<ActuatorRecord> {
        if let Some(r) = record {
            debug!("bus: command for {} not applied upstream", r.name());
        }
        None
    }
}
