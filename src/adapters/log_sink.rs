//! Log-based listener adapter.
//!
//! Implements [`DataMessageListener`] by writing one structured line per
//! event under the `cda::events` target.  Used as the upstream when no
//! message bus is configured.

use log::{info, warn};

use crate::app::ports::DataMessageListener;
use crate::data::{ActuatorRecord, PerformanceRecord, SensorRecord};

const TARGET: &str = "cda::events";

/// Adapter that logs every record it is handed.
#[derive(Debug, Default)]
pub struct LogListener;

impl LogListener {
    pub fn new() -> Self {
        Self
    }
}

impl DataMessageListener for LogListener {
    fn on_sensor_event(&self, record: Option<SensorRecord>) -> bool {
        let Some(r) = record else {
            warn!(target: TARGET, "SENSOR | <absent>");
            return false;
        };
        info!(
            target: TARGET,
            "SENSOR | {} type={} value={:.3} loc={}",
            r.name(),
            r.type_id(),
            r.value(),
            r.meta().location_id(),
        );
        true
    }

    fn on_performance_event(&self, record: Option<PerformanceRecord>) -> bool {
        let Some(r) = record else {
            warn!(target: TARGET, "PERF   | <absent>");
            return false;
        };
        info!(
            target: TARGET,
            "PERF   | {} cpu={:.1}% mem={:.1}%",
            r.name(),
            r.cpu_utilization(),
            r.mem_utilization(),
        );
        true
    }

    fn on_actuator_response(&self, record: Option<ActuatorRecord>) -> bool {
        let Some(r) = record else {
            warn!(target: TARGET, "ACTRSP | <absent>");
            return false;
        };
        info!(
            target: TARGET,
            "ACTRSP | {} {} value={:.2} data={:?} status={}",
            r.name(),
            r.command(),
            r.value(),
            r.state_data(),
            r.meta().status_code(),
        );
        true
    }

    fn on_actuator_command_request(
        &self,
        record: Option<ActuatorRecord>,
    ) -> Option<ActuatorRecord> {
        if let Some(r) = record {
            info!(target: TARGET, "ACTCMD | {} {} (not applied)", r.name(), r.command());
        }
        None
    }
}
