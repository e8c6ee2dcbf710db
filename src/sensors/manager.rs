//! Sensor polling: samples every task on a timer and reports to the listener.

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use super::SensorTask;
use crate::app::ports::DataMessageListener;
use crate::error::Result;
use crate::scheduler::PeriodicTask;

struct Inner {
    tasks: Mutex<Vec<SensorTask>>,
    location_id: String,
    listener: Mutex<Option<Weak<dyn DataMessageListener>>>,
}

impl Inner {
    fn poll(&self) -> usize {
        let records: Vec<_> = {
            let mut tasks = self.tasks.lock();
            tasks
                .iter_mut()
                .map(|t| {
                    let mut r = t.generate_telemetry();
                    r.meta_mut().set_location_id(self.location_id.as_str());
                    r
                })
                .collect()
        };

        let Some(listener) = self.listener.lock().as_ref().and_then(Weak::upgrade) else {
            debug!("sensor poll: no listener, {} readings dropped", records.len());
            return 0;
        };
        records
            .into_iter()
            .filter(|r| {
                let ok = listener.on_sensor_event(Some(r.clone()));
                if !ok {
                    warn!("sensor poll: listener refused {}", r.name());
                }
                ok
            })
            .count()
    }
}

/// Owns the sensor tasks and the timer that polls them.
pub struct SensorManager {
    inner: Arc<Inner>,
    timer: PeriodicTask,
}

impl SensorManager {
    pub fn new(tasks: Vec<SensorTask>, location_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tasks: Mutex::new(tasks),
                location_id: location_id.into(),
                listener: Mutex::new(None),
            }),
            timer: PeriodicTask::new("sensor-poll", interval),
        }
    }

    /// Where readings go.  Held weakly; readings are dropped once the
    /// listener is gone.
    pub fn set_data_message_listener(&self, listener: Weak<dyn DataMessageListener>) {
        *self.inner.listener.lock() = Some(listener);
    }

    pub fn sensor_count(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// Sample every sensor once and deliver the readings.
    /// Returns how many the listener accepted.
    pub fn handle_telemetry(&self) -> usize {
        self.inner.poll()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn start(&self) -> Result<bool> {
        let inner = Arc::clone(&self.inner);
        let started = self.timer.start(move || {
            inner.poll();
        })?;
        if started {
            info!("sensor manager started ({} sensors)", self.sensor_count());
        }
        Ok(started)
    }

    pub fn stop(&self) -> bool {
        let stopped = self.timer.stop();
        if stopped {
            info!("sensor manager stopped");
        }
        stopped
    }
}
