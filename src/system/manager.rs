//! Performance polling: one combined CPU + memory record per tick.

use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use super::PerformanceTask;
use crate::app::ports::DataMessageListener;
use crate::data::PerformanceRecord;
use crate::error::Result;
use crate::scheduler::PeriodicTask;

struct Inner {
    cpu: Mutex<PerformanceTask>,
    mem: Mutex<PerformanceTask>,
    location_id: String,
    listener: Mutex<Option<Weak<dyn DataMessageListener>>>,
}

impl Inner {
    fn sample(&self) -> PerformanceRecord {
        let cpu = self.cpu.lock().get_telemetry_value();
        let mem = self.mem.lock().get_telemetry_value();
        let mut rec = PerformanceRecord::new();
        rec.set_cpu_utilization(cpu);
        rec.set_mem_utilization(mem);
        rec.meta_mut().set_location_id(self.location_id.as_str());
        rec
    }

    fn poll(&self) -> bool {
        let rec = self.sample();
        info!(
            "CPU utilization: {:.2}%, memory utilization: {:.2}%",
            rec.cpu_utilization(),
            rec.mem_utilization()
        );
        let Some(listener) = self.listener.lock().as_ref().and_then(Weak::upgrade) else {
            debug!("perf poll: no listener");
            return false;
        };
        let ok = listener.on_performance_event(Some(rec));
        if !ok {
            warn!("perf poll: listener refused sample");
        }
        ok
    }
}

/// Owns the CPU and memory tasks and the timer that polls them.
pub struct PerformanceManager {
    inner: Arc<Inner>,
    timer: PeriodicTask,
}

impl PerformanceManager {
    pub fn new(
        cpu: PerformanceTask,
        mem: PerformanceTask,
        location_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cpu: Mutex::new(cpu),
                mem: Mutex::new(mem),
                location_id: location_id.into(),
                listener: Mutex::new(None),
            }),
            timer: PeriodicTask::new("perf-poll", interval),
        }
    }

    /// OS-backed CPU and memory probes.
    pub fn with_os_probes(location_id: impl Into<String>, interval: Duration) -> Self {
        Self::new(PerformanceTask::cpu(), PerformanceTask::mem(), location_id, interval)
    }

    pub fn set_data_message_listener(&self, listener: Weak<dyn DataMessageListener>) {
        *self.inner.listener.lock() = Some(listener);
    }

    /// Sample once and deliver.  `true` if the listener accepted it.
    pub fn handle_telemetry(&self) -> bool {
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
            info!("performance manager started");
        }
        Ok(started)
    }

    pub fn stop(&self) -> bool {
        let stopped = self.timer.stop();
        if stopped {
            info!("performance manager stopped");
        }
        stopped
    }
}
