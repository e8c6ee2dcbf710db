//! Coordinator: fan-in of telemetry, fan-out of actuator commands.
//!
//! ```text
//!  SensorManager ──▶ on_sensor_event ──▶ ┌──────────────────────────┐
//!  PerfManager ────▶ on_performance_event│       Coordinator        │──▶ upstream
//!  inbound msg ────▶ on_incoming_message │ caches · ThresholdPolicy │   listener
//!                                        └────────────┬─────────────┘
//!                        on_actuator_command_request  │  ▲ on_actuator_response
//!                                                     ▼  │
//!                                              ActuatorManager
//! ```
//!
//! The coordinator is the only owner of the three name-keyed caches.  Each
//! cache sits behind its own lock.  The sensor-cache lock is held across
//! insert, policy evaluation and dispatch, so one sensor event is atomic
//! with respect to other sensor events.  Lock order is always
//! sensor cache → actuator task → actuator cache.
//!
//! The upstream listener is only called once every cache lock is
//! released, so it may read back through the coordinator.  A sensor
//! record reaches upstream before the actuator response it triggered.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use parking_lot::Mutex;

use super::policy::ThresholdPolicy;
use super::ports::{DataMessageListener, ResourceName};
use crate::actuators::ActuatorManager;
use crate::config::{DeviceConfig, SensorSource};
use crate::data::codec;
use crate::data::{ActuatorRecord, PerformanceRecord, SensorRecord};
use crate::error::Result;
use crate::scheduler::interval_from_secs;
use crate::sensors::{SampleSource, SensorDataSet, SensorKind, SensorManager, SensorTask};
use crate::system::PerformanceManager;

/// Points per synthesized day when replaying datasets (one per hour).
const DATASET_POINTS: usize = 24;
const DATASET_NOISE: f64 = 0.25;

// ───────────────────────────────────────────────────────────────
// Coordinator
// ───────────────────────────────────────────────────────────────

pub struct Coordinator {
    sensor_cache: Mutex<HashMap<String, SensorRecord>>,
    actuator_cache: Mutex<HashMap<String, ActuatorRecord>>,
    perf_cache: Mutex<HashMap<String, PerformanceRecord>>,

    handle_on_device: bool,
    policies: Vec<ThresholdPolicy>,

    sensors: Option<SensorManager>,
    perf: Option<PerformanceManager>,
    actuators: Option<ActuatorManager>,
    upstream: Option<Arc<dyn DataMessageListener>>,

    started: AtomicBool,
}

impl Coordinator {
    /// An empty coordinator: no sub-managers, no policies, no upstream.
    pub fn new(handle_on_device: bool) -> Self {
        Self {
            sensor_cache: Mutex::new(HashMap::new()),
            actuator_cache: Mutex::new(HashMap::new()),
            perf_cache: Mutex::new(HashMap::new()),
            handle_on_device,
            policies: Vec::new(),
            sensors: None,
            perf: None,
            actuators: None,
            upstream: None,
            started: AtomicBool::new(false),
        }
    }

    /// Build from configuration, creating each enabled sub-manager.
    pub fn from_config(cfg: &DeviceConfig) -> Self {
        let d = &cfg.device;
        let interval = interval_from_secs(d.poll_interval_secs);
        let mut c = Self::new(d.handle_temp_change_on_device).with_policy(ThresholdPolicy::hvac(
            d.trigger_hvac_temp_floor,
            d.trigger_hvac_temp_ceiling,
        ));

        if d.enable_sensing {
            let tasks = SensorKind::ALL
                .into_iter()
                .map(|kind| sensor_task_for(kind, d.sensor_source))
                .collect();
            c = c.with_sensor_manager(SensorManager::new(tasks, d.location_id.as_str(), interval));
        }
        if d.enable_system_perf {
            c = c.with_performance_manager(PerformanceManager::with_os_probes(
                d.location_id.as_str(),
                interval,
            ));
        }
        if d.enable_actuation {
            c = c.with_actuator_manager(ActuatorManager::with_emulators());
        }
        c
    }

    // ── Builder ───────────────────────────────────────────────

    #[must_use]
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    #[must_use]
    pub fn with_sensor_manager(mut self, m: SensorManager) -> Self {
        self.sensors = Some(m);
        self
    }

    #[must_use]
    pub fn with_performance_manager(mut self, m: PerformanceManager) -> Self {
        self.perf = Some(m);
        self
    }

    #[must_use]
    pub fn with_actuator_manager(mut self, m: ActuatorManager) -> Self {
        self.actuators = Some(m);
        self
    }

    /// Forward cached records to `listener` (e.g. a message bus).
    #[must_use]
    pub fn with_upstream(mut self, listener: Arc<dyn DataMessageListener>) -> Self {
        self.upstream = Some(listener);
        self
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn get_latest_sensor(&self, name: &str) -> Option<SensorRecord> {
        self.sensor_cache.lock().get(name).cloned()
    }

    pub fn get_latest_actuator(&self, name: &str) -> Option<ActuatorRecord> {
        self.actuator_cache.lock().get(name).cloned()
    }

    pub fn get_latest_performance(&self, name: &str) -> Option<PerformanceRecord> {
        self.perf_cache.lock().get(name).cloned()
    }

    pub fn actuators(&self) -> Option<&ActuatorManager> {
        self.actuators.as_ref()
    }

    pub fn sensors(&self) -> Option<&SensorManager> {
        self.sensors.as_ref()
    }

    pub fn performance(&self) -> Option<&PerformanceManager> {
        self.perf.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Wire the sub-managers back to this coordinator and start them.
    ///
    /// Returns `Ok(false)` if already started.
    pub fn start(self: &Arc<Self>) -> Result<bool> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("coordinator already started");
            return Ok(false);
        }

        let me: Arc<dyn DataMessageListener> = Arc::clone(self) as Arc<dyn DataMessageListener>;
        let weak = Arc::downgrade(&me);

        if let Some(perf) = &self.perf {
            perf.set_data_message_listener(weak.clone());
            if let Err(e) = perf.start() {
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        if let Some(sensors) = &self.sensors {
            sensors.set_data_message_listener(weak);
            if let Err(e) = sensors.start() {
                if let Some(perf) = &self.perf {
                    perf.stop();
                }
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        info!("coordinator started");
        Ok(true)
    }

    /// Stop every sub-manager.  Returns `false` if not started.
    pub fn stop(&self) -> bool {
        if !self.started.swap(false, Ordering::SeqCst) {
            warn!("coordinator already stopped");
            return false;
        }
        if let Some(perf) = &self.perf {
            perf.stop();
        }
        if let Some(sensors) = &self.sensors {
            sensors.stop();
        }
        info!("coordinator stopped");
        true
    }

    // ── Internals ─────────────────────────────────────────────

    /// First applicable policy decides; at most one command per reading.
    fn analyze(&self, reading: &SensorRecord) -> Option<ActuatorRecord> {
        if !self.handle_on_device {
            return None;
        }
        self.policies.iter().find_map(|p| p.evaluate(reading))
    }

    /// Route `cmd` to its actuator and cache the response.  Never calls upstream.
    fn apply_command(&self, cmd: &ActuatorRecord) -> Option<ActuatorRecord> {
        let Some(actuators) = &self.actuators else {
            warn!("actuation disabled, dropping command for {}", cmd.name());
            return None;
        };
        let resp = actuators.send_command(cmd)?;
        self.actuator_cache
            .lock()
            .insert(resp.name().to_owned(), resp.clone());
        Some(resp)
    }

    fn forward<F>(&self, what: &str, deliver: F)
    where
        F: FnOnce(&dyn DataMessageListener) -> bool,
    {
        if let Some(up) = &self.upstream {
            if !deliver(up.as_ref()) {
                warn!("upstream refused {}: delivery not guaranteed", what);
            }
        }
    }
}

fn sensor_task_for(kind: SensorKind, source: SensorSource) -> SensorTask {
    match source {
        SensorSource::Random => SensorTask::random(kind),
        SensorSource::Dataset => {
            let (min, max) = kind.default_range();
            SensorDataSet::daily_curve(min, max, DATASET_POINTS, DATASET_NOISE).map_or_else(
                || SensorTask::random(kind),
                |ds| SensorTask::new(kind, SampleSource::Dataset(ds)),
            )
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Listener conformance
// ───────────────────────────────────────────────────────────────

impl DataMessageListener for Coordinator {
    fn on_sensor_event(&self, record: Option<SensorRecord>) -> bool {
        let Some(record) = record else {
            warn!("sensor event without a record");
            return false;
        };
        debug!("sensor {} = {:.3}", record.name(), record.value());

        let response = {
            let mut cache = self.sensor_cache.lock();
            cache.insert(record.name().to_owned(), record.clone());
            self.analyze(&record).and_then(|cmd| {
                debug!("policy issued {} {} for {}", cmd.command(), cmd.value(), record.name());
                self.apply_command(&cmd)
            })
        };

        self.forward(record.name(), |up| up.on_sensor_event(Some(record.clone())));
        if let Some(resp) = response {
            self.forward(resp.name(), |up| up.on_actuator_response(Some(resp.clone())));
        }
        true
    }

    fn on_performance_event(&self, record: Option<PerformanceRecord>) -> bool {
        let Some(record) = record else {
            warn!("performance event without a record");
            return false;
        };
        self.perf_cache
            .lock()
            .insert(record.name().to_owned(), record.clone());
        self.forward(record.name(), |up| up.on_performance_event(Some(record.clone())));
        true
    }

    fn on_actuator_response(&self, record: Option<ActuatorRecord>) -> bool {
        let Some(record) = record else {
            warn!("actuator response without a record");
            return false;
        };
        self.actuator_cache
            .lock()
            .insert(record.name().to_owned(), record.clone());
        self.forward(record.name(), |up| up.on_actuator_response(Some(record.clone())));
        true
    }

    fn on_actuator_command_request(
        &self,
        record: Option<ActuatorRecord>,
    ) -> Option<ActuatorRecord> {
        let Some(record) = record else {
            warn!("actuator command without a record");
            return None;
        };
        let resp = self.apply_command(&record)?;
        self.forward(resp.name(), |up| up.on_actuator_response(Some(resp.clone())));
        Some(resp)
    }

    fn on_incoming_message(&self, resource: ResourceName, payload: &[u8]) -> bool {
        match resource {
            ResourceName::ActuatorCmd => {
                let Some(cmd) = codec::from_json::<ActuatorRecord>(payload) else {
                    return false;
                };
                if cmd.is_response() {
                    warn!("inbound {} is a response, ignoring", cmd.name());
                    return false;
                }
                info!("inbound command {} for {}", cmd.command(), cmd.name());
                let _ = self.on_actuator_command_request(Some(cmd));
                true
            }
            other => {
                debug!("no handler for inbound {}", other);
                false
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if self.started.load(Ordering::SeqCst) {
            self.stop();
        }
    }
}
