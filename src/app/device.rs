//! Device application lifecycle.
//!
//! Builds the [`Coordinator`] from [`DeviceConfig`] and, when enabled, the
//! MQTT connector with a bus listener as the coordinator's upstream.
//!
//! ```text
//!   DeviceApp::new ──▶ Coordinator::from_config ─┬─ upstream: BusListener<MqttConnector>
//!                                                └─ upstream: LogListener (no MQTT)
//!   start ──▶ mqtt.connect · subscribe(ActuatorCmd) · coordinator.start
//!   stop  ──▶ coordinator.stop · unsubscribe · mqtt.disconnect
//! ```

use std::sync::Arc;

use log::{info, warn};

use super::coordinator::Coordinator;
use super::ports::{DataMessageListener, PubSubPort, ResourceName};
use crate::adapters::bus::BusListener;
use crate::adapters::log_sink::LogListener;
use crate::adapters::mqtt::{MqttConnector, MqttSettings};
use crate::config::DeviceConfig;
use crate::error::Result;

pub struct DeviceApp {
    coordinator: Arc<Coordinator>,
    mqtt: Option<Arc<MqttConnector>>,
    qos: i32,
    started: bool,
}

impl DeviceApp {
    /// Validate `config` and assemble every enabled subsystem.
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        config.validate()?;
        let qos = i32::from(config.mqtt.qos());

        let mqtt = config
            .device
            .enable_mqtt_client
            .then(|| Arc::new(MqttConnector::new(MqttSettings::from_config(config))));

        let upstream: Arc<dyn DataMessageListener> = match &mqtt {
            Some(m) => Arc::new(BusListener::new(Arc::clone(m), qos)),
            None => Arc::new(LogListener::new()),
        };
        let coordinator = Arc::new(Coordinator::from_config(config).with_upstream(upstream));

        info!(
            "device app created (location={}, mqtt={})",
            config.device.location_id,
            mqtt.is_some()
        );
        Ok(Self {
            coordinator,
            mqtt,
            qos,
            started: false,
        })
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Returns `Ok(false)` if already started.
    pub fn start(&mut self) -> Result<bool> {
        if self.started {
            warn!("device app already started");
            return Ok(false);
        }
        if let Some(mqtt) = &self.mqtt {
            let as_listener: Arc<dyn DataMessageListener> = self.coordinator.clone();
            mqtt.set_data_message_listener(Arc::downgrade(&as_listener));
            mqtt.connect()?;
            if !mqtt.subscribe(ResourceName::ActuatorCmd, self.qos) {
                warn!("inbound actuator commands unavailable");
            }
        }
        if let Err(e) = self.coordinator.start() {
            if let Some(mqtt) = &self.mqtt {
                mqtt.disconnect();
            }
            return Err(e);
        }
        self.started = true;
        info!("device app started");
        Ok(true)
    }

    /// Returns `false` if not started.
    pub fn stop(&mut self) -> bool {
        if !self.started {
            warn!("device app already stopped");
            return false;
        }
        self.coordinator.stop();
        if let Some(mqtt) = &self.mqtt {
            mqtt.unsubscribe(ResourceName::ActuatorCmd);
            mqtt.disconnect();
        }
        self.started = false;
        info!("device app stopped");
        true
    }
}

impl Drop for DeviceApp {
    fn drop(&mut self) {
        if self.started {
            self.stop();
        }
    }
}
