//! Device configuration parameters
//!
//! All tunable parameters for the constrained-device agent.
//! Values are read from a TOML file with two sections, `[device]` and
//! `[mqtt]`; every missing key falls back to the default documented here.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Poll interval used when the configured value is zero or negative.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// QoS used when the configured value falls outside 0..=2.
pub const DEFAULT_QOS: u8 = 1;
pub const DEFAULT_TOPIC_PREFIX: &str = "PIOT/ConstrainedDevice";

/// Where the simulated sensors draw their readings from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorSource {
    /// Uniform sampling within each sensor's default range.
    #[default]
    Random,
    /// Cyclic replay of a synthesized one-day curve.
    Dataset,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub device: DeviceSection,
    pub mqtt: MqttSection,
}

/// `[device]` section: subsystem toggles, control policy and polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    // --- Subsystems ---
    pub enable_system_perf: bool,
    pub enable_sensing: bool,
    pub enable_actuation: bool,
    pub enable_mqtt_client: bool,

    // --- Temperature → HVAC policy ---
    pub handle_temp_change_on_device: bool,
    /// Below this reading the HVAC is switched on, targeting the floor.
    pub trigger_hvac_temp_floor: f64,
    /// Above this reading the HVAC is switched on, targeting the ceiling.
    pub trigger_hvac_temp_ceiling: f64,

    // --- Timing ---
    /// Seconds between polls; values <= 0 fall back to the default.
    pub poll_interval_secs: i64,
    pub run_forever: bool,
    pub run_duration_secs: u64,

    // --- Identity ---
    pub location_id: String,
    pub sensor_source: SensorSource,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            enable_system_perf: true,
            enable_sensing: true,
            enable_actuation: true,
            enable_mqtt_client: false,

            handle_temp_change_on_device: true,
            trigger_hvac_temp_floor: 18.0,
            trigger_hvac_temp_ceiling: 20.0,

            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS as i64,
            run_forever: false,
            run_duration_secs: 65,

            location_id: "constraineddevice001".into(),
            sensor_source: SensorSource::Random,
        }
    }
}

/// `[mqtt]` section: broker endpoint and publish defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSection {
    pub host: String,
    pub port: u16,
    pub keep_alive_secs: u64,
    /// Raw configured QoS; see [`MqttSection::qos`].
    pub default_qos: i64,
    /// Falls back to the device location ID when unset.
    pub client_id: Option<String>,
    pub topic_prefix: String,
}

impl Default for MqttSection {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            keep_alive_secs: 60,
            default_qos: i64::from(DEFAULT_QOS),
            client_id: None,
            topic_prefix: DEFAULT_TOPIC_PREFIX.into(),
        }
    }
}

impl MqttSection {
    /// Configured QoS, coerced into 0..=2.
    pub fn qos(&self) -> u8 {
        match self.default_qos {
            q @ 0..=2 => q as u8,
            other => {
                warn!("mqtt default_qos {} out of range, using {}", other, DEFAULT_QOS);
                DEFAULT_QOS
            }
        }
    }
}

impl DeviceConfig {
    /// Load configuration.
    ///
    /// `None` yields the defaults.  A named file that is missing or
    /// malformed is an error: the operator asked for it explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("no config file given, using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml(&text)?;
        info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that would make the control policy meaningless.
    pub fn validate(&self) -> Result<()> {
        let d = &self.device;
        if d.trigger_hvac_temp_floor > d.trigger_hvac_temp_ceiling {
            return Err(Error::Config(format!(
                "trigger_hvac_temp_floor {} is above trigger_hvac_temp_ceiling {}",
                d.trigger_hvac_temp_floor, d.trigger_hvac_temp_ceiling
            )));
        }
        Ok(())
    }

    /// MQTT client ID, defaulting to the location ID.
    pub fn client_id(&self) -> &str {
        self.mqtt
            .client_id
            .as_deref()
            .unwrap_or(&self.device.location_id)
    }
}
