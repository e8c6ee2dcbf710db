//! Sensor sampling tasks.
//!
//! A [`SensorTask`] produces one [`SensorRecord`] per call.  What the
//! reading is depends on its [`SampleSource`]:
//!
//! | Source    | Reading                                       |
//! |-----------|-----------------------------------------------|
//! | `Random`  | uniform in the closed range `[min, max]`       |
//! | `Dataset` | next dataset entry, wrapping after the last    |
//! | `Device`  | whatever the attached [`ReadingSource`] yields |
//!
//! Sampling never fails.

pub mod dataset;
pub mod manager;

use log::debug;
use rand::Rng;
use rand::distr::Uniform;

use crate::app::ports::ReadingSource;
use crate::data::{
    HUMIDITY_SENSOR_NAME, HUMIDITY_SENSOR_TYPE, PRESSURE_SENSOR_NAME, PRESSURE_SENSOR_TYPE,
    SensorRecord, TEMP_SENSOR_NAME, TEMP_SENSOR_TYPE,
};

pub use dataset::SensorDataSet;
pub use manager::SensorManager;

// ───────────────────────────────────────────────────────────────
// Sensor kinds
// ───────────────────────────────────────────────────────────────

/// The sensors this device knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Pressure,
}

impl SensorKind {
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Pressure];

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => TEMP_SENSOR_NAME,
            Self::Humidity => HUMIDITY_SENSOR_NAME,
            Self::Pressure => PRESSURE_SENSOR_NAME,
        }
    }

    pub fn type_id(self) -> i32 {
        match self {
            Self::Temperature => TEMP_SENSOR_TYPE,
            Self::Humidity => HUMIDITY_SENSOR_TYPE,
            Self::Pressure => PRESSURE_SENSOR_TYPE,
        }
    }

    /// Plausible simulated range: °C, %RH, hPa.
    pub fn default_range(self) -> (f64, f64) {
        match self {
            Self::Temperature => (15.0, 29.0),
            Self::Humidity => (35.0, 45.0),
            Self::Pressure => (990.0, 1030.0),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sample sources
// ───────────────────────────────────────────────────────────────

pub enum SampleSource {
    Random { min: f64, max: f64 },
    Dataset(SensorDataSet),
    Device(Box<dyn ReadingSource>),
}

impl SampleSource {
    /// Closed range; bounds given in either order.
    pub fn random(a: f64, b: f64) -> Self {
        if a <= b {
            Self::Random { min: a, max: b }
        } else {
            Self::Random { min: b, max: a }
        }
    }

    fn sample(&mut self) -> f64 {
        match self {
            Self::Random { min, max } => match Uniform::new_inclusive(*min, *max) {
                Ok(dist) => rand::rng().sample(dist),
                Err(e) => {
                    let mid = *min / 2.0 + *max / 2.0;
                    debug!("range [{min}, {max}] not samplable ({e}), using {mid}");
                    mid
                }
            },
            Self::Dataset(ds) => ds.next_value(),
            Self::Device(dev) => dev.read(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Random { .. } => "random",
            Self::Dataset(_) => "dataset",
            Self::Device(_) => "device",
        }
    }
}

impl core::fmt::Debug for SampleSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Random { min, max } => write!(f, "Random[{min}, {max}]"),
            Self::Dataset(ds) => write!(f, "Dataset(len={})", ds.len()),
            Self::Device(_) => write!(f, "Device"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SensorTask
// ───────────────────────────────────────────────────────────────

/// Produces telemetry for one named sensor and memoizes the latest record.
#[derive(Debug)]
pub struct SensorTask {
    name: String,
    type_id: i32,
    source: SampleSource,
    latest: Option<SensorRecord>,
}

impl SensorTask {
    pub fn new(kind: SensorKind, source: SampleSource) -> Self {
        Self::custom(kind.name(), kind.type_id(), source)
    }

    /// Uniform sampling over the kind's default range.
    pub fn random(kind: SensorKind) -> Self {
        let (min, max) = kind.default_range();
        Self::new(kind, SampleSource::random(min, max))
    }

    /// A sensor outside the built-in kinds.
    pub fn custom(name: impl Into<String>, type_id: i32, source: SampleSource) -> Self {
        Self {
            name: name.into(),
            type_id,
            source,
            latest: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    /// Take a fresh sample and remember it.
    pub fn generate_telemetry(&mut self) -> SensorRecord {
        let value = self.source.sample();
        let record = SensorRecord::new(self.name.as_str(), self.type_id).with_value(value);
        debug!("{}: {} sample {:.3}", self.name, self.source.label(), value);
        self.latest = Some(record.clone());
        record
    }

    /// The last record produced, without resampling.
    pub fn get_latest_telemetry(&self) -> Option<&SensorRecord> {
        self.latest.as_ref()
    }

    /// The memoized value, sampling once only if nothing has been sampled yet.
    pub fn get_telemetry_value(&mut self) -> f64 {
        if let Some(r) = &self.latest {
            return r.value();
        }
        self.generate_telemetry().value()
    }
}
