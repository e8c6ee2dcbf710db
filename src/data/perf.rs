//! System performance record.

use serde::{Deserialize, Serialize};

use super::{DEFAULT_VAL, RecordMeta, SYSTEM_PERF_NAME, SYSTEM_PERF_TYPE};

/// Device CPU and memory utilisation, both in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    #[serde(flatten)]
    meta: RecordMeta,
    #[serde(default)]
    cpu_util: f64,
    #[serde(default)]
    mem_util: f64,
}

impl PerformanceRecord {
    pub fn new() -> Self {
        Self::named(SYSTEM_PERF_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(name, SYSTEM_PERF_TYPE),
            cpu_util: DEFAULT_VAL,
            mem_util: DEFAULT_VAL,
        }
    }

    pub fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn cpu_utilization(&self) -> f64 {
        self.cpu_util
    }

    pub fn mem_utilization(&self) -> f64 {
        self.mem_util
    }

    pub fn set_cpu_utilization(&mut self, pct: f64) {
        self.cpu_util = pct;
        self.meta.touch();
    }

    pub fn set_mem_utilization(&mut self, pct: f64) {
        self.mem_util = pct;
        self.meta.touch();
    }
}

impl Default for PerformanceRecord {
    fn default() -> Self {
        Self::new()
    }
}
