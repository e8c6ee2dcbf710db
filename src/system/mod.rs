//! Performance sampling: device CPU and memory utilisation.
//!
//! Each [`PerformanceTask`] wraps a [`ReadingSource`].  The production
//! sources are the sysinfo-backed [`CpuProbe`] and [`MemProbe`]; tests
//! substitute closures.  Readings are passed through unvalidated; the
//! probes themselves report percentages.

pub mod manager;

use log::debug;
use sysinfo::System;

use crate::app::ports::ReadingSource;
use crate::data::{CPU_UTIL_NAME, CPU_UTIL_TYPE, MEM_UTIL_NAME, MEM_UTIL_TYPE};

pub use manager::PerformanceManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfKind {
    Cpu,
    Mem,
}

impl PerfKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpu => CPU_UTIL_NAME,
            Self::Mem => MEM_UTIL_NAME,
        }
    }

    pub fn type_id(self) -> i32 {
        match self {
            Self::Cpu => CPU_UTIL_TYPE,
            Self::Mem => MEM_UTIL_TYPE,
        }
    }
}

/// One utilisation metric.
pub struct PerformanceTask {
    kind: PerfKind,
    source: Box<dyn ReadingSource>,
}

impl PerformanceTask {
    pub fn new(kind: PerfKind, source: Box<dyn ReadingSource>) -> Self {
        Self { kind, source }
    }

    /// CPU utilisation read from the OS.
    pub fn cpu() -> Self {
        Self::new(PerfKind::Cpu, Box::new(CpuProbe::new()))
    }

    /// Memory utilisation read from the OS.
    pub fn mem() -> Self {
        Self::new(PerfKind::Mem, Box::new(MemProbe::new()))
    }

    pub fn kind(&self) -> PerfKind {
        self.kind
    }

    /// Current utilisation in percent, exactly as the source reports it.
    pub fn get_telemetry_value(&mut self) -> f64 {
        let v = self.source.read();
        debug!("{}: {:.2}%", self.kind.name(), v);
        v
    }
}

// ───────────────────────────────────────────────────────────────
// sysinfo probes
// ───────────────────────────────────────────────────────────────

/// Global CPU usage across all cores.
///
/// Usage is computed between refreshes, so the first reading after
/// construction reflects the interval since `new()`.
pub struct CpuProbe {
    sys: System,
}

impl CpuProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self { sys }
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for CpuProbe {
    fn read(&mut self) -> f64 {
        self.sys.refresh_cpu_usage();
        f64::from(self.sys.global_cpu_info().cpu_usage())
    }
}

/// Used memory as a share of total memory.
pub struct MemProbe {
    sys: System,
}

impl MemProbe {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for MemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for MemProbe {
    fn read(&mut self) -> f64 {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.sys.used_memory() as f64 / total as f64 * 100.0
    }
}
