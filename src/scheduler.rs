//! Periodic invocation primitive.
//!
//! One [`PeriodicTask`] per polling subsystem.  Each owns a worker
//! thread that fires its callback every interval until stopped.
//!
//! ```text
//!   start() ──▶ spawn ──▶ ┌──────────── worker ────────────┐
//!                         │ recv_timeout(interval)          │
//!                         │   Timeout      ─▶ callback()    │
//!                         │   Stop / Drop  ─▶ exit          │
//!                         └─────────────────────────────────┘
//!   stop()  ──▶ send Stop ──▶ join
//! ```
//!
//! `stop()` joins the worker before returning, so no callback fires after
//! it returns.  Calling `stop()` from inside the callback only signals.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::error::{Error, Result};

/// Map a configured interval to a positive duration.
///
/// Zero or negative values fall back to the default rather than spin.
pub fn interval_from_secs(secs: i64) -> Duration {
    if secs > 0 {
        Duration::from_secs(secs as u64)
    } else {
        warn!(
            "poll interval {}s is not positive, using {}s",
            secs, DEFAULT_POLL_INTERVAL_SECS
        );
        Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }
}

// ═══════════════════════════════════════════════════════════════
//  PeriodicTask
// ═══════════════════════════════════════════════════════════════

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Fires a callback at a fixed interval on its own thread.
pub struct PeriodicTask {
    label: String,
    interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl PeriodicTask {
    pub fn new(label: impl Into<String>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        } else {
            interval
        };
        Self {
            label: label.into(),
            interval,
            worker: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Spawn the worker.  Returns `Ok(false)` if it is already running.
    pub fn start<F>(&self, mut callback: F) -> Result<bool>
    where
        F: FnMut() + Send + 'static,
    {
        let mut slot = self.worker.lock();
        if slot.is_some() {
            warn!("{}: already running", self.label);
            return Ok(false);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let label = self.label.clone();
        let handle = thread::Builder::new()
            .name(self.label.clone())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => callback(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("{}: worker exited", label);
            })
            .map_err(|e| Error::Scheduler(format!("{}: {}", self.label, e)))?;

        *slot = Some(Worker { stop_tx, handle });
        info!("{}: started, every {:?}", self.label, self.interval);
        Ok(true)
    }

    /// Signal the worker and wait for it.  Returns `false` if not running.
    pub fn stop(&self) -> bool {
        let Some(worker) = self.worker.lock().take() else {
            warn!("{}: already stopped", self.label);
            return false;
        };
        // The worker may already have exited on a dropped sender.
        let _ = worker.stop_tx.send(());
        if worker.handle.thread().id() == thread::current().id() {
            debug!("{}: stop requested from its own callback", self.label);
        } else if worker.handle.join().is_err() {
            warn!("{}: worker panicked", self.label);
        }
        info!("{}: stopped", self.label);
        true
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            let _ = worker.stop_tx.send(());
            if worker.handle.thread().id() != thread::current().id() {
                let _ = worker.handle.join();
            }
        }
    }
}
