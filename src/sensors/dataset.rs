//! Finite reading sequences replayed cyclically by a sensor task.

use core::f64::consts::TAU;

use log::warn;
use rand::Rng;
use rand::distr::Uniform;

/// A non-empty list of readings plus a replay cursor.
///
/// Replay wraps to the first entry after the last, so callers observe an
/// infinite sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDataSet {
    values: Vec<f64>,
    index: usize,
}

impl SensorDataSet {
    /// `None` if `values` is empty.
    pub fn new(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { values, index: 0 })
    }

    /// One day of readings following a cosine curve: `min` at midnight,
    /// `max` at mid-day, each point jittered by up to `±noise`.
    ///
    /// `None` if `points` is zero or either bound is not finite.  Noise too
    /// large to sample is dropped.
    pub fn daily_curve(min: f64, max: f64, points: usize, noise: f64) -> Option<Self> {
        if points == 0 || !min.is_finite() || !max.is_finite() {
            return None;
        }
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let mid = lo / 2.0 + hi / 2.0;
        let amp = hi / 2.0 - lo / 2.0;
        let noise = noise.abs();
        let jitter = if noise > 0.0 {
            match Uniform::new_inclusive(-noise, noise) {
                Ok(dist) => Some(dist),
                Err(e) => {
                    warn!("dataset noise {noise} not samplable ({e}), dropping jitter");
                    None
                }
            }
        } else {
            None
        };
        let mut rng = rand::rng();
        let values = (0..points)
            .map(|i| {
                let phase = TAU * i as f64 / points as f64;
                let j = jitter.as_ref().map_or(0.0, |d| rng.sample(d));
                mid - amp * phase.cos() + j
            })
            .collect();
        Self::new(values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the entry under the cursor and advance it, wrapping at the end.
    pub fn next_value(&mut self) -> f64 {
        let v = self.values[self.index];
        self.index = (self.index + 1) % self.values.len();
        v
    }

    /// Rewind replay to the first entry.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}
