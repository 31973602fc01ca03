//! Throughput and time-remaining estimation.
//!
//! Each observation yields a cumulative rate: the fraction completed divided
//! by the elapsed time before that observation. Throughput is the mean of the
//! most recent rates, and the ETA is the time the whole transfer would take
//! at that throughput minus the time already spent.

use std::collections::VecDeque;

/// Maximum number of rate observations kept.
pub const OBSERVATION_LIMIT: usize = 500;

/// Fraction that must be exceeded before an ETA is reported.
pub const MIN_FRACTION_FOR_ETA: f64 = 0.01;

/// Throughput reported before any usable observation exists.
pub const UNKNOWN_THROUGHPUT: f64 = -1.0;

/// Result of one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Mean rate in fraction per second, or [`UNKNOWN_THROUGHPUT`].
    pub throughput: f64,
    /// Seconds remaining; may be negative.
    pub eta_seconds: Option<f64>,
}

/// Rolling estimator fed with progress samples of one transfer.
#[derive(Debug, Clone, Default)]
pub struct ProgressEstimator {
    elapsed: f64,
    observations: VecDeque<f64>,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `fraction_complete` was reached `interval` seconds after
    /// the previous sample.
    pub fn observe(&mut self, fraction_complete: f64, interval: f64) -> Estimate {
        let rate = fraction_complete / self.elapsed;
        // NaN and infinities fail both checks; fractions are never negative.
        if rate.is_finite() && rate > 0.0 {
            self.observations.push_back(rate);
            if self.observations.len() > OBSERVATION_LIMIT {
                self.observations.pop_front();
            }
        }

        self.elapsed += interval;

        let throughput = self.throughput();
        let eta_seconds = (fraction_complete > MIN_FRACTION_FOR_ETA && throughput > 0.0)
            .then(|| 1.0 / throughput - self.elapsed);

        Estimate {
            throughput,
            eta_seconds,
        }
    }

    /// Mean of the retained rates, or [`UNKNOWN_THROUGHPUT`] when none.
    pub fn throughput(&self) -> f64 {
        if self.observations.is_empty() {
            return UNKNOWN_THROUGHPUT;
        }
        self.observations.iter().sum::<f64>() / self.observations.len() as f64
    }

    /// Seconds accumulated across all observations.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    /// Retained rates, oldest first.
    pub fn observations(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().copied()
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.observations.clear();
    }
}
