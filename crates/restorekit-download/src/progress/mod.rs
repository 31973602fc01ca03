//! Progress tracking and throttling.
//!
//! This module handles throughput/ETA estimation for the session and
//! rate-limiting of progress events in the transport.

mod estimator;
mod throttle;

pub use estimator::{
    Estimate, MIN_FRACTION_FOR_ETA, OBSERVATION_LIMIT, ProgressEstimator, UNKNOWN_THROUGHPUT,
};
pub use throttle::{DEFAULT_PROGRESS_INTERVAL, ProgressThrottle};
