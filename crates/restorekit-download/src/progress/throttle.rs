//! Progress throttling.
//!
//! Rate-limits transport progress events so the session is not flooded with
//! one event per network chunk.

use std::time::{Duration, Instant};

/// Default minimum spacing between progress events.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Rate-limiter for byte progress.
///
/// The first sample and the sample that completes the expected size always
/// pass; everything else passes at most once per interval.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Decide whether progress at `bytes_written` should be reported.
    pub fn should_emit(&mut self, bytes_written: u64, bytes_expected: Option<u64>) -> bool {
        let complete = bytes_expected.is_some_and(|expected| bytes_written >= expected);
        self.should_emit_at(Instant::now(), complete)
    }

    fn should_emit_at(&mut self, now: Instant, complete: bool) -> bool {
        match self.last_emit {
            Some(last) if !complete && now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Force the next check to return true.
    pub const fn reset(&mut self) {
        self.last_emit = None;
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}
