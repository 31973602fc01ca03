//! Observable download state.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier of one download attempt within a session.
///
/// Attempt ids increase monotonically; `AttemptId::NONE` is the id reported
/// before the first attempt starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptId(u64);

impl AttemptId {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of the session's current download.
///
/// Per attempt the state only moves forward:
/// `Idle → Downloading* → (Failed | Done)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    #[default]
    Idle,
    Downloading {
        /// Fraction in `[0, 1]`, unknown until the size is known.
        fraction_complete: Option<f64>,
        /// Estimated seconds remaining; may be negative.
        eta_seconds: Option<f64>,
    },
    Failed {
        reason: String,
    },
    Done {
        artifact_path: PathBuf,
    },
}

impl DownloadState {
    #[must_use]
    pub const fn downloading(fraction_complete: Option<f64>, eta_seconds: Option<f64>) -> Self {
        Self::Downloading {
            fraction_complete,
            eta_seconds,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn done(artifact_path: impl Into<PathBuf>) -> Self {
        Self::Done {
            artifact_path: artifact_path.into(),
        }
    }

    /// Whether no further transitions can happen for this attempt.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Done { .. })
    }

    #[must_use]
    pub const fn fraction_complete(&self) -> Option<f64> {
        match self {
            Self::Downloading {
                fraction_complete, ..
            } => *fraction_complete,
            _ => None,
        }
    }

    #[must_use]
    pub const fn eta_seconds(&self) -> Option<f64> {
        match self {
            Self::Downloading { eta_seconds, .. } => *eta_seconds,
            _ => None,
        }
    }
}

/// One entry of the ordered state stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadUpdate {
    pub attempt: AttemptId,
    pub state: DownloadState,
}

impl DownloadUpdate {
    #[must_use]
    pub const fn new(attempt: AttemptId, state: DownloadState) -> Self {
        Self { attempt, state }
    }
}
