//! Download error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error` or `reqwest::Error`. Adapters capture
//! the message as a string at the port boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for a single download attempt.
///
/// Every variant is terminal for the attempt that produced it; the session
/// publishes [`DownloadError::user_message`] as the failure reason.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadError {
    /// A redirect pointed at an authentication-failure page.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The server answered with a non-success status code.
    #[error("HTTP error {code}")]
    HttpStatus {
        /// The HTTP status code of the final response.
        code: u16,
    },

    /// No destination path could be derived from the URL.
    #[error("Missing destination path")]
    MissingDestination,

    /// A filesystem operation on the artifact failed.
    #[error("{context}: {message}")]
    FileSystem {
        /// What was being done (e.g. "Failed to move downloaded file").
        context: String,
        /// Detailed error message.
        message: String,
    },

    /// The transfer failed below the HTTP layer.
    #[error("Transport error: {message}")]
    Transport {
        /// Detailed error message.
        message: String,
    },

    /// Download was cancelled.
    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Create an HTTP status error.
    #[must_use]
    pub const fn http_status(code: u16) -> Self {
        Self::HttpStatus { code }
    }

    /// Create a filesystem error from a `std::io::Error`.
    pub fn file_system(context: impl Into<String>, err: &std::io::Error) -> Self {
        Self::FileSystem {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// Get a user-friendly error message, used as the `Failed` reason.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired => {
                "The download failed due to missing authentication credentials.".to_string()
            }
            Self::HttpStatus { code } => {
                format!("HTTP error {code}. Please check the download link.")
            }
            Self::MissingDestination => "Missing destination path.".to_string(),
            Self::FileSystem { context, message } => format!("{context}: {message}"),
            Self::Transport { message } => message.clone(),
            Self::Cancelled => "The download was cancelled.".to_string(),
        }
    }
}
