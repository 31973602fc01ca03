//! Internal error types for the reqwest transport.
//!
//! These errors are internal to the transport and are mapped to
//! [`DownloadError`] at the port boundary.

use thiserror::Error;

use restorekit_core::DownloadError;

/// Result type alias for transport operations.
pub(crate) type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    /// Building the HTTP client failed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network or HTTP protocol error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The `Location` header of a redirect could not be resolved.
    #[error("Invalid redirect location: {0}")]
    InvalidRedirect(#[from] url::ParseError),

    /// The redirect chain exceeded the hop limit.
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    /// Writing the body to the staging file failed.
    #[error("Failed to stage download: {0}")]
    Staging(#[source] std::io::Error),

    /// The consumer stopped listening.
    #[error("Event receiver closed")]
    ReceiverClosed,

    #[error("Download cancelled")]
    Cancelled,
}

impl From<HttpError> for DownloadError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Staging(e) => Self::file_system("Failed to stage download", &e),
            HttpError::Cancelled | HttpError::ReceiverClosed => Self::Cancelled,
            HttpError::Network(e) | HttpError::Client(e) => Self::transport(e.to_string()),
            other @ (HttpError::InvalidRedirect(_) | HttpError::TooManyRedirects { .. }) => {
                Self::transport(other.to_string())
            }
        }
    }
}
