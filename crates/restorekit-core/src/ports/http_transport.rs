//! HTTP transport port.
//!
//! A transport performs one transfer and reports everything that happens as
//! an ordered stream of [`TransportEvent`]s. Redirects are surfaced to the
//! consumer, which answers through a oneshot channel before the transport
//! continues.

use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::download::DownloadError;

/// A single transfer handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Initial URL to fetch.
    pub url: Url,
    /// Value of the `Cookie` header for the initial request.
    pub cookie: Option<String>,
    /// Directory the body is staged in; must be on the destination volume.
    pub staging_dir: PathBuf,
}

impl TransportRequest {
    pub fn new(url: Url, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            url,
            cookie: None,
            staging_dir: staging_dir.into(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }
}

/// A redirect response the transport is about to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// Status code of the redirect response.
    pub status: u16,
    /// Resolved target of the `Location` header.
    pub target: Url,
    /// Response headers, in the order received.
    pub headers: Vec<(String, String)>,
    /// `Cookie` header sent with the request that was redirected.
    pub request_cookie: Option<String>,
}

impl RedirectHop {
    pub const fn new(status: u16, target: Url) -> Self {
        Self {
            status,
            target,
            headers: Vec::new(),
            request_cookie: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_request_cookie(mut self, cookie: Option<String>) -> Self {
        self.request_cookie = cookie;
        self
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Answer to a [`TransportEvent::Redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Follow the redirect, sending `cookie` with the next request.
    Continue { cookie: Option<String> },
    /// Do not follow the redirect and end the transfer without further events.
    Abort(DownloadError),
}

/// Something that happened during a transfer.
#[derive(Debug)]
pub enum TransportEvent {
    /// The server redirected; the transport waits for `reply`.
    Redirect {
        hop: RedirectHop,
        reply: oneshot::Sender<RedirectDecision>,
    },
    /// More of the body has been written to the staging file.
    Progress {
        bytes_written: u64,
        bytes_expected: Option<u64>,
    },
    /// The final response has been received completely.
    ///
    /// `body` is deleted when dropped unless it is persisted.
    Finished { status: u16, body: TempPath },
    /// The transfer failed; no further events follow.
    Failed(DownloadError),
}

/// Port for performing one HTTP transfer.
///
/// Implementations must stop promptly once `cancel` fires, reporting
/// `Failed(DownloadError::Cancelled)` if the consumer is still listening.
/// A closed `events` channel means the consumer has lost interest.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(
        &self,
        request: TransportRequest,
        events: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    );
}
