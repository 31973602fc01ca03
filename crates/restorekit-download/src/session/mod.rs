//! Download session.
//!
//! A session drives at most one transfer at a time. Starting a download
//! supersedes whatever attempt was running: its transport is cancelled and
//! anything it still reports is dropped by the [`StatePublisher`].
//!
//! # Concurrency Model
//!
//! - One spawned task per attempt runs the transport and its consumer side by side
//! - Transport events reach the consumer through a bounded channel, in order
//! - All state goes through the publisher lock; lock order: active → publisher

mod attempt;
mod publisher;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use restorekit_core::utils::url_file_name;
use restorekit_core::{
    AttemptId, CatalogContent, DownloadConfig, DownloadError, DownloadState, DownloadUpdate,
    FileMetadataStore, HttpTransport, IdentityTuple, TransportRequest,
};

use attempt::AttemptDriver;
use publisher::StatePublisher;

/// Capacity of the transport → consumer event channel.
const EVENT_BUFFER: usize = 64;

/// The running attempt, if any.
struct ActiveAttempt {
    attempt: AttemptId,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Single-transfer download engine.
///
/// Must be used from within a Tokio runtime.
pub struct DownloadSession {
    config: DownloadConfig,
    cookie: Mutex<Option<String>>,
    transport: Arc<dyn HttpTransport>,
    metadata: Arc<dyn FileMetadataStore>,
    publisher: Arc<StatePublisher>,
    active: Mutex<Option<ActiveAttempt>>,
}

impl DownloadSession {
    pub fn new(
        config: DownloadConfig,
        transport: Arc<dyn HttpTransport>,
        metadata: Arc<dyn FileMetadataStore>,
    ) -> Self {
        let cookie = Mutex::new(config.cookie.clone());
        Self {
            config,
            cookie,
            transport,
            metadata,
            publisher: Arc::new(StatePublisher::new()),
            active: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Cookie attached to the initial request of future attempts.
    pub fn cookie(&self) -> Option<String> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_cookie(&self, cookie: Option<String>) {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    /// Where a download of `url` ends up, or `None` when the URL names no file.
    pub fn destination_for(&self, url: &Url) -> Option<PathBuf> {
        destination_path(&self.config.downloads_directory, url)
    }

    /// Start downloading `url`, superseding any attempt in flight.
    pub fn start_download(&self, url: Url) -> AttemptId {
        self.start(url, None)
    }

    /// Start downloading a catalog entry and tag the artifact with its identity.
    pub fn start_catalog_download<C: CatalogContent + ?Sized>(&self, content: &C) -> AttemptId {
        self.start(
            content.url().clone(),
            Some(IdentityTuple::from_content(content)),
        )
    }

    /// Cancel the attempt in flight.
    ///
    /// The state becomes `Failed` once the transport reports the
    /// cancellation, unless the attempt settled first.
    pub fn cancel_download(&self) {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = active.as_ref() {
            debug!(attempt = %active.attempt, "Cancelling download");
            active.cancel.cancel();
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DownloadState {
        self.publisher.current().state
    }

    /// Id of the most recently started attempt.
    pub fn current_attempt(&self) -> AttemptId {
        self.publisher.current().attempt
    }

    /// Receiver that always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<DownloadState> {
        self.publisher.watch()
    }

    /// Ordered stream of every update, starting with the current state.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<DownloadUpdate> {
        self.publisher.subscribe()
    }

    /// Wait until the attempt in flight has processed its last transport event.
    pub async fn join(&self) {
        let task = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
            .and_then(|active| active.task.take());

        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Download task ended abnormally: {e}");
            }
        }
    }

    fn start(&self, url: Url, identity: Option<IdentityTuple>) -> AttemptId {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            debug!(attempt = %previous.attempt, "Superseding download");
            previous.cancel.cancel();
        }

        let attempt = self.publisher.begin_attempt();
        debug!(attempt = %attempt, url = %url, "Start download");

        let Some(destination) = self.destination_for(&url) else {
            self.publisher.publish(
                attempt,
                DownloadState::failed(DownloadError::MissingDestination.user_message()),
            );
            return attempt;
        };

        let cancel = CancellationToken::new();
        let staging_dir = self.config.downloads_directory.clone();
        let request = TransportRequest::new(url, staging_dir.clone()).with_cookie(self.cookie());
        let driver = AttemptDriver::new(
            attempt,
            Arc::clone(&self.publisher),
            Arc::clone(&self.metadata),
            destination,
            identity,
        );
        let transport = Arc::clone(&self.transport);
        let fetch_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = tokio::fs::create_dir_all(&staging_dir).await {
                driver.fail(&DownloadError::file_system(
                    "Failed to create downloads directory",
                    &e,
                ));
                return;
            }

            let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
            tokio::join!(
                transport.fetch(request, events_tx, fetch_cancel),
                driver.run(events_rx)
            );
        });

        *active = Some(ActiveAttempt {
            attempt,
            cancel,
            task: Some(task),
        });
        attempt
    }
}

impl Drop for DownloadSession {
    fn drop(&mut self) {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = active.as_ref() {
            active.cancel.cancel();
        }
    }
}

/// `downloads_dir` joined with the last path segment of `url`.
fn destination_path(downloads_dir: &Path, url: &Url) -> Option<PathBuf> {
    let name = url_file_name(url);
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return None;
    }
    Some(downloads_dir.join(name))
}
