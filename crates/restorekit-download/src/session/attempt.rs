//! Consumer side of one transfer.
//!
//! An [`AttemptDriver`] receives the transport's events for a single attempt,
//! turns them into state publications and, on success, moves the staged body
//! to its destination and tags it with its catalog identity.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::TempPath;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use restorekit_core::{
    AttemptId, CATALOG_DATA_ATTRIBUTE, DownloadError, DownloadState, FileMetadataStore,
    IdentityTuple, RedirectDecision, RedirectHop, StructuredAttributes, TransportEvent,
};

use super::publisher::StatePublisher;
use crate::progress::ProgressEstimator;
use crate::redirect;

pub(crate) struct AttemptDriver {
    attempt: AttemptId,
    publisher: Arc<StatePublisher>,
    metadata: Arc<dyn FileMetadataStore>,
    destination: PathBuf,
    identity: Option<IdentityTuple>,
    estimator: ProgressEstimator,
    last_progress: Instant,
}

impl AttemptDriver {
    pub(crate) fn new(
        attempt: AttemptId,
        publisher: Arc<StatePublisher>,
        metadata: Arc<dyn FileMetadataStore>,
        destination: PathBuf,
        identity: Option<IdentityTuple>,
    ) -> Self {
        Self {
            attempt,
            publisher,
            metadata,
            destination,
            identity,
            estimator: ProgressEstimator::new(),
            last_progress: Instant::now(),
        }
    }

    /// Consume events until the transport closes its side of the channel.
    pub(crate) async fn run(mut self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Redirect { hop, reply } => self.on_redirect(&hop, reply),
                TransportEvent::Progress {
                    bytes_written,
                    bytes_expected,
                } => self.on_progress(bytes_written, bytes_expected),
                TransportEvent::Finished { status, body } => self.on_finished(status, body).await,
                TransportEvent::Failed(error) => self.on_transport_error(&error),
            }
        }
        debug!(attempt = %self.attempt, "Transport closed");
    }

    pub(crate) fn fail(&self, error: &DownloadError) {
        self.publisher
            .publish(self.attempt, DownloadState::failed(error.user_message()));
    }

    fn on_redirect(&self, hop: &RedirectHop, reply: oneshot::Sender<RedirectDecision>) {
        if self.publisher.is_settled(self.attempt) {
            let _ = reply.send(RedirectDecision::Abort(DownloadError::Cancelled));
            return;
        }

        let decision = redirect::on_redirect(hop.request_cookie.as_deref(), hop);
        match &decision {
            RedirectDecision::Continue { .. } => {
                debug!(
                    attempt = %self.attempt,
                    status = hop.status,
                    target = %hop.target,
                    "Following redirect"
                );
            }
            RedirectDecision::Abort(error) => {
                if error.is_authentication_failure() {
                    warn!(
                        attempt = %self.attempt,
                        target = %hop.target,
                        "Redirected to sign-in, a session cookie is required"
                    );
                } else {
                    warn!(
                        attempt = %self.attempt,
                        target = %hop.target,
                        "Redirect rejected: {error}"
                    );
                }
                self.fail(error);
            }
        }

        // The transport may already be gone after a cancellation.
        let _ = reply.send(decision);
    }

    fn on_progress(&mut self, bytes_written: u64, bytes_expected: Option<u64>) {
        let now = Instant::now();
        let interval = now.duration_since(self.last_progress).as_secs_f64();
        self.last_progress = now;

        let state = match fraction_complete(bytes_written, bytes_expected) {
            Some(fraction) => {
                let estimate = self.estimator.observe(fraction, interval);
                DownloadState::downloading(Some(fraction), estimate.eta_seconds)
            }
            None => DownloadState::downloading(None, None),
        };
        self.publisher.publish(self.attempt, state);
    }

    async fn on_finished(&self, status: u16, body: TempPath) {
        if self.publisher.is_settled(self.attempt) {
            debug!(attempt = %self.attempt, "Ignoring completion of settled attempt");
            return;
        }

        if !(200..300).contains(&status) {
            error!(attempt = %self.attempt, status, "Download failed with HTTP status");
            self.fail(&DownloadError::http_status(status));
            return;
        }

        if let Err(e) = move_artifact(body, &self.destination).await {
            error!(attempt = %self.attempt, path = %self.destination.display(), "{e}");
            self.fail(&e);
            return;
        }

        info!(attempt = %self.attempt, path = %self.destination.display(), "Download finished");
        self.tag_artifact();
        self.publisher
            .publish(self.attempt, DownloadState::done(&self.destination));
    }

    fn on_transport_error(&self, error: &DownloadError) {
        if error.is_cancelled() {
            info!(attempt = %self.attempt, "Download cancelled");
        } else {
            error!(attempt = %self.attempt, "Download failed: {error}");
        }
        self.fail(error);
    }

    fn tag_artifact(&self) {
        let Some(identity) = &self.identity else {
            return;
        };
        match self
            .metadata
            .write_structured(&self.destination, CATALOG_DATA_ATTRIBUTE, identity)
        {
            Ok(()) => debug!(path = %self.destination.display(), %identity, "Tagged artifact"),
            Err(e) => warn!(
                path = %self.destination.display(),
                error = %e,
                "Failed to tag artifact"
            ),
        }
    }
}

/// Fraction of the body received, unknown without a positive expected size.
pub(crate) fn fraction_complete(bytes_written: u64, bytes_expected: Option<u64>) -> Option<f64> {
    bytes_expected
        .filter(|&expected| expected > 0)
        .map(|expected| (bytes_written as f64 / expected as f64).clamp(0.0, 1.0))
}

/// Replace whatever is at `destination` with the staged body.
async fn move_artifact(body: TempPath, destination: &Path) -> Result<(), DownloadError> {
    const CONTEXT: &str = "Failed to move downloaded file";

    match tokio::fs::remove_file(destination).await {
        Ok(()) => debug!(path = %destination.display(), "Replaced existing file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(DownloadError::file_system(CONTEXT, &e)),
    }

    body.persist(destination)
        .map_err(|e| DownloadError::file_system(CONTEXT, &e.error))
}
