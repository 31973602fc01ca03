//! Serialized state publication.
//!
//! Every state change of a session goes through one [`StatePublisher`]. It
//! owns the current attempt and state under a single lock, so observers see
//! transitions in the order they were produced and late events of an
//! attempt can never overwrite a terminal state.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{mpsc, watch};

use restorekit_core::{AttemptId, DownloadState, DownloadUpdate};

struct Published {
    attempt: AttemptId,
    state: DownloadState,
    subscribers: Vec<mpsc::UnboundedSender<DownloadUpdate>>,
}

impl Published {
    fn broadcast(&mut self, watch_tx: &watch::Sender<DownloadState>) {
        let update = DownloadUpdate::new(self.attempt, self.state.clone());
        self.subscribers
            .retain(|tx| tx.send(update.clone()).is_ok());
        watch_tx.send_replace(self.state.clone());
    }
}

pub(crate) struct StatePublisher {
    inner: Mutex<Published>,
    watch_tx: watch::Sender<DownloadState>,
}

impl StatePublisher {
    pub(crate) fn new() -> Self {
        let (watch_tx, _) = watch::channel(DownloadState::Idle);
        Self {
            inner: Mutex::new(Published {
                attempt: AttemptId::NONE,
                state: DownloadState::Idle,
                subscribers: Vec::new(),
            }),
            watch_tx,
        }
    }

    /// Supersede the current attempt and publish `Downloading(None, None)`.
    pub(crate) fn begin_attempt(&self) -> AttemptId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.attempt = inner.attempt.next();
        inner.state = DownloadState::downloading(None, None);
        inner.broadcast(&self.watch_tx);
        inner.attempt
    }

    /// Publish `state` for `attempt`.
    ///
    /// Returns `false` and drops the state when `attempt` was superseded or
    /// has already reached a terminal state.
    pub(crate) fn publish(&self, attempt: AttemptId, state: DownloadState) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.attempt != attempt || inner.state.is_terminal() {
            tracing::trace!(attempt = %attempt, current = %inner.attempt, "Dropping stale state");
            return false;
        }
        inner.state = state;
        inner.broadcast(&self.watch_tx);
        true
    }

    /// Whether publications for `attempt` would be dropped.
    pub(crate) fn is_settled(&self, attempt: AttemptId) -> bool {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.attempt != attempt || inner.state.is_terminal()
    }

    pub(crate) fn current(&self) -> DownloadUpdate {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        DownloadUpdate::new(inner.attempt, inner.state.clone())
    }

    pub(crate) fn watch(&self) -> watch::Receiver<DownloadState> {
        self.watch_tx.subscribe()
    }

    /// Open a lossless stream starting with the current state.
    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<DownloadUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if tx
            .send(DownloadUpdate::new(inner.attempt, inner.state.clone()))
            .is_ok()
        {
            inner.subscribers.push(tx);
        }
        rx
    }
}
