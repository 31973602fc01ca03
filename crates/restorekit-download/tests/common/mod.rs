//! Shared fixtures for download session tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use url::Url;

use restorekit_core::{
    DownloadConfig, DownloadError, DownloadState, DownloadUpdate, FileMetadataStore,
    HttpTransport, RedirectDecision, RedirectHop, TransportEvent, TransportRequest,
};
use restorekit_download::DownloadSession;

/// One scripted transport action.
#[derive(Debug, Clone)]
pub enum Step {
    Redirect(RedirectHop),
    Progress {
        written: u64,
        expected: Option<u64>,
    },
    Pause(Duration),
    Finish {
        status: u16,
        body: Vec<u8>,
    },
    Fail(DownloadError),
    AwaitCancel,
}

/// A fake transport that plays back scripts keyed by URL substring.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, Vec<Step>>>,
    decisions: Mutex<Vec<RedirectDecision>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play `steps` for the first request whose URL contains `url_contains`.
    pub fn with_script(self, url_contains: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url_contains.to_string(), steps);
        self
    }

    pub fn decisions(&self) -> Vec<RedirectDecision> {
        self.decisions.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn take_script(&self, url: &Url) -> Vec<Step> {
        let mut scripts = self.scripts.lock().unwrap();
        let key = scripts
            .keys()
            .find(|key| url.as_str().contains(key.as_str()))
            .cloned();
        key.and_then(|key| scripts.remove(&key)).unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn fetch(
        &self,
        request: TransportRequest,
        events: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) {
        self.requests.lock().unwrap().push(request.clone());
        let steps = self.take_script(&request.url);

        for step in steps {
            let event = match step {
                Step::Redirect(hop) => {
                    let (reply, decision) = oneshot::channel();
                    if events
                        .send(TransportEvent::Redirect { hop, reply })
                        .await
                        .is_err()
                    {
                        return;
                    }
                    let Ok(decision) = decision.await else {
                        return;
                    };
                    let abort = matches!(decision, RedirectDecision::Abort(_));
                    self.decisions.lock().unwrap().push(decision);
                    if abort {
                        return;
                    }
                    continue;
                }
                Step::Pause(duration) => {
                    tokio::time::sleep(duration).await;
                    continue;
                }
                Step::AwaitCancel => {
                    cancel.cancelled().await;
                    TransportEvent::Failed(DownloadError::Cancelled)
                }
                Step::Progress { written, expected } => TransportEvent::Progress {
                    bytes_written: written,
                    bytes_expected: expected,
                },
                Step::Finish { status, body } => {
                    let staged = tempfile::NamedTempFile::new_in(&request.staging_dir).unwrap();
                    std::fs::write(staged.path(), &body).unwrap();
                    TransportEvent::Finished {
                        status,
                        body: staged.into_temp_path(),
                    }
                }
                Step::Fail(error) => TransportEvent::Failed(error),
            };

            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}

pub fn finish(status: u16, body: &[u8]) -> Step {
    Step::Finish {
        status,
        body: body.to_vec(),
    }
}

pub fn progress(written: u64, expected: u64) -> Step {
    Step::Progress {
        written,
        expected: Some(expected),
    }
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn session(
    transport: &Arc<ScriptedTransport>,
    config: DownloadConfig,
    metadata: Arc<dyn FileMetadataStore>,
) -> DownloadSession {
    DownloadSession::new(config, Arc::clone(transport) as Arc<dyn HttpTransport>, metadata)
}

/// Everything currently buffered in a subscription.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<DownloadUpdate>) -> Vec<DownloadUpdate> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

pub fn states(updates: &[DownloadUpdate]) -> Vec<DownloadState> {
    updates.iter().map(|update| update.state.clone()).collect()
}

pub fn terminal_count(updates: &[DownloadUpdate]) -> usize {
    updates
        .iter()
        .filter(|update| update.state.is_terminal())
        .count()
}

/// File names in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
