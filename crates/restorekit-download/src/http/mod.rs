//! reqwest-backed [`HttpTransport`].
//!
//! Redirects are disabled in the client and followed here, one hop at a
//! time, so the session's redirect policy sees every hop and can rewrite the
//! cookie before the next request. The body is streamed into a temporary
//! file inside the staging directory.

mod error;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, LOCATION};
use reqwest::{Client, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use restorekit_core::download::default_user_agent;
use restorekit_core::{
    DEFAULT_MAX_CONNECTIONS_PER_HOST, DownloadConfig, HttpTransport, RedirectDecision,
    RedirectHop, TransportEvent, TransportRequest,
};

use crate::progress::ProgressThrottle;
use error::{HttpError, HttpResult};

/// Maximum redirect hops followed for one transfer.
pub const MAX_REDIRECTS: usize = 10;

/// Production transport using reqwest.
///
/// A fresh client is built for every transfer so no connection or cookie
/// state leaks between attempts.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
    max_connections_per_host: usize,
    max_redirects: usize,
}

impl ReqwestTransport {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_connections_per_host: config.max_connections_per_host,
            max_redirects: MAX_REDIRECTS,
        }
    }

    #[must_use]
    pub const fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    fn build_client(&self) -> HttpResult<Client> {
        Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(self.max_connections_per_host)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(HttpError::Client)
    }

    async fn transfer(
        &self,
        request: TransportRequest,
        events: &mpsc::Sender<TransportEvent>,
    ) -> HttpResult<()> {
        let client = self.build_client()?;
        let mut url = request.url;
        let mut cookie = request.cookie;
        let mut hops = 0;

        loop {
            let mut builder = client.get(url.clone());
            if let Some(value) = cookie.as_deref() {
                builder = builder.header(COOKIE, value);
            }
            let response = builder.send().await?;

            let Some(target) = redirect_target(&url, &response)? else {
                return stream_body(response, &request.staging_dir, events).await;
            };

            hops += 1;
            if hops > self.max_redirects {
                return Err(HttpError::TooManyRedirects {
                    limit: self.max_redirects,
                });
            }

            let hop = RedirectHop {
                status: response.status().as_u16(),
                target: target.clone(),
                headers: header_pairs(response.headers()),
                request_cookie: cookie.clone(),
            };
            let (reply, decision) = oneshot::channel();
            send(events, TransportEvent::Redirect { hop, reply }).await?;

            match decision.await {
                Ok(RedirectDecision::Continue { cookie: next }) => {
                    debug!(from = %url, to = %target, "Redirect accepted");
                    url = target;
                    cookie = next;
                }
                Ok(RedirectDecision::Abort(reason)) => {
                    debug!(to = %target, "Redirect aborted: {reason}");
                    return Ok(());
                }
                Err(_) => return Err(HttpError::ReceiverClosed),
            }
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            max_redirects: MAX_REDIRECTS,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(
        &self,
        request: TransportRequest,
        events: mpsc::Sender<TransportEvent>,
        cancel: CancellationToken,
    ) {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(HttpError::Cancelled),
            result = self.transfer(request, &events) => result,
        };

        if let Err(e) = result {
            debug!("Transfer ended: {e}");
            // A closed receiver has nobody left to tell.
            let _ = events.send(TransportEvent::Failed(e.into())).await;
        }
    }
}

/// Resolved `Location` of a redirect response, `None` for anything else.
fn redirect_target(current: &Url, response: &Response) -> HttpResult<Option<Url>> {
    let status = response.status();
    if !status.is_redirection() || status == StatusCode::NOT_MODIFIED {
        return Ok(None);
    }
    let Some(location) = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(None);
    };
    Ok(Some(current.join(location)?))
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

async fn send(events: &mpsc::Sender<TransportEvent>, event: TransportEvent) -> HttpResult<()> {
    events
        .send(event)
        .await
        .map_err(|_| HttpError::ReceiverClosed)
}

/// Write the response body into a staging file, reporting throttled progress.
async fn stream_body(
    mut response: Response,
    staging_dir: &std::path::Path,
    events: &mpsc::Sender<TransportEvent>,
) -> HttpResult<()> {
    let status = response.status().as_u16();
    let bytes_expected = response.content_length();

    let staged = tempfile::Builder::new()
        .prefix(".restorekit-")
        .suffix(".download")
        .tempfile_in(staging_dir)
        .map_err(HttpError::Staging)?;
    let (file, body) = staged.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut throttle = ProgressThrottle::default();
    let mut bytes_written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(HttpError::Staging)?;
        bytes_written += chunk.len() as u64;
        if throttle.should_emit(bytes_written, bytes_expected) {
            send(
                events,
                TransportEvent::Progress {
                    bytes_written,
                    bytes_expected,
                },
            )
            .await?;
        }
    }
    file.flush().await.map_err(HttpError::Staging)?;
    drop(file);

    debug!(status, bytes_written, "Response body received");
    send(events, TransportEvent::Finished { status, body }).await
}
