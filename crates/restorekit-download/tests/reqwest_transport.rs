//! End-to-end tests of `ReqwestTransport` behind a `DownloadSession`.

use std::sync::Arc;
use std::time::Duration;

use restorekit_core::{DownloadConfig, DownloadState, HttpTransport, NoopMetadataStore};
use restorekit_download::{DownloadSession, ReqwestTransport};
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_with(config: DownloadConfig, transport: ReqwestTransport) -> DownloadSession {
    DownloadSession::new(
        config,
        Arc::new(transport) as Arc<dyn HttpTransport>,
        Arc::new(NoopMetadataStore),
    )
}

fn session(config: DownloadConfig) -> DownloadSession {
    let transport = ReqwestTransport::new(&config);
    session_with(config, transport)
}

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{path}", server.uri())).unwrap()
}

#[tokio::test]
async fn test_downloads_body_to_destination() {
    let server = MockServer::start().await;
    let body = vec![7u8; 256 * 1024];
    Mock::given(method("GET"))
        .and(path("/images/UniversalMac_23A344_Restore.ipsw"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()));
    let mut rx = session.subscribe();
    session.start_download(url(&server, "/images/UniversalMac_23A344_Restore.ipsw"));
    session.join().await;

    let destination = dir.path().join("UniversalMac_23A344_Restore.ipsw");
    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(std::fs::read(&destination).unwrap(), body);

    let updates: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(
        updates
            .iter()
            .any(|u| u.state.fraction_complete() == Some(1.0))
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_follows_redirect_with_merged_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/Restore.ipsw"))
        .and(header("cookie", "a=1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/cdn/Restore-signed.ipsw")
                .insert_header("Set-Cookie", "b=2; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdn/Restore-signed.ipsw"))
        .and(header("cookie", "a=1; b=2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"signed".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()).with_cookie("a=1"));
    session.start_download(url(&server, "/download/Restore.ipsw"));
    session.join().await;

    // Named after the requested URL, not the redirect target.
    let destination = dir.path().join("Restore.ipsw");
    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(std::fs::read(&destination).unwrap(), b"signed");
}

#[tokio::test]
async fn test_cookie_accumulates_across_redirect_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/R.ipsw"))
        .and(header("cookie", "a=1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/b/R.ipsw")
                .insert_header("Set-Cookie", "b=2; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/R.ipsw"))
        .and(header("cookie", "a=1; b=2"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("Location", "/c/R.ipsw")
                .insert_header("Set-Cookie", "c=3; Secure"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c/R.ipsw"))
        .and(header("cookie", "a=1; b=2; c=3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"chained".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()).with_cookie("a=1"));
    session.start_download(url(&server, "/a/R.ipsw"));
    session.join().await;

    let destination = dir.path().join("R.ipsw");
    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(std::fs::read(&destination).unwrap(), b"chained");
}

#[tokio::test]
async fn test_unauthorized_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/Restore.ipsw"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/account/Unauthorized"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/account/Unauthorized"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sign in"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()));
    session.start_download(url(&server, "/download/Restore.ipsw"));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("The download failed due to missing authentication credentials.")
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_http_error_status_fails() {
    let server = MockServer::start().await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()));
    session.start_download(url(&server, "/missing/Restore.ipsw"));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("HTTP error 404. Please check the download link.")
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop/Restore.ipsw"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop/Restore.ipsw"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = DownloadConfig::new(dir.path());
    let transport = ReqwestTransport::new(&config).with_max_redirects(3);
    let session = session_with(config, transport);
    session.start_download(url(&server, "/loop/Restore.ipsw"));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("Too many redirects (limit 3)")
    );
}

#[tokio::test]
async fn test_cancel_stops_slow_transfer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow/Restore.ipsw"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"slow".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session = session(DownloadConfig::new(dir.path()));
    session.start_download(url(&server, "/slow/Restore.ipsw"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.cancel_download();

    tokio::time::timeout(Duration::from_secs(5), session.join())
        .await
        .unwrap();
    assert_eq!(
        session.state(),
        DownloadState::failed("The download was cancelled.")
    );
}
