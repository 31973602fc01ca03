//! State machine tests for `DownloadSession` driven by a scripted transport.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use restorekit_core::{
    CATALOG_DATA_ATTRIBUTE, DownloadConfig, DownloadError, DownloadState, FileMetadataStore,
    IdentityTuple, InMemoryMetadataStore, MetadataError, NoopMetadataStore, RedirectDecision,
    RedirectHop, RestoreImage, StructuredAttributes,
};
use tempfile::tempdir;
use url::Url;

use common::{
    ScriptedTransport, Step, dir_entries, drain, finish, progress, session, states,
    terminal_count, url,
};

const IMAGE_URL: &str = "https://updates.cdn.example/2021/UniversalMac_21A5248p_Restore.ipsw";
const IMAGE_NAME: &str = "UniversalMac_21A5248p_Restore.ipsw";

fn noop_store() -> Arc<dyn FileMetadataStore> {
    Arc::new(NoopMetadataStore)
}

#[tokio::test]
async fn test_successful_download_moves_artifact() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![progress(0, 10), progress(5, 10), finish(200, b"0123456789")],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    let attempt = session.start_download(url(IMAGE_URL));
    session.join().await;

    let updates = drain(&mut rx);
    let destination = dir.path().join(IMAGE_NAME);
    let states = states(&updates);
    assert_eq!(states[0], DownloadState::Idle);
    assert_eq!(states[1], DownloadState::downloading(None, None));
    assert_eq!(states[2].fraction_complete(), Some(0.0));
    assert_eq!(states[3].fraction_complete(), Some(0.5));
    assert_eq!(states.last(), Some(&DownloadState::done(&destination)));
    assert!(updates[1..].iter().all(|u| u.attempt == attempt));

    assert_eq!(std::fs::read(&destination).unwrap(), b"0123456789");
    assert_eq!(dir_entries(dir.path()), vec![IMAGE_NAME.to_string()]);
    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(*session.watch().borrow(), DownloadState::done(&destination));
}

#[tokio::test]
async fn test_existing_file_is_replaced() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join(IMAGE_NAME);
    std::fs::write(&destination, b"stale").unwrap();

    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![finish(200, b"fresh")]),
    );
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());
    session.start_download(url(IMAGE_URL));
    session.join().await;

    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(std::fs::read(&destination).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_http_error_fails_without_artifact() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![finish(404, b"not found")]),
    );
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());
    session.start_download(url(IMAGE_URL));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("HTTP error 404. Please check the download link.")
    );
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_events_after_done_are_ignored() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![
            finish(200, b"first"),
            finish(200, b"second"),
            Step::Fail(DownloadError::transport("late failure")),
            progress(1, 2),
        ],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    session.start_download(url(IMAGE_URL));
    session.join().await;

    let updates = drain(&mut rx);
    let destination = dir.path().join(IMAGE_NAME);
    assert_eq!(terminal_count(&updates), 1);
    assert_eq!(updates.last().unwrap().state, DownloadState::done(&destination));
    assert_eq!(std::fs::read(&destination).unwrap(), b"first");
    assert_eq!(dir_entries(dir.path()), vec![IMAGE_NAME.to_string()]);
}

#[tokio::test]
async fn test_completion_after_failure_is_ignored() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![
            Step::Fail(DownloadError::transport("connection reset by peer")),
            finish(200, b"too late"),
        ],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    session.start_download(url(IMAGE_URL));
    session.join().await;

    let updates = drain(&mut rx);
    assert_eq!(terminal_count(&updates), 1);
    assert_eq!(
        session.state(),
        DownloadState::failed("connection reset by peer")
    );
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_unauthorized_redirect_fails_with_authentication_message() {
    let dir = tempdir().unwrap();
    let hop = RedirectHop::new(302, url("https://developer.example.com/Unauthorized?path=x"));
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![Step::Redirect(hop), finish(200, b"login page")],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());
    session.start_download(url(IMAGE_URL));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("The download failed due to missing authentication credentials.")
    );
    assert_eq!(
        transport.decisions(),
        vec![RedirectDecision::Abort(DownloadError::AuthenticationRequired)]
    );
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn test_redirect_cookie_is_merged() {
    let dir = tempdir().unwrap();
    let hop = RedirectHop::new(302, url("https://cdn.example/signed/UniversalMac.ipsw"))
        .with_header("Set-Cookie", "b=2; Path=/")
        .with_request_cookie(Some("a=1".to_string()));
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![Step::Redirect(hop), finish(200, b"ok")],
    ));
    let session = session(
        &transport,
        DownloadConfig::new(dir.path()).with_cookie("a=1"),
        noop_store(),
    );
    session.start_download(url(IMAGE_URL));
    session.join().await;

    assert_eq!(transport.requests()[0].cookie.as_deref(), Some("a=1"));
    assert_eq!(
        transport.decisions(),
        vec![RedirectDecision::Continue {
            cookie: Some("a=1; b=2".to_string())
        }]
    );
    assert!(session.state().is_terminal());
}

#[tokio::test]
async fn test_eta_appears_after_one_percent() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![
            progress(10, 1000),
            Step::Pause(Duration::from_millis(20)),
            progress(500, 1000),
            Step::Pause(Duration::from_millis(20)),
            progress(900, 1000),
            finish(200, b"done"),
        ],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    session.start_download(url(IMAGE_URL));
    session.join().await;

    let downloading: Vec<DownloadState> = states(&drain(&mut rx))
        .into_iter()
        .filter(|state| state.fraction_complete().is_some())
        .collect();
    assert_eq!(downloading.len(), 3);
    assert_eq!(downloading[0].fraction_complete(), Some(0.01));
    assert_eq!(downloading[0].eta_seconds(), None);
    assert!(downloading[1].eta_seconds().is_some());
    assert!(downloading[2].eta_seconds().is_some());
}

#[tokio::test]
async fn test_unknown_size_reports_no_fraction() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().with_script(
        IMAGE_NAME,
        vec![
            Step::Progress {
                written: 1024,
                expected: None,
            },
            finish(200, b"x"),
        ],
    ));
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    session.start_download(url(IMAGE_URL));
    session.join().await;

    let states = states(&drain(&mut rx));
    assert_eq!(states[2], DownloadState::downloading(None, None));
}

#[tokio::test]
async fn test_cancel_reports_failure() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![Step::AwaitCancel]),
    );
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    session.start_download(url(IMAGE_URL));
    session.cancel_download();
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::failed("The download was cancelled.")
    );
}

#[tokio::test]
async fn test_new_download_supersedes_previous_attempt() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_script("first.ipsw", vec![Step::AwaitCancel])
            .with_script("second.ipsw", vec![finish(200, b"second")]),
    );
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    let mut rx = session.subscribe();
    let first = session.start_download(url("https://cdn.example/first.ipsw"));
    let second = session.start_download(url("https://cdn.example/second.ipsw"));
    session.join().await;
    // Give the superseded transport time to report its cancellation.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(second > first);
    let updates = drain(&mut rx);
    assert!(
        updates
            .iter()
            .filter(|u| u.attempt == first)
            .all(|u| !u.state.is_terminal())
    );
    assert_eq!(
        updates.last().unwrap().state,
        DownloadState::done(dir.path().join("second.ipsw"))
    );
    assert_eq!(session.current_attempt(), second);
}

#[tokio::test]
async fn test_restart_after_failure() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_script("broken.ipsw", vec![finish(500, b"")])
            .with_script("good.ipsw", vec![finish(200, b"good")]),
    );
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    session.start_download(url("https://cdn.example/broken.ipsw"));
    session.join().await;
    assert!(matches!(session.state(), DownloadState::Failed { .. }));

    let mut rx = session.subscribe();
    session.start_download(url("https://cdn.example/good.ipsw"));
    session.join().await;

    let states = states(&drain(&mut rx));
    assert!(matches!(states[0], DownloadState::Failed { .. }));
    assert_eq!(states[1], DownloadState::downloading(None, None));
    assert_eq!(
        states.last(),
        Some(&DownloadState::done(dir.path().join("good.ipsw")))
    );
}

#[tokio::test]
async fn test_url_without_file_name_fails() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let session = session(&transport, DownloadConfig::new(dir.path()), noop_store());

    session.start_download(url("https://cdn.example/"));
    session.join().await;

    assert_eq!(session.state(), DownloadState::failed("Missing destination path."));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_downloads_directory_is_created() {
    let dir = tempdir().unwrap();
    let downloads = dir.path().join("nested").join("downloads");
    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![finish(200, b"x")]),
    );
    let session = session(&transport, DownloadConfig::new(&downloads), noop_store());

    session.start_download(url(IMAGE_URL));
    session.join().await;

    assert_eq!(session.state(), DownloadState::done(downloads.join(IMAGE_NAME)));
}

#[tokio::test]
async fn test_catalog_download_tags_artifact() {
    let dir = tempdir().unwrap();
    let store = Arc::new(InMemoryMetadataStore::new());
    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![finish(200, b"image")]),
    );
    let session = session(
        &transport,
        DownloadConfig::new(dir.path()),
        Arc::clone(&store) as Arc<dyn FileMetadataStore>,
    );
    let image = RestoreImage::new("21A5248p", url(IMAGE_URL));

    session.start_catalog_download(&image);
    session.join().await;

    let destination = dir.path().join(IMAGE_NAME);
    assert_eq!(session.state(), DownloadState::done(&destination));
    assert_eq!(
        store.read_structured::<IdentityTuple>(&destination, CATALOG_DATA_ATTRIBUTE),
        Some(IdentityTuple::new("21A5248p", IMAGE_NAME))
    );
}

struct ReadOnlyStore;

impl FileMetadataStore for ReadOnlyStore {
    fn read_attribute(&self, _path: &Path, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn write_attribute(&self, path: &Path, key: &str, _value: &[u8]) -> Result<(), MetadataError> {
        Err(MetadataError::Io {
            path: path.to_path_buf(),
            key: key.to_string(),
            message: "Operation not supported".to_string(),
        })
    }

    fn remove_attribute(&self, _path: &Path, _key: &str) -> Result<(), MetadataError> {
        Ok(())
    }

    fn origin_urls(&self, _path: &Path) -> Vec<Url> {
        Vec::new()
    }
}

#[tokio::test]
async fn test_tagging_failure_does_not_fail_download() {
    let dir = tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new().with_script(IMAGE_NAME, vec![finish(200, b"image")]),
    );
    let session = session(
        &transport,
        DownloadConfig::new(dir.path()),
        Arc::new(ReadOnlyStore),
    );

    session.start_catalog_download(&RestoreImage::new("21A5248p", url(IMAGE_URL)));
    session.join().await;

    assert_eq!(
        session.state(),
        DownloadState::done(dir.path().join(IMAGE_NAME))
    );
}
