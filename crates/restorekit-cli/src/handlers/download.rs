//! Download command handler.
//!
//! Runs one session attempt to completion, rendering progress until the
//! attempt reaches a terminal state. Ctrl-C cancels the attempt.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};
use url::Url;

use restorekit_core::utils::url_file_name;
use restorekit_core::{AttemptId, DownloadState, RestoreImage};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::load_catalog;
use crate::presentation::DownloadProgress;

/// Arguments for the download command.
#[derive(Debug, Clone)]
pub struct DownloadArgs {
    pub url: Url,
    pub catalog: Option<PathBuf>,
    pub build: Option<String>,
    pub cookie: Option<String>,
}

/// Execute the download command.
pub async fn execute(ctx: &CliContext, args: DownloadArgs) -> Result<()> {
    let entry = catalog_entry(&args)?;

    if let Some(cookie) = args.cookie.filter(|c| !c.trim().is_empty()) {
        ctx.session.set_cookie(Some(cookie));
    }

    let mut updates = ctx.session.subscribe();
    let attempt = match &entry {
        Some(image) => ctx.session.start_catalog_download(image),
        None => ctx.session.start_download(args.url.clone()),
    };
    info!(%attempt, url = %args.url, "Download started");

    let mut progress = if io::stderr().is_terminal() {
        DownloadProgress::new(&url_file_name(&args.url))
    } else {
        DownloadProgress::hidden()
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    let outcome = loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else {
                    break ctx.session.state();
                };
                if update.attempt != attempt {
                    continue;
                }
                match update.state {
                    DownloadState::Downloading { fraction_complete, eta_seconds } => {
                        progress.update(fraction_complete, eta_seconds);
                    }
                    state if state.is_terminal() => break state,
                    _ => {}
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                warn!(%attempt, "Interrupted, cancelling download");
                ctx.session.cancel_download();
            }
        }
    };

    progress.finish();
    ctx.session.join().await;
    report(attempt, outcome)
}

/// Resolve `--catalog`/`--build` to the entry to download, keeping the URL
/// given on the command line.
fn catalog_entry(args: &DownloadArgs) -> Result<Option<RestoreImage>, CliError> {
    let (Some(path), Some(build)) = (&args.catalog, &args.build) else {
        return Ok(None);
    };

    let catalog = load_catalog(path)?;
    let Some(entry) = catalog.restore_image(build) else {
        return Err(CliError::Arguments(format!(
            "Build {build} not found in {}",
            path.display()
        )));
    };

    let mut entry = entry.clone();
    if entry.url != args.url {
        warn!(
            build = %entry.build,
            catalog_url = %entry.url,
            url = %args.url,
            "URL differs from the catalog entry, downloading the given URL"
        );
        entry.url = args.url.clone();
    }
    Ok(Some(entry))
}

fn report(attempt: AttemptId, state: DownloadState) -> Result<()> {
    match state {
        DownloadState::Done { artifact_path } => {
            println!("Downloaded {}", artifact_path.display());
            Ok(())
        }
        DownloadState::Failed { reason } => Err(CliError::Download(reason).into()),
        other => Err(CliError::Download(format!(
            "Download {attempt} ended without completing ({other:?})"
        ))
        .into()),
    }
}
