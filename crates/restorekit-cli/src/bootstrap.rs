//! CLI bootstrap - the composition root.
//!
//! The only place where infrastructure is wired together for the CLI: the
//! reqwest transport, the platform metadata store, the download session and
//! the catalog matcher. Handlers receive the composed [`CliContext`].

use std::sync::Arc;

use restorekit_catalog::{CatalogMatcher, IdentityExtractor, default_metadata_store};
use restorekit_core::{
    DownloadConfig, DownloadsDirResolution, ensure_directory, resolve_downloads_dir,
};
use restorekit_download::{DownloadSession, ReqwestTransport};
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Downloads directory passed on the command line, if any.
    pub downloads_dir: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn with_downloads_dir(mut self, downloads_dir: Option<String>) -> Self {
        self.downloads_dir = downloads_dir;
        self
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Where downloads land and how that was decided.
    pub downloads: DownloadsDirResolution,
    /// Single-transfer download session.
    pub session: DownloadSession,
    /// Catalog matcher over the platform metadata store.
    pub matcher: CatalogMatcher,
}

impl CliContext {
    /// Identity extractor shared with the matcher.
    pub const fn identity(&self) -> &IdentityExtractor {
        self.matcher.extractor()
    }
}

/// Compose the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let downloads = resolve_downloads_dir(config.downloads_dir.as_deref())?;
    debug!(
        path = %downloads.path.display(),
        source = %downloads.source,
        "Resolved downloads directory"
    );
    ensure_directory(&downloads.path)?;

    let download_config = DownloadConfig::new(&downloads.path);
    let transport = Arc::new(ReqwestTransport::new(&download_config));
    let metadata = default_metadata_store();

    let session = DownloadSession::new(download_config, transport, Arc::clone(&metadata));
    let matcher = CatalogMatcher::with_extractor(IdentityExtractor::new(metadata));

    Ok(CliContext {
        downloads,
        session,
        matcher,
    })
}

#[cfg(test)]
mod tests {
    use restorekit_core::{DownloadState, DownloadsDirSource};

    use super::*;

    #[test]
    fn test_bootstrap_with_explicit_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            CliConfig::default().with_downloads_dir(Some(dir.path().display().to_string()));

        let ctx = bootstrap(config).unwrap();

        assert_eq!(ctx.downloads.source, DownloadsDirSource::Explicit);
        assert_eq!(ctx.session.config().downloads_directory, ctx.downloads.path);
        assert_eq!(ctx.session.state(), DownloadState::Idle);
    }

    #[test]
    fn test_bootstrap_creates_missing_downloads_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("images");
        let config = CliConfig::default().with_downloads_dir(Some(target.display().to_string()));

        bootstrap(config).unwrap();

        assert!(target.is_dir());
    }

    #[test]
    fn test_bootstrap_rejects_file_as_downloads_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let config = CliConfig::default().with_downloads_dir(Some(file.display().to_string()));

        let err = bootstrap(config).err().unwrap();

        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
