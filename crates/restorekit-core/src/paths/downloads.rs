//! Downloads directory resolution.
//!
//! Provides utilities for resolving the downloads directory from explicit
//! paths, environment variables, or platform defaults.

use std::env;
use std::fmt;
use std::path::PathBuf;

use super::error::PathError;
use super::platform::normalize_user_path;

/// Environment variable overriding the downloads directory.
pub const DOWNLOADS_DIR_ENV: &str = "RESTOREKIT_DOWNLOADS_DIR";

/// How the downloads directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadsDirSource {
    /// The user passed an explicit path (e.g., CLI flag).
    Explicit,
    /// The path came from environment variables / `.env`.
    EnvVar,
    /// Platform downloads directory, or `~/Downloads`.
    Default,
}

impl fmt::Display for DownloadsDirSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::EnvVar => write!(f, "{DOWNLOADS_DIR_ENV}"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Resolution result for the downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadsDirResolution {
    /// The resolved path to the downloads directory.
    pub path: PathBuf,
    /// How the path was determined.
    pub source: DownloadsDirSource,
}

/// Return the platform downloads directory, falling back to `~/Downloads`.
pub fn default_downloads_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = dirs::download_dir() {
        return Ok(dir);
    }
    let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
    Ok(home.join("Downloads"))
}

/// Resolve the downloads directory from an explicit override, env var, or default.
///
/// Resolution order:
/// 1. Explicit path provided by caller (highest priority)
/// 2. `RESTOREKIT_DOWNLOADS_DIR` environment variable
/// 3. Platform downloads directory
pub fn resolve_downloads_dir(explicit: Option<&str>) -> Result<DownloadsDirResolution, PathError> {
    if let Some(path_str) = explicit {
        return Ok(DownloadsDirResolution {
            path: normalize_user_path(path_str)?,
            source: DownloadsDirSource::Explicit,
        });
    }

    if let Ok(env_path) = env::var(DOWNLOADS_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return Ok(DownloadsDirResolution {
                path: normalize_user_path(&env_path)?,
                source: DownloadsDirSource::EnvVar,
            });
        }
    }

    Ok(DownloadsDirResolution {
        path: default_downloads_dir()?,
        source: DownloadsDirSource::Default,
    })
}
