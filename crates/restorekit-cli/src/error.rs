//! CLI-specific error types and mappings.
//!
//! Maps library errors to exit codes and user-facing messages.

use restorekit_core::{DownloadError, MetadataError, PathError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Download failed or was cancelled.
    #[error("{0}")]
    Download(String),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog could not be read or parsed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Extended-attribute metadata error.
    #[error("Metadata error: {0}")]
    Metadata(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Download(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Catalog(_) => 65,  // EX_DATAERR
            Self::Io(_) | Self::Metadata(_) => 74, // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        Self::Download(err.user_message())
    }
}

impl From<MetadataError> for CliError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::FileNotFound(path) => {
                Self::Io(format!("File not found: {}", path.display()))
            }
            other => Self::Metadata(other.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
