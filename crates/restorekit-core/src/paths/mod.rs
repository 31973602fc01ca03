//! Path utilities for the downloads directory.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - User-supplied paths are normalized in `platform`

mod downloads;
mod ensure;
mod error;
mod platform;

// Error type
pub use error::PathError;

// Downloads directory
pub use downloads::{
    DOWNLOADS_DIR_ENV, DownloadsDirResolution, DownloadsDirSource, default_downloads_dir,
    resolve_downloads_dir,
};

// Directory operations
pub use ensure::ensure_directory;
