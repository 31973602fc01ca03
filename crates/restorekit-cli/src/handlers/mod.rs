//! Command handlers.
//!
//! Each handler is a thin wrapper: validate CLI input, call into the
//! session or the matcher held by [`CliContext`](crate::CliContext), and
//! format the result for the terminal.

pub mod download;
pub mod identify;
pub mod match_file;
pub mod paths;
pub mod tag;

use std::path::Path;

use restorekit_core::SoftwareCatalog;

use crate::error::CliError;

/// Read and parse a software catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<SoftwareCatalog, CliError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::Catalog(format!("Cannot read {}: {e}", path.display())))?;
    SoftwareCatalog::from_json(&json)
        .map_err(|e| CliError::Catalog(format!("Cannot parse {}: {e}", path.display())))
}

/// Fail with an IO error when `path` does not name an existing file.
pub fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::Io(format!("File not found: {}", path.display())))
    }
}
