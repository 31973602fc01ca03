//! Downloads directory preparation.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// Test file written and removed by [`ensure_directory`].
const WRITE_TEST_FILE: &str = ".restorekit_write_test";

/// Create `path` if it is missing and check that downloads can be written into it.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    verify_writable(path)
}

fn verify_writable(path: &Path) -> Result<(), PathError> {
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let test_file = path.join(WRITE_TEST_FILE);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&test_file)
        .map_err(not_writable)?;
    file.write_all(b"restorekit").map_err(not_writable)?;
    drop(file);
    let _ = fs::remove_file(&test_file);
    Ok(())
}
