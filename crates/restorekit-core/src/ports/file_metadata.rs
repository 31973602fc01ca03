//! File metadata port.
//!
//! Abstracts per-file named attributes (extended attributes on most
//! platforms) and download provenance. Reads never fail: a missing
//! attribute, an unsupported filesystem and an unreadable value all read as
//! "no metadata".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Errors from writing or removing file metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The underlying attribute operation failed.
    #[error("Failed to update attribute {key} on {path}: {message}")]
    Io {
        path: PathBuf,
        key: String,
        message: String,
    },

    /// The value could not be encoded.
    #[error("Failed to encode attribute {key}: {message}")]
    Encode { key: String, message: String },

    /// The file does not exist.
    #[error("File {0} does not exist")]
    FileNotFound(PathBuf),
}

impl MetadataError {
    pub fn io(path: &Path, key: &str, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Port for reading and writing named attributes on files.
pub trait FileMetadataStore: Send + Sync {
    /// Raw value of the attribute, or `None` when absent or unreadable.
    fn read_attribute(&self, path: &Path, key: &str) -> Option<Vec<u8>>;

    /// Set the attribute, replacing any previous value.
    fn write_attribute(&self, path: &Path, key: &str, value: &[u8]) -> Result<(), MetadataError>;

    /// Remove the attribute. Removing an absent attribute succeeds.
    fn remove_attribute(&self, path: &Path, key: &str) -> Result<(), MetadataError>;

    /// URLs the file was downloaded from, most specific first.
    fn origin_urls(&self, path: &Path) -> Vec<Url>;
}

/// JSON-encoded attribute access on top of [`FileMetadataStore`].
pub trait StructuredAttributes: FileMetadataStore {
    /// Decode the attribute as JSON; undecodable values read as `None`.
    fn read_structured<T: DeserializeOwned>(&self, path: &Path, key: &str) -> Option<T> {
        let data = self.read_attribute(path, key)?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    key,
                    error = %e,
                    "Ignoring undecodable attribute"
                );
                None
            }
        }
    }

    fn write_structured<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        key: &str,
        value: &T,
    ) -> Result<(), MetadataError> {
        let data = serde_json::to_vec(value).map_err(|e| MetadataError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.write_attribute(path, key, &data)
    }
}

impl<S: FileMetadataStore + ?Sized> StructuredAttributes for S {}

/// A metadata store that remembers nothing.
///
/// Used on platforms without extended attributes: every read is empty and
/// every write succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetadataStore;

impl FileMetadataStore for NoopMetadataStore {
    fn read_attribute(&self, _path: &Path, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn write_attribute(
        &self,
        _path: &Path,
        _key: &str,
        _value: &[u8],
    ) -> Result<(), MetadataError> {
        Ok(())
    }

    fn remove_attribute(&self, _path: &Path, _key: &str) -> Result<(), MetadataError> {
        Ok(())
    }

    fn origin_urls(&self, _path: &Path) -> Vec<Url> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct FileEntry {
    attributes: HashMap<String, Vec<u8>>,
    origins: Vec<Url>,
}

/// Path-keyed metadata store held in memory.
///
/// Attributes follow the path, not the file: callers that move a file use
/// [`InMemoryMetadataStore::rename`] to carry its metadata along.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    files: Mutex<HashMap<PathBuf, FileEntry>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the download provenance of `path`.
    pub fn set_origin_urls(&self, path: impl Into<PathBuf>, urls: Vec<Url>) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.entry(path.into()).or_default().origins = urls;
    }

    /// Move all metadata recorded for `from` to `to`.
    pub fn rename(&self, from: &Path, to: impl Into<PathBuf>) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = files.remove(from) {
            files.insert(to.into(), entry);
        }
    }

    /// Names of the attributes currently set on `path`, sorted.
    #[cfg(test)]
    pub fn attribute_names(&self, path: &Path) -> Vec<String> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = files
            .get(path)
            .map(|entry| entry.attributes.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl FileMetadataStore for InMemoryMetadataStore {
    fn read_attribute(&self, path: &Path, key: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.get(path)?.attributes.get(key).cloned()
    }

    fn write_attribute(&self, path: &Path, key: &str, value: &[u8]) -> Result<(), MetadataError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .entry(path.to_path_buf())
            .or_default()
            .attributes
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove_attribute(&self, path: &Path, key: &str) -> Result<(), MetadataError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = files.get_mut(path) {
            entry.attributes.remove(key);
        }
        Ok(())
    }

    fn origin_urls(&self, path: &Path) -> Vec<Url> {
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .map(|entry| entry.origins.clone())
            .unwrap_or_default()
    }
}
