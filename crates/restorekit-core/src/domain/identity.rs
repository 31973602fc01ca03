//! Identity of downloaded restore images.
//!
//! An [`IdentityTuple`] records which catalog entry a file was downloaded
//! from. It is stored as JSON in an extended attribute so the file can be
//! re-identified after it has been renamed or moved.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::catalog::CatalogContent;
use crate::utils::path_file_name;

/// Extended attribute name holding the JSON-encoded [`IdentityTuple`].
pub const CATALOG_DATA_ATTRIBUTE: &str = "dev.restorekit.SoftwareCatalogData";

/// Build number and original file name of a catalog download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityTuple {
    /// OS build number; empty when unknown.
    pub build: String,
    /// File name the content had in the catalog.
    pub filename: String,
}

impl IdentityTuple {
    pub fn new(build: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            build: build.into(),
            filename: filename.into(),
        }
    }

    /// Build the tuple a download of `content` is tagged with.
    pub fn from_content<C: CatalogContent + ?Sized>(content: &C) -> Self {
        Self::new(content.build(), content.file_name())
    }

    /// Whether a build number is known.
    pub fn has_build(&self) -> bool {
        !self.build.is_empty()
    }
}

impl fmt::Display for IdentityTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_build() {
            write!(f, "{} (build {})", self.filename, self.build)
        } else {
            write!(f, "{} (build ?)", self.filename)
        }
    }
}

/// Matcher-facing view of a restore image that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Build number from identity metadata or the file name; empty when unknown.
    pub build: String,
    /// Location of the file.
    pub path: PathBuf,
}

impl LocalImage {
    pub fn new(build: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            build: build.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        path_file_name(&self.path)
    }

    pub fn has_build(&self) -> bool {
        !self.build.is_empty()
    }
}

impl fmt::Display for LocalImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let build = if self.has_build() { self.build.as_str() } else { "?" };
        write!(f, "{} (build {build})", self.file_name())
    }
}
