//! Identity extraction for local files.
//!
//! Resolution order for a file's identity tuple:
//! 1. JSON identity metadata attached to the file
//! 2. Download provenance: the first origin URL's last path segment
//! 3. The file's own name
//!
//! Extraction never fails; an unknown build is an empty string.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use restorekit_core::utils::{path_file_name, url_file_name};
use restorekit_core::{
    CATALOG_DATA_ATTRIBUTE, FileMetadataStore, IdentityTuple, LocalImage, MetadataError,
    StructuredAttributes, match_os_build,
};

/// Where an identity tuple came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Identity metadata written when the file was downloaded or tagged.
    Metadata,
    /// The URL the file was downloaded from.
    Provenance,
    /// A build number found in the file name.
    FileName,
    /// Nothing identifying was found.
    Unknown,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Metadata => "metadata",
            Self::Provenance => "provenance",
            Self::FileName => "file name",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// An identity tuple together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub tuple: IdentityTuple,
    pub source: IdentitySource,
}

/// Reads and writes the identity of local files through a metadata store.
#[derive(Clone)]
pub struct IdentityExtractor {
    store: Arc<dyn FileMetadataStore>,
}

impl IdentityExtractor {
    pub fn new(store: Arc<dyn FileMetadataStore>) -> Self {
        Self { store }
    }

    /// Identity metadata attached to the file, if any.
    pub fn attached(&self, path: &Path) -> Option<IdentityTuple> {
        self.store
            .read_structured::<IdentityTuple>(path, CATALOG_DATA_ATTRIBUTE)
    }

    /// Identity inferred from the first URL the file was downloaded from.
    pub fn provenance(&self, path: &Path) -> Option<IdentityTuple> {
        let origin = self.store.origin_urls(path).into_iter().next()?;
        let filename = url_file_name(&origin);
        let build = match_os_build(&filename)?;
        debug!(path = %path.display(), origin = %origin, "Identity from provenance");
        Some(IdentityTuple::new(build, filename))
    }

    /// Catalog data of the file: attached metadata, else provenance.
    pub fn catalog_data(&self, path: &Path) -> Option<IdentityTuple> {
        self.attached(path).or_else(|| self.provenance(path))
    }

    /// Attach `identity` to the file, or remove the attached identity for `None`.
    pub fn set_catalog_data(
        &self,
        path: &Path,
        identity: Option<&IdentityTuple>,
    ) -> Result<(), MetadataError> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.to_path_buf()));
        }
        match identity {
            Some(identity) => {
                self.store
                    .write_structured(path, CATALOG_DATA_ATTRIBUTE, identity)
            }
            None => self.store.remove_attribute(path, CATALOG_DATA_ATTRIBUTE),
        }
    }

    /// Best available identity of the file.
    pub fn identify(&self, path: &Path) -> Identification {
        if let Some(tuple) = self.attached(path) {
            return Identification {
                tuple,
                source: IdentitySource::Metadata,
            };
        }

        if let Some(tuple) = self.provenance(path) {
            return Identification {
                tuple,
                source: IdentitySource::Provenance,
            };
        }

        let filename = path_file_name(path);
        match match_os_build(&filename) {
            Some(build) => Identification {
                tuple: IdentityTuple::new(build, filename),
                source: IdentitySource::FileName,
            },
            None => Identification {
                tuple: IdentityTuple::new("", filename),
                source: IdentitySource::Unknown,
            },
        }
    }

    /// Matcher-facing view of the file.
    pub fn local_image(&self, path: &Path) -> LocalImage {
        LocalImage::new(self.identify(path).tuple.build, path)
    }
}

impl fmt::Debug for IdentityExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityExtractor").finish_non_exhaustive()
    }
}
