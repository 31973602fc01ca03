//! Identification of local restore images against a software catalog.
//!
//! - `identity` - recovers the identity tuple of a file from attached
//!   metadata, download provenance or its name
//! - `matching` - resolves a file to a catalog entry with ordered rules
//! - `xattr_store` - extended-attribute backed metadata store (unix)

pub mod identity;
pub mod matching;
#[cfg(unix)]
pub mod xattr_store;

use std::sync::Arc;

use restorekit_core::FileMetadataStore;

pub use identity::{Identification, IdentitySource, IdentityExtractor};
pub use matching::{CatalogMatch, CatalogMatcher, MatchRule};
#[cfg(unix)]
pub use xattr_store::XattrMetadataStore;

/// The metadata store for the current platform.
///
/// Extended attributes where the platform supports them, a no-op store
/// elsewhere.
pub fn default_metadata_store() -> Arc<dyn FileMetadataStore> {
    #[cfg(unix)]
    {
        if XattrMetadataStore::is_supported() {
            return Arc::new(XattrMetadataStore::new());
        }
        tracing::debug!("Extended attributes unsupported, identity metadata is disabled");
        Arc::new(restorekit_core::NoopMetadataStore)
    }

    #[cfg(not(unix))]
    {
        Arc::new(restorekit_core::NoopMetadataStore)
    }
}
