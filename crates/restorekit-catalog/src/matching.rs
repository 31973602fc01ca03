//! Catalog matching.
//!
//! Resolves a local file to the catalog entry it was downloaded from. Rules
//! are tried in order over all candidates and the first hit wins:
//! 1. [`MatchRule::FileName`] - the entry's file name equals the file's name
//! 2. [`MatchRule::Metadata`] - the file's catalog data names the entry
//! 3. [`MatchRule::Build`] - the build in the file's name equals the entry's build

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use restorekit_core::utils::path_file_name;
use restorekit_core::{
    CatalogContent, FileMetadataStore, RestoreImage, SoftwareCatalog, match_os_build,
};

use crate::identity::IdentityExtractor;

/// The rule that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    FileName,
    Metadata,
    Build,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FileName => "file name",
            Self::Metadata => "metadata",
            Self::Build => "build",
        };
        f.write_str(label)
    }
}

/// A catalog entry matched to a local file.
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogMatch<'a, E> {
    pub entry: &'a E,
    pub rule: MatchRule,
}

impl<E> Clone for CatalogMatch<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for CatalogMatch<'_, E> {}

/// Matches local files against catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    identity: IdentityExtractor,
}

impl CatalogMatcher {
    pub fn new(store: Arc<dyn FileMetadataStore>) -> Self {
        Self::with_extractor(IdentityExtractor::new(store))
    }

    pub const fn with_extractor(identity: IdentityExtractor) -> Self {
        Self { identity }
    }

    pub const fn extractor(&self) -> &IdentityExtractor {
        &self.identity
    }

    /// Find the candidate `path` was downloaded from.
    ///
    /// The metadata rule reads the file's catalog data, which falls back to
    /// the provenance URL when no identity is attached.
    pub fn match_catalog_content<'a, E: CatalogContent>(
        &self,
        path: &Path,
        candidates: &'a [E],
    ) -> Option<CatalogMatch<'a, E>> {
        let filename = path_file_name(path);

        if let Some(entry) = candidates
            .iter()
            .find(|entry| entry.file_name().eq_ignore_ascii_case(&filename))
        {
            debug!(path = %path.display(), build = entry.build(), "Matched by file name");
            return Some(CatalogMatch {
                entry,
                rule: MatchRule::FileName,
            });
        }

        if let Some(data) = self.identity.catalog_data(path) {
            if let Some(entry) = candidates.iter().find(|entry| {
                entry.build() == data.build
                    || entry.file_name().eq_ignore_ascii_case(&data.filename)
            }) {
                debug!(path = %path.display(), build = entry.build(), "Matched by metadata");
                return Some(CatalogMatch {
                    entry,
                    rule: MatchRule::Metadata,
                });
            }
        }

        let build = match_os_build(&filename)?;
        let entry = candidates
            .iter()
            .find(|entry| entry.build().eq_ignore_ascii_case(&build))?;
        debug!(path = %path.display(), build = entry.build(), "Matched by build");
        Some(CatalogMatch {
            entry,
            rule: MatchRule::Build,
        })
    }

    /// Find the restore image of `catalog` that `path` was downloaded from.
    pub fn match_catalog<'a>(
        &self,
        path: &Path,
        catalog: &'a SoftwareCatalog,
    ) -> Option<CatalogMatch<'a, RestoreImage>> {
        let images: Vec<&'a RestoreImage> = catalog.restore_images().collect();
        let found = self.match_catalog_content(path, &images)?;
        Some(CatalogMatch {
            entry: *found.entry,
            rule: found.rule,
        })
    }
}

/// Catalog-side entry point for matching.
pub trait CatalogMatching {
    /// Restore image matching the file at `path`, flattened over all groups.
    fn restore_image_matching(
        &self,
        matcher: &CatalogMatcher,
        path: &Path,
    ) -> Option<CatalogMatch<'_, RestoreImage>>;
}

impl CatalogMatching for SoftwareCatalog {
    fn restore_image_matching(
        &self,
        matcher: &CatalogMatcher,
        path: &Path,
    ) -> Option<CatalogMatch<'_, RestoreImage>> {
        matcher.match_catalog(path, self)
    }
}
