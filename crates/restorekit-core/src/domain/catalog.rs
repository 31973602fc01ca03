//! Software catalog domain types.
//!
//! A catalog is an ordered list of groups, each holding an ordered list of
//! restore images. Retrieval of the catalog is outside restorekit; callers
//! hand in an already-parsed value.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::url_file_name;

/// Anything in a catalog that can be downloaded and later re-identified.
pub trait CatalogContent {
    /// Build number of the content (e.g. `23A344`).
    fn build(&self) -> &str;

    /// Remote location of the content.
    fn url(&self) -> &Url;

    /// Stable identifier, the build number unless overridden.
    fn id(&self) -> &str {
        self.build()
    }

    /// Decoded last path segment of [`CatalogContent::url`].
    fn file_name(&self) -> String {
        url_file_name(self.url())
    }
}

impl<T: CatalogContent + ?Sized> CatalogContent for &T {
    fn build(&self) -> &str {
        (**self).build()
    }

    fn url(&self) -> &Url {
        (**self).url()
    }

    fn id(&self) -> &str {
        (**self).id()
    }

    fn file_name(&self) -> String {
        (**self).file_name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Model
// ─────────────────────────────────────────────────────────────────────────────

/// A downloadable OS restore image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreImage {
    /// OS build number (e.g. `21A5248p`).
    pub build: String,
    /// Download location of the image.
    pub url: Url,
    /// Human-readable name (e.g. "macOS 14.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Marketing version (e.g. "14.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RestoreImage {
    /// Create a restore image with only the identifying fields set.
    pub fn new(build: impl Into<String>, url: Url) -> Self {
        Self {
            build: build.into(),
            url,
            name: None,
            version: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl CatalogContent for RestoreImage {
    fn build(&self) -> &str {
        &self.build
    }

    fn url(&self) -> &Url {
        &self.url
    }
}

/// A named group of restore images, such as one OS major release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub restore_images: Vec<RestoreImage>,
}

/// An ordered collection of catalog groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareCatalog {
    #[serde(default)]
    pub groups: Vec<CatalogGroup>,
}

impl SoftwareCatalog {
    /// Parse a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All restore images of all groups, in group order then image order.
    pub fn restore_images(&self) -> impl Iterator<Item = &RestoreImage> {
        self.groups
            .iter()
            .flat_map(|group| group.restore_images.iter())
    }

    /// Find a restore image by its build number.
    pub fn restore_image(&self, build: &str) -> Option<&RestoreImage> {
        self.restore_images().find(|image| image.build == build)
    }

    pub fn is_empty(&self) -> bool {
        self.restore_images().next().is_none()
    }
}
