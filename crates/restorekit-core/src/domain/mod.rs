//! Core domain types.
//!
//! These types represent the software catalog and the identity of local
//! restore images, independent of any infrastructure concerns (HTTP,
//! filesystem attributes, etc.).
//!
//! # Structure
//!
//! - `catalog` - Catalog model (`SoftwareCatalog`, `CatalogGroup`, `RestoreImage`)
//! - `identity` - Identity tuples and the matcher-facing `LocalImage`

mod catalog;
mod identity;

// Re-export catalog types at the domain level for convenience
pub use catalog::{CatalogContent, CatalogGroup, RestoreImage, SoftwareCatalog};

// Re-export identity types at the domain level for convenience
pub use identity::{CATALOG_DATA_ATTRIBUTE, IdentityTuple, LocalImage};
