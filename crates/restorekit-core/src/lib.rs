//! Core domain types and port definitions for restorekit.
//!
//! This crate holds everything the download engine and the catalog matcher
//! share: the catalog model, identity tuples, download state and errors, the
//! transport and metadata ports, and path resolution. It has no dependency on
//! any HTTP client or filesystem-attribute backend.

pub mod domain;
pub mod download;
pub mod paths;
pub mod ports;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    CATALOG_DATA_ATTRIBUTE, CatalogContent, CatalogGroup, IdentityTuple, LocalImage,
    RestoreImage, SoftwareCatalog,
};
pub use download::{
    AttemptId, DEFAULT_MAX_CONNECTIONS_PER_HOST, DownloadConfig, DownloadError, DownloadState,
    DownloadUpdate,
};
pub use ports::{
    FileMetadataStore, HttpTransport, InMemoryMetadataStore, MetadataError, NoopMetadataStore,
    RedirectDecision, RedirectHop, StructuredAttributes, TransportEvent, TransportRequest,
};

// Re-export path utilities
pub use paths::{
    DOWNLOADS_DIR_ENV, DownloadsDirResolution, DownloadsDirSource, PathError,
    default_downloads_dir, ensure_directory, resolve_downloads_dir,
};

pub use utils::build_number::match_os_build;
