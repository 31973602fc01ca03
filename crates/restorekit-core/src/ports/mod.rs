//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` types in any signature
//! - Transports report progress as events; they never touch session state
//! - Metadata stores deal in raw bytes keyed by attribute name

pub mod file_metadata;
pub mod http_transport;

pub use file_metadata::{
    FileMetadataStore, InMemoryMetadataStore, MetadataError, NoopMetadataStore,
    StructuredAttributes,
};
pub use http_transport::{
    HttpTransport, RedirectDecision, RedirectHop, TransportEvent, TransportRequest,
};
