//! Download engine for restorekit.
//!
//! A [`DownloadSession`] drives one HTTP transfer at a time through an
//! [`HttpTransport`](restorekit_core::HttpTransport), estimates throughput and
//! time remaining, applies the redirect/cookie policy on every hop and
//! publishes an ordered stream of [`DownloadState`](restorekit_core::DownloadState)
//! updates.
//!
//! # Architecture
//!
//! - `progress` - throughput/ETA estimation and progress throttling
//! - `redirect` - redirect and cookie policy
//! - `session` - attempt lifecycle, state publication and artifact handling
//! - `http` - reqwest-backed transport

mod http;
pub mod progress;
pub mod redirect;
mod session;

pub use http::ReqwestTransport;
pub use progress::{Estimate, ProgressEstimator, ProgressThrottle};
pub use redirect::{merge_cookie, on_redirect};
pub use session::DownloadSession;
