//! Terminal presentation helpers.

pub mod progress;

pub use progress::{DownloadProgress, format_eta};
