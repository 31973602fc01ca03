//! Download domain types.
//!
//! This module contains the state machine values, error types and
//! configuration shared by the download session and its transports.
//! These types are pure data with no infrastructure dependencies.
//!
//! # Structure
//!
//! - `config` - Session configuration (`DownloadConfig`)
//! - `errors` - Error types (`DownloadError`)
//! - `state` - Observable state (`DownloadState`, `DownloadUpdate`, `AttemptId`)

mod config;
mod errors;
mod state;

pub use config::{DEFAULT_MAX_CONNECTIONS_PER_HOST, DownloadConfig, default_user_agent};
pub use errors::DownloadError;
pub use state::{AttemptId, DownloadState, DownloadUpdate};
