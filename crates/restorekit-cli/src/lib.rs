//! restorekit CLI library.
//!
//! The binary in `main.rs` is the composition root; this library holds the
//! argument parser, the bootstrap context and the command handlers so they
//! can be tested without spawning a process.

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
