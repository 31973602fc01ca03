//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Download restore images and match local files against a software catalog.
#[derive(Parser)]
#[command(name = "restorekit")]
#[command(about = "Download restore images and match them against a software catalog")]
#[command(version)]
pub struct Cli {
    /// Override the downloads directory for this invocation
    #[arg(long = "downloads-dir", global = true)]
    pub downloads_dir: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Default `tracing` filter directive for this invocation.
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
