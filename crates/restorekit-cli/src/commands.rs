//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;
use url::Url;

/// Environment variable supplying the session cookie for `download`.
pub const COOKIE_ENV: &str = "RESTOREKIT_COOKIE";

#[derive(Subcommand)]
pub enum Commands {
    /// Download a restore image into the downloads directory
    Download {
        /// URL of the restore image
        url: Url,
        /// Software catalog (JSON) to look the build up in
        #[arg(long, requires = "build")]
        catalog: Option<PathBuf>,
        /// Build of the catalog entry to download and tag
        #[arg(long, requires = "catalog")]
        build: Option<String>,
        /// Session cookie sent with the first request
        #[arg(long, env = COOKIE_ENV, hide_env_values = true)]
        cookie: Option<String>,
    },

    /// Show the identity of a local restore image and where it came from
    Identify {
        /// Path to the restore image
        file: PathBuf,
    },

    /// Find the catalog entry a local restore image was downloaded from
    Match {
        /// Path to the restore image
        file: PathBuf,
        /// Software catalog (JSON)
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Attach identity metadata to a local restore image
    Tag {
        /// Path to the restore image
        file: PathBuf,
        /// Build number to record (e.g., "22E261")
        #[arg(long)]
        build: String,
        /// Original file name to record (defaults to the file's current name)
        #[arg(long)]
        filename: Option<String>,
    },

    /// Remove identity metadata from a local restore image
    Untag {
        /// Path to the restore image
        file: PathBuf,
    },

    /// Show the resolved downloads directory
    Paths,
}
