//! Download session configuration.

use std::path::PathBuf;

/// Default cap on concurrent connections to one host.
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 16;

/// User agent sent by the HTTP transport unless overridden.
pub fn default_user_agent() -> String {
    format!("restorekit/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration for a download session and its transport.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory artifacts are moved into on success.
    pub downloads_directory: PathBuf,
    /// Cookie header value attached to the initial request.
    pub cookie: Option<String>,
    /// Maximum connections kept per host.
    pub max_connections_per_host: usize,
    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl DownloadConfig {
    pub fn new(downloads_directory: impl Into<PathBuf>) -> Self {
        Self {
            downloads_directory: downloads_directory.into(),
            cookie: None,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
            user_agent: default_user_agent(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Set the cookie, ignoring `None` and blank values.
    #[must_use]
    pub fn with_optional_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie.filter(|value| !value.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_max_connections_per_host(mut self, max: usize) -> Self {
        self.max_connections_per_host = max;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
