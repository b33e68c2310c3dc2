//! Runtime configuration.
//!
//! Built once from command-line flags and passed by reference into the
//! session and the search pipeline; nothing below the CLI reads process
//! state directly.

use crate::error::{Error, Result, SessionError};
use crate::search::WaitOptions;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Default relative search window.
pub const DEFAULT_DURATION: &str = "-1h";

/// Default number of results fetched by the `search` tool.
pub const DEFAULT_COUNT: u64 = 10;

/// Default backup output path.
pub const DEFAULT_BACKUP_PATH: &str = "gravwell.bak";

/// Default interval between search status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection settings for the analytics server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (`host:port`, or a full URL).
    pub server: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Use https when `server` carries no scheme.
    pub use_https: bool,
    /// Accept invalid or self-signed TLS certificates.
    pub insecure: bool,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Per-read timeout in seconds; bounds stalled responses, not long ones.
    pub read_timeout_secs: u64,
    /// Interval between search status polls.
    pub poll_interval: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            username: "admin".to_string(),
            password: "changeme".to_string(),
            use_https: false,
            insecure: false,
            connect_timeout_secs: 10,
            read_timeout_secs: 300,
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent: format!("gw-search/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Resolves the server address into a base URL ending in `/`.
    ///
    /// An address without a scheme gets `http://` or `https://` depending
    /// on [`ClientConfig::use_https`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty address and
    /// [`SessionError::InvalidUrl`] if the address does not parse.
    pub fn base_url(&self) -> Result<Url> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(Error::Config {
                message: "server address is required (-s or GW_SERVER)".to_string(),
            });
        }

        let mut address = if server.contains("://") {
            server.to_string()
        } else {
            let scheme = if self.use_https { "https" } else { "http" };
            format!("{scheme}://{server}")
        };
        if !address.ends_with('/') {
            address.push('/');
        }

        Url::parse(&address).map_err(|e| {
            SessionError::InvalidUrl {
                address: self.server.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Options for the `search` tool.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Query string.
    pub query: String,
    /// Relative window, e.g. `-1h`.
    pub duration: String,
    /// Number of results to fetch.
    pub count: u64,
    /// Output file; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Completion wait settings.
    pub wait: WaitOptions,
}

/// Options for the `chart` tool.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Query string.
    pub query: String,
    /// Relative window, e.g. `-1h`.
    pub duration: String,
    /// Chart title.
    pub title: String,
    /// Output file; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Completion wait settings.
    pub wait: WaitOptions,
}

/// Options for the `backup` tool.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Output archive path.
    pub output: PathBuf,
    /// Skip cached data in the archive.
    pub omit_cache: bool,
}
