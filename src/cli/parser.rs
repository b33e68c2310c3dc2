//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{
    BackupOptions, ChartOptions, ClientConfig, DEFAULT_BACKUP_PATH, DEFAULT_COUNT,
    DEFAULT_DURATION, SearchOptions,
};
use crate::search::WaitOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// gw-search: search, chart and back up a remote analytics server.
///
/// Each subcommand logs in, does one job and exits; any failure ends the
/// process with a non-zero status.
#[derive(Parser, Debug)]
#[command(name = "gw-search")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Address and port of the webserver.
    #[arg(short, long, env = "GW_SERVER", default_value = "", global = true)]
    pub server: String,

    /// User name to log in with.
    #[arg(short, long, env = "GW_USERNAME", default_value = "admin", global = true)]
    pub username: String,

    /// Password to log in with.
    #[arg(
        short,
        long,
        env = "GW_PASSWORD",
        default_value = "changeme",
        hide_env_values = true,
        global = true
    )]
    pub password: String,

    /// Use https when the server address has no scheme.
    #[arg(long, global = true)]
    pub https: bool,

    /// Accept invalid or self-signed TLS certificates.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Interval between search status polls, in milliseconds.
    #[arg(long, default_value = "500", global = true)]
    pub poll_interval_ms: u64,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search and print its entries (text, raw, hex) or table (CSV).
    Search {
        /// Query string.
        #[arg(short, long)]
        query: String,

        /// Search duration, e.g. -1h or -15m.
        #[arg(short, long, default_value = DEFAULT_DURATION, allow_hyphen_values = true)]
        duration: String,

        /// Count of results to fetch.
        #[arg(short, long, default_value_t = DEFAULT_COUNT)]
        count: u64,

        /// Output file path (stdout if not specified).
        #[arg(short = 'f', long)]
        output: Option<PathBuf>,

        /// Give up waiting for the search after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Run a chart search and print a gnuplot bar chart script.
    Chart {
        /// Query string.
        #[arg(short, long)]
        query: String,

        /// Search duration, e.g. -1h or -15m.
        #[arg(short, long, default_value = DEFAULT_DURATION, allow_hyphen_values = true)]
        duration: String,

        /// Chart title.
        #[arg(long, default_value = "")]
        title: String,

        /// Output file path (stdout if not specified).
        #[arg(short = 'f', long)]
        output: Option<PathBuf>,

        /// Give up waiting for the search after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Download a full server backup.
    Backup {
        /// Output file path.
        #[arg(short = 'f', long, default_value = DEFAULT_BACKUP_PATH)]
        output: PathBuf,

        /// Include cached data in the backup.
        #[arg(long)]
        include_cache: bool,
    },
}

impl Cli {
    /// Builds the connection settings from the global flags.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            use_https: self.https,
            insecure: self.insecure,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            ..ClientConfig::default()
        }
    }
}

/// A subcommand resolved into its typed options.
#[derive(Debug, Clone)]
pub enum Job {
    /// Run a search and print entries or a table.
    Search(SearchOptions),
    /// Run a chart search and print a gnuplot script.
    Chart(ChartOptions),
    /// Download a backup archive.
    Backup(BackupOptions),
}

impl Commands {
    /// Resolves the subcommand into its options.
    #[must_use]
    pub fn job(&self) -> Job {
        match self {
            Self::Search {
                query,
                duration,
                count,
                output,
                timeout,
            } => Job::Search(SearchOptions {
                query: query.clone(),
                duration: duration.clone(),
                count: *count,
                output: output.clone(),
                wait: wait_options(*timeout),
            }),
            Self::Chart {
                query,
                duration,
                title,
                output,
                timeout,
            } => Job::Chart(ChartOptions {
                query: query.clone(),
                duration: duration.clone(),
                title: title.clone(),
                output: output.clone(),
                wait: wait_options(*timeout),
            }),
            Self::Backup {
                output,
                include_cache,
            } => Job::Backup(BackupOptions {
                output: output.clone(),
                omit_cache: !include_cache,
            }),
        }
    }
}

fn wait_options(timeout_secs: Option<u64>) -> WaitOptions {
    timeout_secs.map_or_else(WaitOptions::unbounded, |secs| {
        WaitOptions::with_deadline(Duration::from_secs(secs))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["gw-search", "-s", "10.0.0.1:80", "search", "-q", "tag=syslog"])
            .unwrap();
        let Job::Search(options) = cli.command.job() else {
            panic!("expected search job");
        };
        assert_eq!(options.query, "tag=syslog");
        assert_eq!(options.duration, "-1h");
        assert_eq!(options.count, 10);
        assert!(options.output.is_none());
        assert_eq!(options.wait, WaitOptions::unbounded());

        let config = cli.client_config();
        assert_eq!(config.server, "10.0.0.1:80");
        assert_eq!(config.username, "admin");
        assert!(!config.use_https);
    }

    #[test]
    fn test_negative_duration_value() {
        let cli = Cli::try_parse_from([
            "gw-search", "chart", "-q", "tag=web", "-d", "-15m", "--title", "Hits", "--timeout",
            "30",
        ])
        .unwrap();
        let Job::Chart(options) = cli.command.job() else {
            panic!("expected chart job");
        };
        assert_eq!(options.duration, "-15m");
        assert_eq!(options.title, "Hits");
        assert_eq!(options.wait.deadline, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_backup_defaults() {
        let cli = Cli::try_parse_from(["gw-search", "--https", "backup"]).unwrap();
        let Job::Backup(options) = cli.command.job() else {
            panic!("expected backup job");
        };
        assert_eq!(options.output, PathBuf::from("gravwell.bak"));
        assert!(options.omit_cache);
        assert!(cli.client_config().use_https);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gw-search", "search", "-q", "x", "-u", "bob", "--poll-interval-ms", "50",
        ])
        .unwrap();
        let config = cli.client_config();
        assert_eq!(config.username, "bob");
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_query_is_required() {
        assert!(Cli::try_parse_from(["gw-search", "search"]).is_err());
    }
}
