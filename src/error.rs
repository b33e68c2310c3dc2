//! Error types for gw-search operations.
//!
//! Every stage of the search pipeline has its own error enum built with
//! `thiserror`. All of them roll up into [`Error`], whose display form names
//! the failing stage followed by the underlying cause.

use thiserror::Error;

/// Result type alias for gw-search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type; every failure is fatal to the invoking tool.
#[derive(Error, Debug)]
pub enum Error {
    /// Duration parsing failed.
    #[error("duration: {0}")]
    Duration(#[from] DurationError),

    /// Renderer validation or result rendering failed.
    #[error("render: {0}")]
    Render(#[from] RenderError),

    /// Search orchestration failed.
    #[error("search: {0}")]
    Search(#[from] SearchError),

    /// The session service reported an error outside of a search.
    #[error("session: {0}")]
    Session(#[from] SessionError),

    /// Local I/O errors (output files, sinks).
    #[error("I/O: {0}")]
    Io(#[from] IoError),

    /// Configuration errors.
    #[error("configuration: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors produced while turning a relative duration into a time window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Empty, forward-looking or zero-length duration.
    #[error("invalid duration: {reason}")]
    InvalidDuration {
        /// Why the duration was rejected.
        reason: String,
    },

    /// The duration literal does not follow the duration grammar.
    #[error("malformed duration {input:?}: {reason}")]
    MalformedDuration {
        /// The literal that failed to parse.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Errors produced while validating renderers or materializing results.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The query's declared renderer is not usable by the current tool.
    #[error("renderer {declared:?} isn't supported; accepted renderers: {accepted}")]
    UnsupportedRenderer {
        /// Renderer declared by the server for the parsed query.
        declared: String,
        /// Comma separated list of renderers the tool accepts.
        accepted: String,
    },

    /// More than one series came back for a single-bucket chart request.
    #[error("got too many results: {count} series, expected 1")]
    TooManyBuckets {
        /// Number of series returned by the server.
        count: usize,
    },

    /// A chart request returned no series at all.
    #[error("got no series, expected 1")]
    MissingSeries,

    /// A series carries fewer values than there are category names.
    #[error("series has {values} values for {names} names")]
    SeriesMisaligned {
        /// Number of category names.
        names: usize,
        /// Number of values in the series.
        values: usize,
    },

    /// A table row does not have one field per column.
    #[error("table row {row} has {actual} fields, expected {expected}")]
    TableShape {
        /// Zero-based row index.
        row: usize,
        /// Number of columns.
        expected: usize,
        /// Number of fields in the row.
        actual: usize,
    },

    /// CSV encoding error.
    #[error("csv error: {0}")]
    Csv(String),

    /// Writing to the output sink failed.
    #[error("write failed: {0}")]
    Write(String),

    /// The reader of the output sink went away.
    #[error("output closed")]
    Closed,
}

/// Errors produced by the search orchestrator.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The server could not parse the query.
    #[error("parse request failed: {0}")]
    Parse(#[source] SessionError),

    /// The search could not be started.
    #[error("failed to start search: {0}")]
    Submission(#[source] SessionError),

    /// The remote search job ended in an error state.
    #[error("search {id} failed: {reason}")]
    SearchFailed {
        /// Search ID reported by the server.
        id: String,
        /// Failure reason reported by the server.
        reason: String,
    },

    /// The search did not reach a terminal state before the deadline.
    #[error("search {id} did not finish within {seconds}s")]
    WaitTimeout {
        /// Search ID reported by the server.
        id: String,
        /// Deadline in seconds.
        seconds: u64,
    },

    /// The wait was interrupted by the operator.
    #[error("search {id} wait cancelled")]
    Cancelled {
        /// Search ID reported by the server.
        id: String,
    },

    /// Fetching results failed.
    #[error("failed to get results: {0}")]
    Fetch(#[source] SessionError),
}

/// Errors raised by the session service (transport and server side).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Transport level failure (connect, TLS, timeout).
    #[error("http error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Login was refused.
    #[error("login failed: {reason}")]
    Login {
        /// Reason given by the server.
        reason: String,
    },

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The configured server address is not a valid URL.
    #[error("invalid server address {address:?}: {reason}")]
    InvalidUrl {
        /// The configured address.
        address: String,
        /// Parser complaint.
        reason: String,
    },

    /// An authenticated call was made before login.
    #[error("not logged in")]
    NotLoggedIn,

    /// The server reports the job in an error state.
    #[error("job {id} failed: {reason}")]
    JobFailed {
        /// Search ID.
        id: String,
        /// Failure reason reported by the server.
        reason: String,
    },
}

/// Local I/O errors.
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to create an output file.
    #[error("couldn't create output file: {path}: {reason}")]
    CreateFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            Self::Closed
        } else {
            Self::Write(err.to_string())
        }
    }
}

impl From<csv::Error> for RenderError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::BrokenPipe => Self::Closed,
            _ => Self::Csv(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for SessionError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}
