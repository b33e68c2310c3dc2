//! Session service trait definition.
//!
//! Defines the boundary between the search pipeline and the remote
//! analytics server, enabling pluggable transports (and in-memory fakes in
//! tests).

use crate::core::{ChartResults, SearchEntry, TableResults};
use crate::error::SessionError;
use crate::session::types::{ParsedQuery, SearchHandle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWrite;

/// Result type for session calls.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Trait for a logged-in connection to the analytics server.
///
/// Implementations own authentication and transport. The search pipeline
/// only relies on the calls below and never retries them.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Authenticates and keeps the session token for later calls.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Login`] if the server refuses the credentials.
    async fn login(&mut self, username: &str, password: &str) -> SessionResult<()>;

    /// Refreshes client-side session state after login.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached or the token is stale.
    async fn sync(&mut self) -> SessionResult<()>;

    /// Ends the session. Safe to call when not logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the logout.
    async fn logout(&mut self) -> SessionResult<()>;

    // ==================== Search Operations ====================

    /// Parses a query without running it and reports its renderer.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed or the call fails.
    async fn parse_query(&self, query: &str) -> SessionResult<ParsedQuery>;

    /// Starts a search over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the search.
    async fn start_search(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        background: bool,
    ) -> SessionResult<SearchHandle>;

    /// Blocks until the search reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::JobFailed`] if the search ends in error.
    async fn wait_for_search(&self, handle: &SearchHandle) -> SessionResult<()>;

    // ==================== Result Operations ====================

    /// Fetches entry records in `[first, last)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the payload cannot be decoded.
    async fn get_text_results(
        &self,
        handle: &SearchHandle,
        first: u64,
        last: u64,
    ) -> SessionResult<Vec<SearchEntry>>;

    /// Fetches table rows in `[first, last)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the payload cannot be decoded.
    async fn get_table_results(
        &self,
        handle: &SearchHandle,
        first: u64,
        last: u64,
    ) -> SessionResult<TableResults>;

    /// Fetches time-series data over `[start, end]`, condensed into the
    /// buckets `[first, last)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the payload cannot be decoded.
    async fn get_chart_series(
        &self,
        handle: &SearchHandle,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        first: u64,
        last: u64,
    ) -> SessionResult<ChartResults>;

    // ==================== Utility Operations ====================

    /// Streams a full server backup into `sink`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or a write fails.
    async fn backup(
        &self,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        omit_cache: bool,
    ) -> SessionResult<u64>;
}
