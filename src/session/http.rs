//! HTTP/JSON session implementation.
//!
//! Talks to the analytics server's REST API with `reqwest`. The bearer token
//! obtained at login is attached to every later call.

use crate::config::ClientConfig;
use crate::core::{ChartResults, SearchEntry, TableResults};
use crate::error::{Result, SessionError};
use crate::session::traits::{SessionResult, SessionService};
use crate::session::types::{
    ChartResponse, LaunchRequest, LaunchResponse, LoginRequest, LoginResponse, ParseRequest,
    ParsedQuery, SearchHandle, SearchState, StatusResponse, TableResponse, TextResponse,
    WhoAmIResponse,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Longest server error body echoed into a diagnostic.
const MAX_ERROR_BODY: usize = 512;

/// Session backed by the server's HTTP API.
///
/// # Examples
///
/// ```no_run
/// use gw_search::config::ClientConfig;
/// use gw_search::session::{HttpSession, SessionService};
///
/// # async fn demo() -> gw_search::Result<()> {
/// let config = ClientConfig {
///     server: "10.0.0.1:8080".to_string(),
///     ..ClientConfig::default()
/// };
/// let mut session = HttpSession::new(&config)?;
/// session.login("admin", "changeme").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpSession {
    /// Shared HTTP client.
    client: Client,
    /// Base URL, always ending in `/`.
    base: Url,
    /// Bearer token from the last successful login.
    token: Option<String>,
    /// Interval between status polls while waiting on a search.
    poll_interval: Duration,
}

impl HttpSession {
    /// Creates an unauthenticated session for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = config.base_url()?;
        if config.insecure {
            warn!("TLS certificate verification is disabled");
        }

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| SessionError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            token: None,
            poll_interval: config.poll_interval,
        })
    }

    /// Returns whether a login token is held.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches the current state of a search.
    ///
    /// # Errors
    ///
    /// Returns an error if the status call fails.
    pub async fn search_status(&self, handle: &SearchHandle) -> SessionResult<StatusResponse> {
        let path = format!("api/searchctrl/{}/status", handle.id());
        self.get_json(&path, &[]).await
    }

    fn url(&self, path: &str) -> SessionResult<Url> {
        self.base.join(path).map_err(|e| SessionError::InvalidUrl {
            address: format!("{}{path}", self.base),
            reason: e.to_string(),
        })
    }

    /// Builds an authenticated request.
    fn request(&self, method: Method, path: &str) -> SessionResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(SessionError::NotLoggedIn)?;
        Ok(self
            .client
            .request(method, self.url(path)?)
            .bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> SessionResult<T> {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Maps a non-success response to [`SessionError::Status`].
async fn check_status(response: Response) -> SessionResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    let message = if message.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown").to_string()
    } else {
        message.trim().to_string()
    };

    Err(SessionError::Status {
        status: status.as_u16(),
        message,
    })
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[async_trait]
impl SessionService for HttpSession {
    async fn login(&mut self, username: &str, password: &str) -> SessionResult<()> {
        let response = self
            .client
            .post(self.url("api/login")?)
            .json(&LoginRequest {
                user: username,
                pass: password,
            })
            .send()
            .await?;
        let login: LoginResponse = check_status(response).await?.json().await?;

        if !login.login_status || login.jwt.is_empty() {
            let reason = if login.reason.is_empty() {
                "no token issued".to_string()
            } else {
                login.reason
            };
            return Err(SessionError::Login { reason });
        }

        info!(user = username, "logged in");
        self.token = Some(login.jwt);
        Ok(())
    }

    async fn sync(&mut self) -> SessionResult<()> {
        let who: WhoAmIResponse = self.get_json("api/info/whoami", &[]).await?;
        debug!(uid = who.uid, user = %who.user, "session synced");
        Ok(())
    }

    async fn logout(&mut self) -> SessionResult<()> {
        if self.token.is_none() {
            return Ok(());
        }
        let response = self.request(Method::PUT, "api/logout")?.send().await?;
        check_status(response).await?;
        self.token = None;
        debug!("logged out");
        Ok(())
    }

    async fn parse_query(&self, query: &str) -> SessionResult<ParsedQuery> {
        let response = self
            .request(Method::POST, "api/parse")?
            .json(&ParseRequest {
                search_string: query,
                filters: Vec::new(),
            })
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn start_search(
        &self,
        query: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        background: bool,
    ) -> SessionResult<SearchHandle> {
        let response = self
            .request(Method::POST, "api/searchctrl/launch")?
            .json(&LaunchRequest {
                search_string: query,
                search_start: start,
                search_end: end,
                background,
            })
            .send()
            .await?;
        let launched: LaunchResponse = check_status(response).await?.json().await?;
        Ok(SearchHandle::new(launched.search_id))
    }

    async fn wait_for_search(&self, handle: &SearchHandle) -> SessionResult<()> {
        loop {
            let status = self.search_status(handle).await?;
            if !status.state.is_terminal() {
                debug!(search = %handle, state = ?status.state, "search not finished");
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            if status.state == SearchState::Error {
                return Err(SessionError::JobFailed {
                    id: handle.id().to_string(),
                    reason: if status.error.is_empty() {
                        "search ended in error state".to_string()
                    } else {
                        status.error
                    },
                });
            }
            return Ok(());
        }
    }

    async fn get_text_results(
        &self,
        handle: &SearchHandle,
        first: u64,
        last: u64,
    ) -> SessionResult<Vec<SearchEntry>> {
        let path = format!("api/searchctrl/{}/text", handle.id());
        let response: TextResponse = self
            .get_json(
                &path,
                &[("first", first.to_string()), ("last", last.to_string())],
            )
            .await?;
        response.into_entries()
    }

    async fn get_table_results(
        &self,
        handle: &SearchHandle,
        first: u64,
        last: u64,
    ) -> SessionResult<TableResults> {
        let path = format!("api/searchctrl/{}/table", handle.id());
        let response: TableResponse = self
            .get_json(
                &path,
                &[("first", first.to_string()), ("last", last.to_string())],
            )
            .await?;
        Ok(response.entries.into())
    }

    async fn get_chart_series(
        &self,
        handle: &SearchHandle,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        first: u64,
        last: u64,
    ) -> SessionResult<ChartResults> {
        let path = format!("api/searchctrl/{}/chart", handle.id());
        let response: ChartResponse = self
            .get_json(
                &path,
                &[
                    ("start", timestamp(start)),
                    ("end", timestamp(end)),
                    ("first", first.to_string()),
                    ("last", last.to_string()),
                ],
            )
            .await?;
        Ok(response.entries.into())
    }

    async fn backup(
        &self,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        omit_cache: bool,
    ) -> SessionResult<u64> {
        let response = self
            .request(Method::GET, "api/backup")?
            .query(&[("omit_cache", omit_cache)])
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            sink.write_all(&chunk)
                .await
                .map_err(|e| SessionError::Http(format!("backup write failed: {e}")))?;
            written += chunk.len() as u64;
        }
        sink.flush()
            .await
            .map_err(|e| SessionError::Http(format!("backup write failed: {e}")))?;

        info!(bytes = written, "backup complete");
        Ok(written)
    }
}
