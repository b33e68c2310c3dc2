//! Search orchestration.
//!
//! Drives one search from query validation through submission, completion
//! and result retrieval. Nothing here retries; every failure is returned to
//! the caller as-is.

use crate::core::{
    ChartResults, FetchKind, RenderStrategy, RendererKind, ResultSet, SearchEntry, TableResults,
    TimeWindow, validate,
};
use crate::error::{Error, RenderError, Result, SearchError, SessionError};
use crate::search::CHART_BUCKETS;
use crate::session::{SearchHandle, SessionService};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Settings for waiting on a submitted search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this long; wait indefinitely when `None`.
    pub deadline: Option<Duration>,
}

impl WaitOptions {
    /// Waits without a deadline.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { deadline: None }
    }

    /// Waits at most `deadline`.
    #[must_use]
    pub const fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}

/// A query whose renderer has been validated for the current tool.
///
/// Only obtainable through [`SearchOrchestrator::prepare`], so a search can
/// never be submitted before its renderer was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSearch {
    query: String,
    strategy: RenderStrategy,
}

impl PreparedSearch {
    /// The query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The strategy resolved from the declared renderer.
    #[must_use]
    pub const fn strategy(&self) -> RenderStrategy {
        self.strategy
    }
}

/// Everything needed to run one search end to end.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    /// Query text.
    pub query: &'a str,
    /// Time range to search.
    pub window: TimeWindow,
    /// Renderers the calling tool can handle.
    pub accepted: &'a [RendererKind],
    /// Number of entries or rows to fetch.
    pub count: u64,
    /// Completion wait settings.
    pub wait: WaitOptions,
    /// Submit as a background search.
    pub background: bool,
}

/// Runs searches against a [`SessionService`].
pub struct SearchOrchestrator<'a, S: SessionService + ?Sized> {
    session: &'a S,
}

impl<'a, S: SessionService + ?Sized> SearchOrchestrator<'a, S> {
    /// Creates an orchestrator over a logged-in session.
    pub const fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// Parses `query` on the server and validates its renderer.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the server rejects the query and
    /// [`RenderError::UnsupportedRenderer`] if its renderer is not accepted.
    pub async fn prepare(&self, query: &str, accepted: &[RendererKind]) -> Result<PreparedSearch> {
        let parsed = self
            .session
            .parse_query(query)
            .await
            .map_err(SearchError::Parse)?;
        let strategy = validate(&parsed.render_module, accepted)?;
        debug!(renderer = %parsed.render_module, ?strategy, "query validated");

        Ok(PreparedSearch {
            query: query.to_string(),
            strategy,
        })
    }

    /// Starts a validated search over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Submission`] on any transport or server error.
    pub async fn submit(
        &self,
        prepared: &PreparedSearch,
        window: &TimeWindow,
        background: bool,
    ) -> Result<SearchHandle> {
        let handle = self
            .session
            .start_search(&prepared.query, window.start(), window.end(), background)
            .await
            .map_err(SearchError::Submission)?;
        info!(search = %handle, %window, "search started");
        Ok(handle)
    }

    /// Waits until the search reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::SearchFailed`] if the search ends in error,
    /// [`SearchError::WaitTimeout`] if the deadline passes first and the
    /// underlying session error if polling itself fails.
    pub async fn await_completion(&self, handle: &SearchHandle, options: WaitOptions) -> Result<()> {
        self.await_completion_or_cancel(handle, options, std::future::pending())
            .await
    }

    /// Like [`SearchOrchestrator::await_completion`], but gives up as soon
    /// as `cancel` resolves.
    ///
    /// Cancelling only stops the local wait; the remote job keeps running.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Cancelled`] when `cancel` wins, otherwise the
    /// same errors as [`SearchOrchestrator::await_completion`].
    pub async fn await_completion_or_cancel<F>(
        &self,
        handle: &SearchHandle,
        options: WaitOptions,
        cancel: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let wait = async {
            match options.deadline {
                Some(deadline) => {
                    match tokio::time::timeout(deadline, self.session.wait_for_search(handle)).await
                    {
                        Ok(result) => result.map_err(|e| wait_error(handle, e)),
                        Err(_) => Err(SearchError::WaitTimeout {
                            id: handle.id().to_string(),
                            seconds: deadline.as_secs(),
                        }
                        .into()),
                    }
                }
                None => self
                    .session
                    .wait_for_search(handle)
                    .await
                    .map_err(|e| wait_error(handle, e)),
            }
        };

        tokio::select! {
            result = wait => result?,
            () = cancel => {
                return Err(SearchError::Cancelled {
                    id: handle.id().to_string(),
                }
                .into());
            }
        }

        debug!(search = %handle, "search completed");
        Ok(())
    }

    /// Fetches the first `count` entry records, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Fetch`] if the fetch fails.
    pub async fn fetch_text(&self, handle: SearchHandle, count: u64) -> Result<Vec<SearchEntry>> {
        let entries = self
            .session
            .get_text_results(&handle, 0, count)
            .await
            .map_err(SearchError::Fetch)?;
        debug!(search = %handle, entries = entries.len(), "fetched entries");
        Ok(entries)
    }

    /// Fetches the first `count` table rows, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Fetch`] if the fetch fails.
    pub async fn fetch_table(&self, handle: SearchHandle, count: u64) -> Result<TableResults> {
        let table = self
            .session
            .get_table_results(&handle, 0, count)
            .await
            .map_err(SearchError::Fetch)?;
        debug!(search = %handle, rows = table.rows.len(), "fetched table");
        Ok(table)
    }

    /// Fetches chart data condensed into `bucket_count` buckets starting at
    /// `bucket_hint`, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Fetch`] if the fetch fails and
    /// [`RenderError::TooManyBuckets`] if a single-bucket request comes back
    /// with more than one series.
    pub async fn fetch_chart_series(
        &self,
        handle: SearchHandle,
        window: &TimeWindow,
        bucket_hint: u64,
        bucket_count: u64,
    ) -> Result<ChartResults> {
        let chart = self
            .session
            .get_chart_series(
                &handle,
                window.start(),
                window.end(),
                bucket_hint,
                bucket_hint + bucket_count,
            )
            .await
            .map_err(SearchError::Fetch)?;

        if bucket_count == 1 && chart.values.len() > 1 {
            return Err(RenderError::TooManyBuckets {
                count: chart.values.len(),
            }
            .into());
        }
        debug!(search = %handle, names = chart.names.len(), "fetched chart series");
        Ok(chart)
    }

    /// Runs the whole pipeline: prepare, submit, wait and fetch.
    ///
    /// Chart searches are condensed into a single bucket.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub async fn run<F>(&self, request: &SearchRequest<'_>, cancel: F) -> Result<ResultSet>
    where
        F: Future<Output = ()> + Send,
    {
        let prepared = self.prepare(request.query, request.accepted).await?;
        let handle = self
            .submit(&prepared, &request.window, request.background)
            .await?;
        self.await_completion_or_cancel(&handle, request.wait, cancel)
            .await?;

        let strategy = prepared.strategy();
        debug!(search = %handle, renderer = %strategy.renderer(), "fetching results");
        let results = match strategy.fetch_kind() {
            FetchKind::Entries => ResultSet::Entries {
                entries: self.fetch_text(handle, request.count).await?,
            },
            FetchKind::Table => ResultSet::Table(self.fetch_table(handle, request.count).await?),
            FetchKind::Series => ResultSet::Chart(
                self.fetch_chart_series(handle, &request.window, 0, CHART_BUCKETS)
                    .await?,
            ),
        };
        Ok(results)
    }
}

/// Only a job that ended in error is a failed search; transport and status
/// errors while polling pass through as session errors.
fn wait_error(handle: &SearchHandle, err: SessionError) -> Error {
    match err {
        SessionError::JobFailed { reason, .. } => SearchError::SearchFailed {
            id: handle.id().to_string(),
            reason,
        }
        .into(),
        other => other.into(),
    }
}
