//! CLI command implementations.
//!
//! Each command validates its local input, logs in, runs one job, logs out
//! and only then writes output, so a failed search never truncates an
//! existing output file.

use crate::cli::output::{create_archive, open_sink};
use crate::cli::parser::{Cli, Job};
use crate::config::{BackupOptions, ChartOptions, ClientConfig, SearchOptions};
use crate::core::{CHART_RENDERERS, ResultSet, SEARCH_RENDERERS, TimeWindow};
use crate::error::{Error, Result, SearchError};
use crate::render::{RenderOptions, render};
use crate::search::{CHART_BUCKETS, SearchOrchestrator, SearchRequest};
use crate::session::{HttpSession, SessionService};
use std::future::Future;
use tracing::{debug, info, warn};

/// Executes the CLI command.
///
/// # Errors
///
/// Returns the first error of any stage; nothing is retried.
pub async fn execute(cli: &Cli) -> Result<()> {
    let config = cli.client_config();

    match cli.command.job() {
        Job::Search(options) => cmd_search(&config, &options).await,
        Job::Chart(options) => cmd_chart(&config, &options).await,
        Job::Backup(options) => cmd_backup(&config, &options).await,
    }
}

async fn cmd_search(config: &ClientConfig, options: &SearchOptions) -> Result<()> {
    let window = TimeWindow::parse(&options.duration)?;
    let request = SearchRequest {
        query: &options.query,
        window,
        accepted: SEARCH_RENDERERS,
        count: options.count,
        wait: options.wait,
        background: false,
    };

    let results = search_with_login(config, &request).await?;
    let mut sink = open_sink(options.output.as_deref())?;
    render(&results, &RenderOptions::default(), sink.as_mut())
}

async fn cmd_chart(config: &ClientConfig, options: &ChartOptions) -> Result<()> {
    let window = TimeWindow::parse(&options.duration)?;
    let request = SearchRequest {
        query: &options.query,
        window,
        accepted: CHART_RENDERERS,
        count: CHART_BUCKETS,
        wait: options.wait,
        background: false,
    };

    let results = search_with_login(config, &request).await?;
    let mut sink = open_sink(options.output.as_deref())?;
    let render_options = RenderOptions {
        title: options.title.clone(),
    };
    render(&results, &render_options, sink.as_mut())
}

async fn cmd_backup(config: &ClientConfig, options: &BackupOptions) -> Result<()> {
    let mut archive = create_archive(&options.output).await?;

    let mut session = HttpSession::new(config)?;
    open_session(&mut session, config).await?;
    let outcome = session.backup(&mut archive, options.omit_cache).await;
    close_session(&mut session).await;

    let bytes = outcome?;
    info!(path = %options.output.display(), bytes, "backup written");
    Ok(())
}

async fn search_with_login(
    config: &ClientConfig,
    request: &SearchRequest<'_>,
) -> Result<ResultSet> {
    let mut session = HttpSession::new(config)?;
    open_session(&mut session, config).await?;
    let outcome = run_search(&session, request, interrupted()).await;
    close_session(&mut session).await;
    outcome
}

/// Logs in and refreshes the account state.
///
/// # Errors
///
/// Returns a session error if the login or the follow-up sync fails.
pub async fn open_session<S>(session: &mut S, config: &ClientConfig) -> Result<()>
where
    S: SessionService + ?Sized,
{
    session.login(&config.username, &config.password).await?;
    session.sync().await?;
    Ok(())
}

/// Logs out, reporting but not propagating a failure.
pub async fn close_session<S>(session: &mut S)
where
    S: SessionService + ?Sized,
{
    if let Err(e) = session.logout().await {
        warn!(error = %e, "logout failed");
    }
}

/// Runs one search on a logged-in session.
///
/// # Errors
///
/// Returns the first error of any pipeline stage, or
/// [`SearchError::Cancelled`] if `cancel` resolves while waiting.
pub async fn run_search<S, F>(
    session: &S,
    request: &SearchRequest<'_>,
    cancel: F,
) -> Result<ResultSet>
where
    S: SessionService + ?Sized,
    F: Future<Output = ()> + Send,
{
    debug!(query = request.query, window = %request.window, "running search");
    let result = SearchOrchestrator::new(session).run(request, cancel).await;
    if let Err(Error::Search(SearchError::Cancelled { id })) = &result {
        warn!(search = %id, "interrupted; the search keeps running on the server");
    }
    result
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
