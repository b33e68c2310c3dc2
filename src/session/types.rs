//! Session types and JSON wire formats.
//!
//! Wire structs mirror the server's PascalCase JSON; they are converted into
//! the core result types before leaving the session layer.

use crate::core::{ChartResults, SearchEntry, Series, TableResults};
use crate::error::SessionError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque reference to a running search.
///
/// Deliberately not `Clone`: fetching results consumes the handle.
#[derive(Debug, PartialEq, Eq)]
pub struct SearchHandle {
    id: String,
}

impl SearchHandle {
    /// Wraps a server-assigned search ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Server-assigned search ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SearchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Server response to a query parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedQuery {
    /// Renderer the query's output is meant for.
    pub render_module: String,
}

// ==================== Requests ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginRequest<'a> {
    pub user: &'a str,
    pub pass: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ParseRequest<'a> {
    pub search_string: &'a str,
    pub filters: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LaunchRequest<'a> {
    pub search_string: &'a str,
    pub search_start: DateTime<Utc>,
    pub search_end: DateTime<Utc>,
    pub background: bool,
}

// ==================== Responses ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginResponse {
    pub login_status: bool,
    #[serde(rename = "JWT", default)]
    pub jwt: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WhoAmIResponse {
    #[serde(rename = "UID")]
    pub uid: u64,
    #[serde(rename = "User", default)]
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LaunchResponse {
    #[serde(rename = "SearchID")]
    pub search_id: String,
}

/// Lifecycle state of a remote search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchState {
    /// Still executing.
    Running,
    /// Finished; results are final.
    Completed,
    /// Terminated with an error.
    Error,
    /// Any state this client does not know; treated as not yet terminal.
    #[serde(other)]
    Unknown,
}

impl SearchState {
    /// Returns whether no further progress will occur.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Status of a remote search as reported by the server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusResponse {
    /// Current lifecycle state.
    pub state: SearchState,
    /// Failure reason when `state` is [`SearchState::Error`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TextResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<WireEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireEntry {
    /// Base64 encoded record bytes.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TableResponse {
    pub entries: WireTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireTable {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<WireRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub row: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ChartResponse {
    pub entries: WireChart,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireChart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<WireSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<f64>,
}

/// Accepts `null` wherever a default value is acceptable.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TextResponse {
    /// Decodes the base64 payload of every entry, preserving order.
    pub(crate) fn into_entries(self) -> Result<Vec<SearchEntry>, SessionError> {
        self.entries
            .into_iter()
            .map(|e| {
                STANDARD
                    .decode(e.data)
                    .map(SearchEntry::new)
                    .map_err(SessionError::from)
            })
            .collect()
    }
}

impl From<WireTable> for TableResults {
    fn from(table: WireTable) -> Self {
        Self {
            columns: table.columns,
            rows: table.rows.into_iter().map(|r| r.row).collect(),
        }
    }
}

impl From<WireChart> for ChartResults {
    fn from(chart: WireChart) -> Self {
        Self {
            names: chart.names,
            values: chart
                .values
                .into_iter()
                .map(|s| Series {
                    name: s.name,
                    data: s.data,
                })
                .collect(),
        }
    }
}
