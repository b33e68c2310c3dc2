//! Renderer declarations and validation.
//!
//! The server classifies every parsed query by the renderer its output is
//! meant for. Each tool accepts a fixed set of renderers; the declared one is
//! checked against that set once, before a search is started, and turned
//! into a [`RenderStrategy`] that the rest of the pipeline matches on.

use crate::error::{RenderError, Result};
use std::fmt;

/// Renderers accepted by the `search` tool.
pub const SEARCH_RENDERERS: &[RendererKind] = &[
    RendererKind::Text,
    RendererKind::Raw,
    RendererKind::Hex,
    RendererKind::Table,
];

/// Renderers accepted by the `chart` tool.
pub const CHART_RENDERERS: &[RendererKind] = &[RendererKind::Chart];

/// A renderer identifier as declared by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Plain text records.
    Text,
    /// Raw records.
    Raw,
    /// Hex dump records.
    Hex,
    /// Columnar table.
    Table,
    /// Time-series chart.
    Chart,
    /// Any renderer this crate has no output for.
    Other(String),
}

impl RendererKind {
    /// Parses a declared renderer name. Matching is exact.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "raw" => Self::Raw,
            "hex" => Self::Hex,
            "table" => Self::Table,
            "chart" => Self::Chart,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire name of the renderer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Raw => "raw",
            Self::Hex => "hex",
            Self::Table => "table",
            Self::Chart => "chart",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a validated search's results are fetched and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Text records, one per line.
    Text,
    /// Raw records, one per line.
    Raw,
    /// Hex records, one per line.
    Hex,
    /// CSV table.
    Table,
    /// Gnuplot bar chart script.
    Chart,
}

/// Which result fetch a strategy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Paged entry records.
    Entries,
    /// Column/row table.
    Table,
    /// Condensed time series.
    Series,
}

impl RenderStrategy {
    /// Returns the fetch operation this strategy consumes.
    #[must_use]
    pub const fn fetch_kind(self) -> FetchKind {
        match self {
            Self::Text | Self::Raw | Self::Hex => FetchKind::Entries,
            Self::Table => FetchKind::Table,
            Self::Chart => FetchKind::Series,
        }
    }

    /// Returns the renderer this strategy was resolved from.
    #[must_use]
    pub const fn renderer(self) -> RendererKind {
        match self {
            Self::Text => RendererKind::Text,
            Self::Raw => RendererKind::Raw,
            Self::Hex => RendererKind::Hex,
            Self::Table => RendererKind::Table,
            Self::Chart => RendererKind::Chart,
        }
    }
}

/// Checks a declared renderer against the renderers a tool accepts.
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedRenderer`] naming the declared renderer
/// when it is not in `accepted`.
///
/// # Examples
///
/// ```
/// use gw_search::core::{CHART_RENDERERS, RenderStrategy, validate};
///
/// assert_eq!(validate("chart", CHART_RENDERERS).unwrap(), RenderStrategy::Chart);
/// assert!(validate("table", CHART_RENDERERS).is_err());
/// ```
pub fn validate(declared: &str, accepted: &[RendererKind]) -> Result<RenderStrategy> {
    let kind = RendererKind::parse(declared);
    let unsupported = || RenderError::UnsupportedRenderer {
        declared: declared.to_string(),
        accepted: accepted
            .iter()
            .map(RendererKind::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    };

    if !accepted.contains(&kind) {
        return Err(unsupported().into());
    }

    let strategy = match kind {
        RendererKind::Text => RenderStrategy::Text,
        RendererKind::Raw => RenderStrategy::Raw,
        RendererKind::Hex => RenderStrategy::Hex,
        RendererKind::Table => RenderStrategy::Table,
        RendererKind::Chart => RenderStrategy::Chart,
        RendererKind::Other(_) => return Err(unsupported().into()),
    };
    Ok(strategy)
}
