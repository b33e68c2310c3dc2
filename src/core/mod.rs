//! Core domain types for gw-search.
//!
//! Contains the time window, renderer and result types shared by the
//! search orchestrator and the result renderers.

pub mod renderer;
pub mod results;
pub mod window;

pub use renderer::{
    CHART_RENDERERS, FetchKind, RenderStrategy, RendererKind, SEARCH_RENDERERS, validate,
};
pub use results::{ChartResults, ResultSet, SearchEntry, Series, TableResults};
pub use window::{TimeWindow, parse_duration};
