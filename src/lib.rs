//! # gw-search
//!
//! Command-line client for a remote log-analytics server.
//!
//! Runs a query over a relative time window, waits for it to finish and
//! prints the results in the form the query's renderer calls for:
//!
//! - **Entries**: `text`, `raw` and `hex` renderers print one record per line
//! - **Tables**: the `table` renderer prints CSV
//! - **Charts**: the `chart` renderer prints a gnuplot bar chart script
//!
//! It can also download a full server backup.
//!
//! The server is reached through the [`session::SessionService`] trait, so
//! the search pipeline in [`search`] and the renderers in [`render`] can be
//! driven by any implementation, not just [`session::HttpSession`].

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod render;
pub mod search;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{
    ChartResults, RenderStrategy, RendererKind, ResultSet, SearchEntry, Series, TableResults,
    TimeWindow, parse_duration, validate,
};

// Re-export pipeline types
pub use search::{SearchOrchestrator, SearchRequest, WaitOptions};
pub use session::{HttpSession, SearchHandle, SessionService};

// Re-export CLI types
pub use cli::{Cli, Commands};
