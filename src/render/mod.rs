//! Result rendering for gw-search.
//!
//! Each output shape has its own writer:
//!
//! - **Lines**: text, raw and hex records, one per line
//! - **Table**: comma separated values with a header row
//! - **Chart**: a self-contained gnuplot bar chart script
//!
//! Renderers write to a sink owned by the caller and never open or close it.

pub mod chart;
pub mod lines;
pub mod table;

pub use chart::{escape_gnuplot, write_chart};
pub use lines::write_lines;
pub use table::write_table;

use crate::core::ResultSet;
use crate::error::Result;
use std::io::Write;

/// Presentation settings that are not part of the fetched data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Chart title; ignored by the line and table writers.
    pub title: String,
}

/// Writes `results` to `sink` in the format their shape calls for.
///
/// # Errors
///
/// Returns an error if the results violate their shape invariants or the
/// sink cannot be written.
pub fn render(results: &ResultSet, options: &RenderOptions, sink: &mut dyn Write) -> Result<()> {
    match results {
        ResultSet::Entries { entries } => write_lines(entries, sink),
        ResultSet::Table(table) => write_table(table, sink),
        ResultSet::Chart(chart) => write_chart(&options.title, chart, sink),
    }
}
