//! Gnuplot script output for chart results.
//!
//! The script is self-contained: a fixed preamble, the data inlined as a
//! here-document, and a `plot` command that draws one box per category.

use crate::core::ChartResults;
use crate::error::{RenderError, Result};
use std::borrow::Cow;
use std::io::{self, Write};

/// Name of the inline dataset block.
const DATASET: &str = "$data";

/// Writes a gnuplot bar chart script for a single-series chart.
///
/// The dataset holds one `index name value` triple per category name.
///
/// # Errors
///
/// Returns [`RenderError::TooManyBuckets`] if the chart has more than one
/// series, [`RenderError::MissingSeries`] or
/// [`RenderError::SeriesMisaligned`] for other shape problems, and
/// [`RenderError::Write`] if the sink fails.
///
/// # Examples
///
/// ```
/// use gw_search::core::{ChartResults, Series};
/// use gw_search::render::write_chart;
///
/// let chart = ChartResults {
///     names: vec!["GET".to_string(), "POST".to_string()],
///     values: vec![Series { name: "count".to_string(), data: vec![12.0, 3.0] }],
/// };
/// let mut out = Vec::new();
/// write_chart("Methods", &chart, &mut out).unwrap();
/// let script = String::from_utf8(out).unwrap();
/// assert!(script.contains("0 GET 12\n1 POST 3\n"));
/// ```
pub fn write_chart(title: &str, chart: &ChartResults, sink: &mut dyn Write) -> Result<()> {
    let series = chart.single_series()?;
    write_script(title, &chart.names, &series.data, sink).map_err(RenderError::from)?;
    Ok(())
}

fn write_script(
    title: &str,
    names: &[String],
    values: &[f64],
    sink: &mut dyn Write,
) -> io::Result<()> {
    sink.write_all(b"set terminal png\nset boxwidth 0.5\nset style fill solid\n")?;
    writeln!(sink, "set title \"{}\"", escape_gnuplot(title))?;
    sink.write_all(b"set nokey\n")?;

    writeln!(sink, "{DATASET} << EOD")?;
    for (i, (name, value)) in names.iter().zip(values).enumerate() {
        writeln!(sink, "{i} {} {value}", data_field(name))?;
    }
    writeln!(sink, "EOD")?;
    writeln!(sink, "plot {DATASET} using 1:3:xtic(2) with boxes")?;
    sink.flush()
}

/// Escapes text for use inside a double-quoted gnuplot string.
#[must_use]
pub fn escape_gnuplot(text: &str) -> Cow<'_, str> {
    if !text.contains(['"', '\\', '\n']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Quotes a category name when it would not survive as a single
/// whitespace-separated data column. An unquoted `#` starts a comment.
fn data_field(name: &str) -> Cow<'_, str> {
    if !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == '"' || c == '#') {
        return Cow::Borrowed(name);
    }
    Cow::Owned(format!("\"{}\"", escape_gnuplot(name)))
}
