//! Typed search results.

use crate::error::{RenderError, Result};

/// A single record returned by the entries fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Opaque record bytes.
    pub data: Vec<u8>,
}

impl SearchEntry {
    /// Creates an entry from raw bytes.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

/// Columns and rows returned by the table fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableResults {
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows; each should carry one field per column.
    pub rows: Vec<Vec<String>>,
}

impl TableResults {
    /// Checks that every row has exactly one field per column.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TableShape`] for the first offending row.
    pub fn check_shape(&self) -> Result<()> {
        let expected = self.columns.len();
        if let Some((row, fields)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, fields)| fields.len() != expected)
        {
            return Err(RenderError::TableShape {
                row,
                expected,
                actual: fields.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// One aggregated series of a chart result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Series label.
    pub name: String,
    /// Values, aligned index-for-index with [`ChartResults::names`].
    pub data: Vec<f64>,
}

/// Category labels and series returned by the chart fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartResults {
    /// Category (or time bucket) labels.
    pub names: Vec<String>,
    /// Aggregated series.
    pub values: Vec<Series>,
}

impl ChartResults {
    /// Returns the only series of a single-bucket result.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TooManyBuckets`] for more than one series,
    /// [`RenderError::MissingSeries`] for none and
    /// [`RenderError::SeriesMisaligned`] if the series has fewer values than
    /// there are names.
    pub fn single_series(&self) -> Result<&Series> {
        let series = match self.values.as_slice() {
            [] => return Err(RenderError::MissingSeries.into()),
            [only] => only,
            many => {
                return Err(RenderError::TooManyBuckets { count: many.len() }.into());
            }
        };
        if series.data.len() < self.names.len() {
            return Err(RenderError::SeriesMisaligned {
                names: self.names.len(),
                values: series.data.len(),
            }
            .into());
        }
        Ok(series)
    }
}

/// Fetched results, shaped by the render strategy that requested them.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// Entry records for the text, raw and hex renderers.
    Entries {
        /// Records in fetch order.
        entries: Vec<SearchEntry>,
    },
    /// Table for the table renderer.
    Table(TableResults),
    /// Single-series chart data.
    Chart(ChartResults),
}
