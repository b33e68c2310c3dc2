//! CSV output for table results.

use crate::core::TableResults;
use crate::error::{RenderError, Result};
use std::io::Write;

/// Writes `table` as CSV: a header row of column names, then one record per
/// row. Fields containing a comma, quote or newline are quoted and embedded
/// quotes doubled.
///
/// The shape is checked before anything is written, and the writer is
/// flushed before returning.
///
/// # Errors
///
/// Returns [`RenderError::TableShape`] for ragged rows and
/// [`RenderError::Csv`] if encoding or writing fails.
pub fn write_table(table: &TableResults, sink: &mut dyn Write) -> Result<()> {
    table.check_shape()?;

    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(&table.columns).map_err(RenderError::from)?;
    for row in &table.rows {
        writer.write_record(row).map_err(RenderError::from)?;
    }
    writer.flush().map_err(RenderError::from)?;
    Ok(())
}
