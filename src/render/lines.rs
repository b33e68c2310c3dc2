//! Line-oriented output for text, raw and hex records.

use crate::core::SearchEntry;
use crate::error::{RenderError, Result};
use std::io::Write;

/// Writes each record's bytes unmodified, followed by a newline, in fetch
/// order.
///
/// # Errors
///
/// Returns [`RenderError::Write`] if the sink fails.
pub fn write_lines(entries: &[SearchEntry], sink: &mut dyn Write) -> Result<()> {
    for entry in entries {
        sink.write_all(&entry.data).map_err(RenderError::from)?;
        sink.write_all(b"\n").map_err(RenderError::from)?;
    }
    sink.flush().map_err(RenderError::from)?;
    Ok(())
}
