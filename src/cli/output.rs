//! Output destinations and error formatting for CLI commands.

use crate::error::{Error, IoError, RenderError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Opens the destination for rendered results.
///
/// Writes to the file at `path` (created or truncated), or to stdout when
/// no path is given. Both are buffered.
///
/// # Errors
///
/// Returns [`IoError::CreateFailed`] if the file cannot be created.
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| IoError::CreateFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Creates the backup archive file.
///
/// # Errors
///
/// Returns [`IoError::CreateFailed`] if the file cannot be created.
pub async fn create_archive(path: &Path) -> Result<tokio::fs::File> {
    tokio::fs::File::create(path).await.map_err(|e| {
        IoError::CreateFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Formats an error as a single diagnostic line.
#[must_use]
pub fn format_error(error: &Error) -> String {
    error
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns whether `error` is a write to a closed pipe, e.g. stdout piped
/// into `head`.
#[must_use]
pub fn is_broken_pipe(error: &Error) -> bool {
    matches!(error, Error::Render(RenderError::Closed))
}
