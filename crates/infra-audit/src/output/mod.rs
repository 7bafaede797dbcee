//! Document readers and report writers.
//!
//! - JSON documents in, JSON reports out
//! - Markdown renderings of every report type
//! - Plain text files

pub mod json;
pub mod markdown;

// Re-export main functions
pub use json::{read_document, write_report};
pub use markdown::{
    render_bucket_markdown, render_drift_markdown, render_ecs_markdown, render_gateway_markdown,
    render_policy_markdown,
};

use crate::utils::error::OutputError;
use log::{debug, info};
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create missing parent directories of an output file
pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Write a rendered text or markdown report
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_text(contents: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    std::fs::write(output_path, contents)?;
    info!(
        "Report written to {} ({} bytes)",
        output_path.display(),
        contents.len()
    );
    Ok(())
}
