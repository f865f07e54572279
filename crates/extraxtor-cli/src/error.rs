//! Error conversion utilities for CLI.
//!
//! Converts extraxtor-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use extraxtor_core::ExtractionError;
use extraxtor_core::ValidationError;
use std::path::Path;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::Validation(validation) => convert_validation_error(&validation),
        ExtractionError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                path.display()
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        ExtractionError::UnsupportedFormat => {
            anyhow!(
                "Archive format not supported: {}\n\
                 HINT: Supported formats: tar, tar.gz, tar.bz2, tar.xz, tar.zst, zip",
                archive.display()
            )
        }
        ExtractionError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or truncated.",
                archive.display(),
                reason
            )
        }
        ExtractionError::Cancelled => {
            anyhow!(
                "Extraction of '{}' was interrupted\n\
                 HINT: Files already written to the output directory were kept.",
                archive.display()
            )
        }
        err @ ExtractionError::SymlinkUnsupported { .. } => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

fn convert_validation_error(err: &ValidationError) -> anyhow::Error {
    let hint = match err {
        ValidationError::MissingInput { .. } => "Check the archive path for typos.",
        ValidationError::InputIsDirectory { .. } => "Pass the archive file, not its directory.",
        ValidationError::InputEmpty { .. } => "The file may still be downloading.",
        ValidationError::InputUnreadable { .. } => "Check the file permissions.",
        ValidationError::OutputIsNotDirectory { .. } => "Choose a directory as the output.",
        ValidationError::OutputNotEmpty { .. } => {
            "Use --force to extract into a non-empty directory."
        }
        ValidationError::OutputEqualsInputDirectory { .. } => {
            "Choose another output directory or use --force."
        }
    };
    anyhow!("{err}\nHINT: {hint}")
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}
