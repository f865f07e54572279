//! Error types for archive extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Input/output path problems detected before any extraction work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input archive path is empty or does not exist.
    #[error("file not found: {path}")]
    MissingInput {
        /// The missing input path.
        path: PathBuf,
    },

    /// Input path points at a directory.
    #[error("input is a directory, expected file: {path}")]
    InputIsDirectory {
        /// The input path.
        path: PathBuf,
    },

    /// Input file has zero length.
    #[error("input file is empty: {path}")]
    InputEmpty {
        /// The input path.
        path: PathBuf,
    },

    /// Input file cannot be accessed due to permissions.
    #[error("permission denied accessing file: {path}")]
    InputUnreadable {
        /// The input path.
        path: PathBuf,
    },

    /// Output path exists but is not a directory.
    #[error("output path exists but is not a directory: {path}")]
    OutputIsNotDirectory {
        /// The output path.
        path: PathBuf,
    },

    /// Output directory already has content and force is off.
    #[error("output directory not empty (use --force to override): {path}")]
    OutputNotEmpty {
        /// The output path.
        path: PathBuf,
    },

    /// Output directory is the directory holding the archive and force is off.
    #[error("output directory same as input directory (use --force to override): {path}")]
    OutputEqualsInputDirectory {
        /// The output path.
        path: PathBuf,
    },
}

impl ValidationError {
    /// Returns the path the validation failure refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::MissingInput { path }
            | Self::InputIsDirectory { path }
            | Self::InputEmpty { path }
            | Self::InputUnreadable { path }
            | Self::OutputIsNotDirectory { path }
            | Self::OutputNotEmpty { path }
            | Self::OutputEqualsInputDirectory { path } => path,
        }
    }

    /// Returns `true` if passing `force` would have accepted the paths.
    #[must_use]
    pub const fn is_overridable(&self) -> bool {
        matches!(
            self,
            Self::OutputNotEmpty { .. } | Self::OutputEqualsInputDirectory { .. }
        )
    }
}

/// Errors that can occur during archive extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output paths were rejected before extraction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// Archive is corrupted or invalid.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Entry name resolves outside the output root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The entry name that attempted traversal.
        path: PathBuf,
    },

    /// Symlink entries are never materialized.
    #[error("symlink not supported, skipped: {path}")]
    SymlinkUnsupported {
        /// The symlink entry name.
        path: PathBuf,
    },

    /// The run was cancelled by an external signal.
    #[error("extraction cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use extraxtor_core::ExtractionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::UnsupportedFormat;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns `true` if this error only affects a single entry.
    ///
    /// Per-entry errors are recorded and counted; the run continues with
    /// the next entry. Everything else aborts the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use extraxtor_core::ExtractionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::SymlinkUnsupported {
    ///     path: PathBuf::from("link"),
    /// };
    /// assert!(err.is_recoverable());
    ///
    /// let err = ExtractionError::InvalidArchive("truncated header".to_string());
    /// assert!(!err.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::SymlinkUnsupported { .. } | Self::Io(_)
        )
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            _ => None,
        }
    }
}
