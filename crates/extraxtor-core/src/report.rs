//! Extraction operation reporting.

use std::path::Path;
use std::time::Duration;

/// Immutable summary of an extraction run.
///
/// Produced by [`ExtractionStats::finish`](crate::stats::ExtractionStats::finish)
/// once every worker has joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries materialized.
    pub dirs_created: usize,

    /// Exact sum of bytes copied into extracted files.
    pub bytes_extracted: u64,

    /// Number of wrapper directories removed by flattening.
    pub dirs_flattened: usize,

    /// Entries not materialized: symlinks, special files, unsafe names.
    pub files_skipped: usize,

    /// Number of per-entry failures.
    pub errors_encountered: usize,

    /// Highest number of file copies that were in flight at once.
    pub peak_copies: usize,

    /// Wall-clock time from the start of extraction to the final snapshot.
    pub duration: Duration,

    /// Per-entry failure messages, in the order they were recorded.
    pub errors: Vec<String>,

    /// Non-fatal notices such as flatten conflicts.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns the number of materialized entries.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.dirs_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns whether any entry failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors_encountered > 0
    }
}

/// Callback trait for progress reporting during extraction.
///
/// Notifications come from the thread dispatching entries, one per entry in
/// archive order. Methods cannot fail, so a callback never aborts a run.
///
/// # Examples
///
/// ```
/// use extraxtor_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, current: usize) {
///         println!("#{current}: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when an entry is handed to the worker pool.
    ///
    /// # Arguments
    ///
    /// * `path` - Entry name as stored in the archive
    /// * `current` - Entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, current: usize);

    /// Called once after all entries have been processed.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _current: usize) {}

    fn on_complete(&mut self) {}
}
