//! Thread-safe statistics shared by extraction workers.

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Instant;

use crate::ExtractionReport;

#[derive(Debug, Default)]
struct FileCounters {
    files_extracted: usize,
    bytes_extracted: u64,
}

#[derive(Debug, Default)]
struct DirCounters {
    dirs_created: usize,
    dirs_flattened: usize,
}

#[derive(Debug, Default)]
struct SkipCounters {
    files_skipped: usize,
    errors_encountered: usize,
}

/// Counters updated concurrently by extraction workers.
///
/// Related counters live behind their own lock so that, for example, a file
/// count and its byte total are always updated together. Per-entry error
/// messages are appended under a separate lock in completion order.
#[derive(Debug)]
pub struct ExtractionStats {
    started: Instant,
    files: Mutex<FileCounters>,
    dirs: Mutex<DirCounters>,
    skips: Mutex<SkipCounters>,
    errors: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    peak_copies: AtomicUsize,
}

impl Default for ExtractionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks `mutex`, recovering the data if a worker panicked while holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ExtractionStats {
    /// Creates zeroed counters and captures the start instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            files: Mutex::default(),
            dirs: Mutex::default(),
            skips: Mutex::default(),
            errors: Mutex::default(),
            warnings: Mutex::default(),
            peak_copies: AtomicUsize::new(0),
        }
    }

    /// Records one extracted file of `bytes` bytes.
    pub fn record_file(&self, bytes: u64) {
        let mut files = lock(&self.files);
        files.files_extracted += 1;
        files.bytes_extracted += bytes;
    }

    /// Records one created directory.
    pub fn record_dir(&self) {
        lock(&self.dirs).dirs_created += 1;
    }

    /// Records one entry that was deliberately not materialized.
    pub fn record_skip(&self) {
        lock(&self.skips).files_skipped += 1;
    }

    /// Records a per-entry failure.
    pub fn record_error(&self, message: impl Into<String>) {
        lock(&self.skips).errors_encountered += 1;
        lock(&self.errors).push(message.into());
    }

    /// Records an entry that was skipped because it failed a check.
    pub fn record_skip_with_error(&self, message: impl Into<String>) {
        {
            let mut skips = lock(&self.skips);
            skips.files_skipped += 1;
            skips.errors_encountered += 1;
        }
        lock(&self.errors).push(message.into());
    }

    /// Records a non-fatal notice.
    pub fn record_warning(&self, message: impl Into<String>) {
        lock(&self.warnings).push(message.into());
    }

    /// Sets the number of wrapper directories removed by flattening.
    pub fn set_dirs_flattened(&self, count: usize) {
        lock(&self.dirs).dirs_flattened = count;
    }

    /// Raises the recorded copy concurrency peak to at least `peak`.
    pub fn record_peak_copies(&self, peak: usize) {
        self.peak_copies.fetch_max(peak, Ordering::Relaxed);
    }

    /// Returns the number of per-entry failures recorded so far.
    #[must_use]
    pub fn errors_encountered(&self) -> usize {
        lock(&self.skips).errors_encountered
    }

    /// Takes the final snapshot and stamps the duration.
    ///
    /// Only meaningful once every worker has joined.
    #[must_use]
    pub fn finish(&self) -> ExtractionReport {
        let files = lock(&self.files);
        let dirs = lock(&self.dirs);
        let skips = lock(&self.skips);

        ExtractionReport {
            files_extracted: files.files_extracted,
            dirs_created: dirs.dirs_created,
            bytes_extracted: files.bytes_extracted,
            dirs_flattened: dirs.dirs_flattened,
            files_skipped: skips.files_skipped,
            errors_encountered: skips.errors_encountered,
            peak_copies: self.peak_copies.load(Ordering::Relaxed),
            duration: self.started.elapsed(),
            errors: lock(&self.errors).clone(),
            warnings: lock(&self.warnings).clone(),
        }
    }
}
