//! Extraction run configuration.

/// Upper bound on extraction worker threads.
pub const MAX_WORKERS: usize = 4;

/// Default cap on flatten iterations.
pub const DEFAULT_MAX_FLATTEN_ITERATIONS: usize = 10;

/// Default number of format identification attempts.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Entry payloads up to this size are spooled in memory, larger ones on disk.
pub const DEFAULT_SPOOL_THRESHOLD: usize = 1024 * 1024;

/// Returns `min(MAX_WORKERS, available_parallelism)`, at least 1.
#[must_use]
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .clamp(1, MAX_WORKERS)
}

/// Configuration for a single extraction run.
///
/// # Examples
///
/// ```
/// use extraxtor_core::ExtractConfig;
///
/// // Flatten into an empty directory with default parallelism
/// let config = ExtractConfig::default();
/// assert!(config.flatten);
///
/// // Overwrite existing output, keep the archive layout as-is
/// let custom = ExtractConfig::default()
///     .with_force(true)
///     .with_flatten(false)
///     .with_concurrency(2);
/// assert_eq!(custom.concurrency, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Accept non-empty output directories and overwrite conflicting
    /// entries while flattening.
    ///
    /// Default: `false`.
    pub force: bool,

    /// Collapse redundant single-directory wrappers after extraction.
    ///
    /// Default: `true`.
    pub flatten: bool,

    /// Maximum number of simultaneous file copies.
    ///
    /// Default: [`default_parallelism`].
    pub concurrency: usize,

    /// Maximum number of wrapper directories removed by one flatten pass.
    ///
    /// Default: 10.
    pub max_flatten_iterations: usize,

    /// Number of attempts made to identify the archive format.
    ///
    /// Default: 3.
    pub max_retries: usize,

    /// In-memory spool size per entry before falling back to a temp file.
    ///
    /// Default: 1 MiB.
    pub spool_threshold: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            force: false,
            flatten: true,
            concurrency: default_parallelism(),
            max_flatten_iterations: DEFAULT_MAX_FLATTEN_ITERATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
        }
    }
}

impl ExtractConfig {
    /// Creates a new `ExtractConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether conflicts and non-empty outputs are overridden.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets whether wrapper directories are flattened.
    #[must_use]
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Sets the copy concurrency limit. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the flatten iteration cap.
    #[must_use]
    pub fn with_max_flatten_iterations(mut self, iterations: usize) -> Self {
        self.max_flatten_iterations = iterations;
        self
    }

    /// Sets the number of identification attempts. Zero is treated as one.
    #[must_use]
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Sets the in-memory spool threshold.
    #[must_use]
    pub fn with_spool_threshold(mut self, bytes: usize) -> Self {
        self.spool_threshold = bytes;
        self
    }
}
