//! Core extraction engine.
//!
//! The calling thread drives the [`EntrySource`] and spools every entry into
//! an owned [`ArchiveEntry`]. Entries travel over a bounded channel to a
//! fixed pool of scoped worker threads, which validate paths and write
//! files. File copies are additionally gated by [`CopyPermits`].

use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::ops::ControlFlow;
use std::path::Path;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use tempfile::SpooledTempFile;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::entry::create_directory;
use super::entry::extract_file;
use super::permits::CopyPermits;
use crate::CancellationToken;
use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::config::default_parallelism;
use crate::copy::CopyBuffer;
use crate::copy::copy_cancellable;
use crate::formats::EntrySource;
use crate::stats::ExtractionStats;
use crate::types::ArchiveEntry;
use crate::types::DestDir;
use crate::types::EntryKind;
use crate::types::EntryMeta;
use crate::types::SafePath;

/// Shared state borrowed by every worker.
struct WorkerContext<'a> {
    dest: &'a DestDir,
    stats: &'a ExtractionStats,
    permits: &'a CopyPermits,
    cancel: &'a CancellationToken,
}

/// Main extraction engine.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ExtractConfig,
    workers: usize,
}

impl ExtractionEngine {
    /// Creates an engine with `min(4, available_parallelism)` workers.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            workers: default_parallelism(),
        }
    }

    /// Returns the worker pool size.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extracts every entry of `source` into `dest` and returns the report.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the source fails mid-stream and `Cancelled`
    /// if `cancel` fired. Entries already written are kept in both cases.
    pub fn extract(
        &self,
        source: &mut dyn EntrySource,
        dest: &DestDir,
        progress: &mut dyn ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<ExtractionReport> {
        let stats = ExtractionStats::new();
        self.extract_with_stats(source, dest, &stats, progress, cancel)?;
        Ok(stats.finish())
    }

    /// Like [`extract`](Self::extract), but accumulates into caller-owned
    /// statistics so later pipeline stages can add to them.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub fn extract_with_stats(
        &self,
        source: &mut dyn EntrySource,
        dest: &DestDir,
        stats: &ExtractionStats,
        progress: &mut dyn ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<()> {
        info!(
            format = source.format_name(),
            dest = %dest.as_path().display(),
            workers = self.workers,
            concurrency = self.config.concurrency,
            "extracting archive"
        );

        let permits = CopyPermits::new(self.config.concurrency);
        let ctx = WorkerContext {
            dest,
            stats,
            permits: &permits,
            cancel,
        };
        let (entries_tx, entries_rx) = crossbeam_channel::bounded::<ArchiveEntry>(self.workers);

        let produced = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|id| {
                    let rx = entries_rx.clone();
                    let ctx = &ctx;
                    scope.spawn(move || worker_loop(id, &rx, ctx))
                })
                .collect();
            drop(entries_rx);

            let produced = self.produce(source, entries_tx, progress, cancel);

            for (id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    error!(worker = id, "extraction worker panicked");
                    stats.record_error(format!("extraction worker {id} panicked"));
                }
            }
            produced
        });

        progress.on_complete();
        stats.record_peak_copies(permits.peak());

        if cancel.is_cancelled() {
            warn!("extraction cancelled");
            return Err(ExtractionError::Cancelled);
        }
        produced?;

        debug!(
            peak_copies = permits.peak(),
            errors = stats.errors_encountered(),
            "all workers joined"
        );
        Ok(())
    }

    /// Reads the source on the calling thread and dispatches owned entries.
    ///
    /// Consumes the sender so the channel closes as soon as the source is
    /// exhausted or fails.
    fn produce(
        &self,
        source: &mut dyn EntrySource,
        entries_tx: Sender<ArchiveEntry>,
        progress: &mut dyn ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut buffer = CopyBuffer::new();
        let mut dispatched = 0usize;
        let mut failure = None;

        let streamed = source.for_each_entry(&mut |meta, reader| {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }

            let entry = match spool_entry(meta, reader, self.config.spool_threshold, &mut buffer, cancel) {
                Ok(entry) => entry,
                Err(e) => {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
            };

            dispatched += 1;
            progress.on_entry_start(Path::new(&entry.meta.name), dispatched);

            if entries_tx.send(entry).is_err() {
                // Every worker is gone; nothing left to hand work to.
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        drop(entries_tx);

        debug!(entries = dispatched, "source exhausted");
        streamed?;
        failure.map_or(Ok(()), Err)
    }
}

/// Turns a borrowed entry stream into an owned, `Send` entry.
///
/// Payloads up to `threshold` bytes stay in memory, larger ones go to an
/// anonymous temp file.
fn spool_entry(
    meta: EntryMeta,
    reader: &mut dyn Read,
    threshold: usize,
    buffer: &mut CopyBuffer,
    cancel: &CancellationToken,
) -> Result<ArchiveEntry> {
    if !meta.kind.is_file() {
        return Ok(ArchiveEntry::without_data(meta));
    }

    let mut spool = SpooledTempFile::new(threshold);
    copy_cancellable(reader, &mut spool, buffer, cancel).map_err(|e| match e {
        ExtractionError::Io(io) => {
            ExtractionError::InvalidArchive(format!("failed to read entry {}: {io}", meta.name))
        }
        other => other,
    })?;
    spool.seek(SeekFrom::Start(0))?;

    Ok(ArchiveEntry {
        meta,
        data: Box::new(spool),
    })
}

fn worker_loop(id: usize, entries_rx: &Receiver<ArchiveEntry>, ctx: &WorkerContext<'_>) {
    let mut buffer = CopyBuffer::new();
    let mut handled = 0usize;

    for entry in entries_rx {
        if ctx.cancel.is_cancelled() {
            continue;
        }
        process_entry(entry, ctx, &mut buffer);
        handled += 1;
    }

    debug!(worker = id, entries = handled, "worker finished");
}

fn process_entry(mut entry: ArchiveEntry, ctx: &WorkerContext<'_>, buffer: &mut CopyBuffer) {
    let name = entry.meta.name.as_str();

    let safe_path = match SafePath::validate(Path::new(name), ctx.dest) {
        Ok(path) => path,
        Err(e) => {
            warn!(entry = name, error = %e, "skipping unsafe entry");
            ctx.stats.record_skip_with_error(e.to_string());
            return;
        }
    };
    let target = ctx.dest.join(&safe_path);

    match entry.meta.kind {
        EntryKind::Directory => {
            if safe_path.is_root() {
                debug!(entry = name, "directory entry names the output root");
                return;
            }
            match create_directory(&target) {
                Ok(()) => ctx.stats.record_dir(),
                Err(e) => {
                    warn!(entry = name, error = %e, "failed to create directory");
                    ctx.stats.record_error(format!("{name}: {e}"));
                }
            }
        }
        EntryKind::Symlink => {
            let skipped = ExtractionError::SymlinkUnsupported {
                path: safe_path.as_path().to_path_buf(),
            };
            debug!(entry = name, "{skipped}");
            ctx.stats.record_skip();
        }
        EntryKind::Other => {
            debug!(entry = name, "skipping special entry");
            ctx.stats.record_skip();
        }
        EntryKind::File => {
            if safe_path.is_root() {
                ctx.stats
                    .record_skip_with_error(format!("{name}: entry does not name a file"));
                return;
            }

            let _permit = ctx.permits.acquire();
            match extract_file(entry.data.as_mut(), &target, &entry.meta, buffer, ctx.cancel) {
                Ok(bytes) => {
                    debug!(entry = name, bytes, "extracted file");
                    ctx.stats.record_file(bytes);
                }
                Err(e) => {
                    warn!(entry = name, error = %e, "failed to extract file");
                    ctx.stats.record_error(format!("{name}: {e}"));
                }
            }
        }
    }
}
