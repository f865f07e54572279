//! High-level public API for archive extraction.

use std::path::Path;

use tracing::debug;
use tracing::info;

use crate::CancellationToken;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::flatten::Flattener;
use crate::flatten::move_contents;
use crate::formats;
use crate::formats::detect::identify_with_retry;
use crate::staging::StagingDir;
use crate::stats::ExtractionStats;
use crate::types::DestDir;
use crate::validation::validate_paths;

/// Extracts an archive into `output` (the current directory if `None`).
///
/// The format is identified from the file name, falling back to the
/// leading bytes. With [`ExtractConfig::flatten`] set, the archive is first
/// extracted into a private staging directory, redundant wrapper
/// directories are collapsed there, and the result is moved into `output`.
///
/// Per-entry failures are recorded in the returned report and do not fail
/// the run.
///
/// # Errors
///
/// Returns an error if:
/// - The input or output path fails validation
/// - The archive format cannot be identified
/// - The output or staging directory cannot be created
/// - The archive is corrupt or truncated
///
/// # Examples
///
/// ```no_run
/// use extraxtor_core::ExtractConfig;
/// use extraxtor_core::extract_archive;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive(
///     Path::new("release.tar.gz"),
///     Some(Path::new("/tmp/release")),
///     &ExtractConfig::default(),
/// )?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive(
    input: &Path,
    output: Option<&Path>,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    extract_archive_with_progress(
        input,
        output,
        config,
        &mut NoopProgress,
        &CancellationToken::new(),
    )
}

/// Like [`extract_archive`], reporting per-entry progress and honoring
/// `cancel`.
///
/// A cancelled run returns `ExtractionError::Cancelled`. When staging is
/// used, the staging directory is removed and `output` receives nothing.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_archive_with_progress(
    input: &Path,
    output: Option<&Path>,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<ExtractionReport> {
    let paths = validate_paths(input, output, config.force)?;
    let format = identify_with_retry(&paths.input, config.max_retries)?;
    info!(
        input = %paths.input.display(),
        output = %paths.output.display(),
        format = %format,
        "starting extraction"
    );

    std::fs::create_dir_all(&paths.output)?;
    let output = DestDir::new(&paths.output)?;

    let stats = ExtractionStats::new();
    let engine = ExtractionEngine::new(config.clone());
    let mut source = formats::open_source(&paths.input, format)?;

    if config.flatten {
        let staging = StagingDir::new()?;
        let staging_root = staging.dest_dir()?;
        engine.extract_with_stats(source.as_mut(), &staging_root, &stats, progress, cancel)?;

        let outcome = Flattener::new(config.force, config.max_flatten_iterations)
            .flatten(staging_root.as_path());
        stats.set_dirs_flattened(outcome.dirs_flattened);
        for warning in outcome.warnings {
            stats.record_warning(warning);
        }
        if outcome.hit_iteration_cap {
            stats.record_warning(format!(
                "stopped flattening after {} iterations",
                config.max_flatten_iterations
            ));
        }

        let moved = move_contents(staging_root.as_path(), output.as_path(), config.force)?;
        for name in &moved.skipped {
            stats.record_warning(format!("destination exists, skipped: {name}"));
        }
        for failure in moved.failed {
            stats.record_error(format!("failed to move {failure}"));
        }
        debug!(moved = moved.moved, "moved staged contents");
    } else {
        engine.extract_with_stats(source.as_mut(), &output, &stats, progress, cancel)?;
    }

    let report = stats.finish();
    info!(
        files = report.files_extracted,
        dirs = report.dirs_created,
        bytes = report.bytes_extracted,
        flattened = report.dirs_flattened,
        skipped = report.files_skipped,
        errors = report.errors_encountered,
        duration_ms = report.duration.as_millis(),
        "extraction complete"
    );
    Ok(report)
}

/// Counts the entries of an archive without extracting it.
///
/// # Errors
///
/// Returns an error if the format cannot be identified or the archive
/// cannot be read to the end.
pub fn count_entries(input: &Path) -> Result<usize> {
    let format = identify_with_retry(input, 1)?;
    formats::count_entries(input, format)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ExtractionError;
    use crate::ValidationError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_tar(dir: &Path, name: &str, entries: &[(&str, Option<&str>)]) -> PathBuf {
        let path = dir.join(name);
        let mut builder = tar::Builder::new(fs::File::create(&path).unwrap());
        for (entry_name, data) in entries {
            let mut header = tar::Header::new_gnu();
            match data {
                Some(data) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_size(data.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, entry_name, data.as_bytes())
                        .unwrap();
                }
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, entry_name, std::io::empty())
                        .unwrap();
                }
            }
        }
        builder.finish().unwrap();
        path
    }

    #[test]
    fn test_extract_flattens_single_wrapper() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(
            temp.path(),
            "wrapped.tar",
            &[("a/", None), ("a/b.txt", Some("bee"))],
        );
        let out = temp.path().join("out");

        let report = extract_archive(&archive, Some(out.as_path()), &ExtractConfig::default()).unwrap();

        assert_eq!(report.dirs_flattened, 1);
        assert_eq!(report.files_extracted, 1);
        assert_eq!(fs::read(out.join("b.txt")).unwrap(), b"bee");
        assert!(!out.join("a").exists());
    }

    #[test]
    fn test_extract_without_flatten_keeps_layout() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(temp.path(), "wrapped.tar", &[("a/b.txt", Some("bee"))]);
        let out = temp.path().join("out");

        let config = ExtractConfig::default().with_flatten(false);
        let report = extract_archive(&archive, Some(out.as_path()), &config).unwrap();

        assert_eq!(report.dirs_flattened, 0);
        assert!(out.join("a/b.txt").is_file());
    }

    #[test]
    fn test_extract_two_top_level_files_not_flattened() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(
            temp.path(),
            "flat.tar",
            &[("one.txt", Some("1")), ("two.txt", Some("2"))],
        );
        let out = temp.path().join("out");

        let report = extract_archive(&archive, Some(out.as_path()), &ExtractConfig::default()).unwrap();

        assert_eq!(report.dirs_flattened, 0);
        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.bytes_extracted, 2);
    }

    #[test]
    fn test_extract_traversal_entry_recorded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evil.tar");
        {
            // tar::Builder refuses `..`, so write the name into the header directly.
            let mut builder = tar::Builder::new(fs::File::create(&path).unwrap());
            let mut header = tar::Header::new_gnu();
            header.as_gnu_mut().unwrap().name[..13].copy_from_slice(b"../escape.txt");
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(4);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, &b"evil"[..]).unwrap();
            let mut ok = tar::Header::new_gnu();
            ok.set_size(2);
            ok.set_mode(0o644);
            ok.set_cksum();
            builder.append_data(&mut ok, "ok.txt", &b"ok"[..]).unwrap();
            builder.finish().unwrap();
        }
        let out = temp.path().join("out");

        let report = extract_archive(&path, Some(out.as_path()), &ExtractConfig::default()).unwrap();

        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.errors_encountered, 1);
        assert!(!temp.path().join("escape.txt").exists());
        assert!(out.join("ok.txt").is_file());
    }

    #[test]
    fn test_extract_rejects_non_empty_output_without_force() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(temp.path(), "a.tar", &[("x.txt", Some("x"))]);
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("existing.txt"), b"keep").unwrap();

        let err = extract_archive(&archive, Some(out.as_path()), &ExtractConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Validation(ValidationError::OutputNotEmpty { .. })
        ));

        let config = ExtractConfig::default().with_force(true);
        let report = extract_archive(&archive, Some(out.as_path()), &config).unwrap();
        assert_eq!(report.files_extracted, 1);
        assert!(out.join("existing.txt").is_file());
    }

    #[test]
    fn test_extract_unidentifiable_input() {
        let temp = TempDir::new().unwrap();
        let bogus = temp.path().join("notes.txt");
        fs::write(&bogus, b"just some text").unwrap();

        let config = ExtractConfig::default().with_max_retries(1);
        let err = extract_archive(&bogus, Some(temp.path().join("out").as_path()), &config).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat));
    }

    #[test]
    fn test_extract_cancelled_leaves_output_empty() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(temp.path(), "a.tar", &[("x.txt", Some("x"))]);
        let out = temp.path().join("out");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = extract_archive_with_progress(
            &archive,
            Some(out.as_path()),
            &ExtractConfig::default(),
            &mut NoopProgress,
            &cancel,
        )
        .unwrap_err();

        assert!(matches!(err, ExtractionError::Cancelled));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_count_entries() {
        let temp = TempDir::new().unwrap();
        let archive = write_tar(
            temp.path(),
            "c.tar",
            &[("d/", None), ("d/1", Some("1")), ("d/2", Some("2"))],
        );
        assert_eq!(count_entries(&archive).unwrap(), 3);
    }
}
