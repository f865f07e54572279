//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::ExtractionSummary;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use extraxtor_core::CancellationToken;
use extraxtor_core::ExtractConfig;
use extraxtor_core::NoopProgress;
use extraxtor_core::count_entries;
use extraxtor_core::extract_archive_with_progress;
use extraxtor_core::inspection::DEFAULT_TREE_DEPTH;
use extraxtor_core::inspection::DEFAULT_TREE_ITEMS;
use extraxtor_core::inspection::DirListingEntry;
use extraxtor_core::inspection::TreeListing;
use extraxtor_core::inspection::dir_listing;
use extraxtor_core::inspection::tree_listing;
use std::env;
use std::path::Path;
use tracing::debug;
use tracing::warn;

pub fn execute(
    args: &ExtractArgs,
    verbose: bool,
    show_progress: bool,
    formatter: &dyn OutputFormatter,
    cancel: &CancellationToken,
) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let mut config = ExtractConfig::default()
        .with_force(args.force)
        .with_flatten(!args.no_flatten);
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(usize::from(concurrency));
    }

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    let total = if show_progress && CliProgress::should_show() {
        count_entries(&args.archive)
            .inspect_err(|e| debug!(error = %e, "could not count entries"))
            .ok()
    } else {
        None
    };

    let result = if let Some(total) = total {
        let mut progress = CliProgress::new(total, "Extracting");
        extract_archive_with_progress(
            &args.archive,
            Some(output_dir.as_path()),
            &config,
            &mut progress,
            cancel,
        )
    } else {
        extract_archive_with_progress(
            &args.archive,
            Some(output_dir.as_path()),
            &config,
            &mut NoopProgress,
            cancel,
        )
    };
    let report = add_archive_context(result, &args.archive)?;

    let (tree, contents) = output_listings(&output_dir, args.tree, verbose);

    formatter.format_extraction_result(&ExtractionSummary {
        archive: &args.archive,
        output_dir: &output_dir,
        report: &report,
        tree,
        contents,
    })
}

/// Reads the listing shown after the summary. A listing that cannot be read
/// is left out; the extraction itself already succeeded.
fn output_listings(
    output_dir: &Path,
    tree: bool,
    verbose: bool,
) -> (Option<TreeListing>, Option<Vec<DirListingEntry>>) {
    if tree {
        let listing = tree_listing(output_dir, DEFAULT_TREE_DEPTH, DEFAULT_TREE_ITEMS)
            .inspect_err(|e| warn!(error = %e, "failed to read extracted tree"))
            .ok();
        return (listing, None);
    }
    if verbose {
        let listing = dir_listing(output_dir)
            .inspect_err(|e| warn!(error = %e, "failed to list output directory"))
            .ok();
        return (None, listing);
    }
    (None, None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_listings_follow_flags() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();

        let (tree, contents) = output_listings(temp.path(), true, true);
        assert_eq!(tree.unwrap().entries.len(), 1);
        assert!(contents.is_none());

        let (tree, contents) = output_listings(temp.path(), false, true);
        assert!(tree.is_none());
        assert_eq!(contents.unwrap()[0].name, "a.txt");

        assert_eq!(output_listings(temp.path(), false, false), (None, None));
    }

    #[test]
    fn test_unreadable_output_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("gone");

        assert_eq!(output_listings(&gone, true, false), (None, None));
        assert_eq!(output_listings(&gone, false, true), (None, None));
    }
}
