//! Listings of an extracted directory tree.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::debug;
use walkdir::WalkDir;

use crate::Result;

/// Default deepest level shown by [`tree_listing`], counted from zero.
pub const DEFAULT_TREE_DEPTH: usize = 4;

/// Default number of items shown by [`tree_listing`].
pub const DEFAULT_TREE_ITEMS: usize = 50;

/// One line of a [`TreeListing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the listed root.
    pub path: PathBuf,
    /// Nesting level; top-level items are at depth 0.
    pub depth: usize,
    /// Whether the item is a directory.
    pub is_dir: bool,
}

impl TreeEntry {
    /// Final path component, for display.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

/// Depth- and count-limited view of a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    /// Items in path order.
    pub entries: Vec<TreeEntry>,
    /// Items within the depth limit that were cut by the item limit.
    pub hidden: usize,
}

/// A top-level item of a directory, as returned by [`dir_listing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListingEntry {
    /// File name.
    pub name: String,
    /// Permission bits (`0` where unavailable).
    pub mode: u32,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Whether the item is a directory.
    pub is_dir: bool,
}

/// Walks `root` and returns at most `max_items` entries no deeper than
/// `max_depth`, sorted by relative path.
///
/// Items beyond `max_items` are only counted. Unreadable directories and
/// entries are left out with a debug log.
///
/// # Errors
///
/// Returns an error if `root` itself cannot be read.
pub fn tree_listing(root: &Path, max_depth: usize, max_items: usize) -> Result<TreeListing> {
    std::fs::read_dir(root)?;

    let mut listing = TreeListing::default();
    // Sorted siblings in pre-order match component-wise path order.
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth + 1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable tree entry");
                continue;
            }
        };
        if listing.entries.len() >= max_items {
            listing.hidden += 1;
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        listing.entries.push(TreeEntry {
            path: relative.to_path_buf(),
            depth: entry.depth() - 1,
            is_dir: entry.file_type().is_dir(),
        });
    }

    Ok(listing)
}

/// Lists the direct children of `root`, sorted by name.
///
/// Children whose metadata cannot be read are left out.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn dir_listing(root: &Path) -> Result<Vec<DirListingEntry>> {
    let mut listing = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(dir = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        listing.push(DirListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            mode: permission_bits(&metadata),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
        });
    }

    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
