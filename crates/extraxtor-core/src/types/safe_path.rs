//! Validated safe path type for archive extraction.

use crate::ExtractionError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A validated, normalized relative path that stays inside a [`DestDir`].
///
/// `SafePath` represents an entry name that has been validated to not
/// contain:
/// - Parent directory segments (`..`)
/// - Null bytes
/// - Root or drive prefixes (absolute paths)
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - `dest.join(&safe)` resolves within the destination directory, including
///   through symlinks that already exist under it
/// - `.` segments are removed; an empty `SafePath` denotes the root itself
///
/// # Examples
///
/// ```no_run
/// use extraxtor_core::types::DestDir;
/// use extraxtor_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp")?;
///
/// let safe = SafePath::validate(Path::new("foo/bar.txt"), &dest)?;
/// assert_eq!(safe.as_path(), Path::new("foo/bar.txt"));
///
/// assert!(SafePath::validate(Path::new("../etc/passwd"), &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an untrusted entry name against `dest`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject null bytes
    /// 2. Reject root, drive prefix and `..` components
    /// 3. Drop `.` components
    /// 4. Canonicalize the deepest existing ancestor of the joined path and
    ///    require it to stay under `dest`
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::PathTraversal` if any step fails, and
    /// `ExtractionError::Io` if an existing ancestor cannot be canonicalized.
    pub fn validate(path: &Path, dest: &DestDir) -> Result<Self> {
        let traversal = || ExtractionError::PathTraversal {
            path: path.to_path_buf(),
        };

        if has_null_bytes(path) {
            return Err(traversal());
        }

        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(traversal());
                }
            }
        }

        let resolved = dest.as_path().join(&normalized);
        let anchor = deepest_existing(&resolved, dest.as_path());
        let canonical = anchor.canonicalize()?;
        if !canonical.starts_with(dest.as_path()) {
            return Err(traversal());
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the path names the destination root itself.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

/// Walks up from `path` until an existing ancestor is found, stopping at `root`.
fn deepest_existing<'a>(path: &'a Path, root: &'a Path) -> &'a Path {
    let mut current = path;
    while current != root {
        if std::fs::symlink_metadata(current).is_ok() {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    root
}

#[inline]
fn has_null_bytes(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().contains(&0)
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
