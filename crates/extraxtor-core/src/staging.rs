//! Private scratch directory for staged extraction.

use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::Result;
use crate::types::DestDir;

const STAGING_PREFIX: &str = "extraxtor-";

/// A uniquely named directory under the system temp dir.
///
/// The directory and everything in it is removed when the value is dropped,
/// whichever way the owning scope exits.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Creates a new staging directory in the system temp dir.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?;
        debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The staging directory as an extraction root.
    pub fn dest_dir(&self) -> Result<DestDir> {
        DestDir::new(self.dir.path())
    }
}

impl AsRef<Path> for StagingDir {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_is_unique_and_prefixed() {
        let a = StagingDir::new().unwrap();
        let b = StagingDir::new().unwrap();
        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(STAGING_PREFIX));
    }

    #[test]
    fn test_staging_removed_on_drop() {
        let staging = StagingDir::new().unwrap();
        let path = staging.path().to_path_buf();
        std::fs::create_dir_all(path.join("nested/deeper")).unwrap();
        std::fs::write(path.join("nested/file.txt"), b"x").unwrap();

        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn test_staging_dest_dir_is_canonical() {
        let staging = StagingDir::new().unwrap();
        let dest = staging.dest_dir().unwrap();
        assert_eq!(dest.as_path(), staging.path().canonicalize().unwrap());
    }
}
