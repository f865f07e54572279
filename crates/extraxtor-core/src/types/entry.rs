//! Archive entry metadata and owned entry payloads.

use std::fmt;
use std::io::Read;
use std::time::SystemTime;

/// Kind of an entry in an archive.
///
/// # Examples
///
/// ```
/// use extraxtor_core::types::EntryKind;
///
/// assert!(EntryKind::File.is_file());
/// assert!(!EntryKind::Symlink.is_materialized());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// Symbolic link entry. Never materialized.
    Symlink,

    /// Hard links, device nodes, fifos and anything else. Never materialized.
    Other,
}

impl EntryKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a symlink.
    #[must_use]
    pub const fn is_symlink(self) -> bool {
        matches!(self, Self::Symlink)
    }

    /// Returns `true` if extraction writes something for this kind.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Metadata reported by a format adapter for one entry.
///
/// `name` is untrusted: it is archive-relative, `/`-separated and must go
/// through [`SafePath::validate`](super::SafePath::validate) before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Entry name as stored in the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Unix permission bits (and possibly file type bits).
    pub mode: u32,
    /// Modification time, when the archive records one.
    pub modified: Option<SystemTime>,
    /// Entry kind.
    pub kind: EntryKind,
}

impl EntryMeta {
    /// Creates metadata for an entry with no timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind, size: u64, mode: u32) -> Self {
        Self {
            name: name.into(),
            size,
            mode,
            modified: None,
            kind,
        }
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: Option<SystemTime>) -> Self {
        self.modified = modified;
        self
    }
}

/// An entry with an owned byte stream, handed to exactly one worker.
pub struct ArchiveEntry {
    /// Entry metadata.
    pub meta: EntryMeta,
    /// Entry payload. Empty for non-file entries.
    pub data: Box<dyn Read + Send>,
}

impl ArchiveEntry {
    /// Creates an entry with no payload.
    #[must_use]
    pub fn without_data(meta: EntryMeta) -> Self {
        Self {
            meta,
            data: Box::new(std::io::empty()),
        }
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
