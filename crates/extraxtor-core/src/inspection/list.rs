//! Archive listing implementation.

use std::ops::ControlFlow;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::Result;
use crate::formats;
use crate::formats::detect::ArchiveType;
use crate::formats::detect::identify;
use crate::types::EntryKind;
use crate::types::EntryMeta;

/// Label shown in place of a symlink target, which is never read.
pub const SYMLINK_LABEL: &str = "<symlink>";

/// A single archive entry as reported by [`list_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Entry name as stored in the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Modification time, if the archive records one.
    pub modified: Option<SystemTime>,
    /// Entry type.
    pub kind: EntryKind,
    /// [`SYMLINK_LABEL`] for symlinks.
    pub link_name: Option<&'static str>,
}

impl ManifestEntry {
    fn from_meta(meta: EntryMeta) -> Self {
        let link_name = meta.kind.is_symlink().then_some(SYMLINK_LABEL);
        Self {
            name: meta.name,
            size: meta.size,
            mode: meta.mode,
            modified: meta.modified,
            kind: meta.kind,
            link_name,
        }
    }

    /// Returns `true` for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind.is_directory()
    }
}

/// Sorted listing of an archive's entries with totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Detected archive format.
    pub format: ArchiveType,
    /// Entries sorted by name.
    pub entries: Vec<ManifestEntry>,
    /// Number of non-directory entries.
    pub file_count: usize,
    /// Number of directory entries.
    pub dir_count: usize,
    /// Sum of the sizes of non-directory entries.
    pub total_size: u64,
    /// Number of entries of any kind.
    pub total_entries: usize,
}

impl ArchiveManifest {
    /// Creates an empty manifest for `format`.
    #[must_use]
    pub fn new(format: ArchiveType) -> Self {
        Self {
            format,
            entries: Vec::new(),
            file_count: 0,
            dir_count: 0,
            total_size: 0,
            total_entries: 0,
        }
    }

    /// Adds an entry and updates the totals.
    pub fn add_entry(&mut self, entry: ManifestEntry) {
        if entry.is_dir() {
            self.dir_count += 1;
        } else {
            self.file_count += 1;
            self.total_size += entry.size;
        }
        self.total_entries += 1;
        self.entries.push(entry);
    }
}

/// Lists archive contents without extracting.
///
/// No files are written to disk during this operation.
///
/// # Errors
///
/// Returns error if:
/// - Archive file cannot be opened
/// - Archive format is unrecognized
/// - Archive is corrupt or truncated
///
/// # Examples
///
/// ```no_run
/// use extraxtor_core::list_archive;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manifest = list_archive(Path::new("archive.tar.gz"))?;
///
/// println!("Archive contains {} entries", manifest.total_entries);
/// for entry in &manifest.entries {
///     println!("{}: {} bytes", entry.name, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive(archive_path: &Path) -> Result<ArchiveManifest> {
    let format = identify(archive_path)?;
    let mut source = formats::open_source(archive_path, format)?;
    let mut manifest = ArchiveManifest::new(format);

    source.for_each_entry(&mut |meta, _data| {
        manifest.add_entry(ManifestEntry::from_meta(meta));
        ControlFlow::Continue(())
    })?;

    manifest.entries.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        entries = manifest.total_entries,
        format = %format,
        "listed archive"
    );
    Ok(manifest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = ::tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = ::tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_list_archive_empty_tar() {
        let mut temp_file = NamedTempFile::with_suffix(".tar").unwrap();
        temp_file.write_all(&tar_bytes(&[])).unwrap();
        temp_file.flush().unwrap();

        let manifest = list_archive(temp_file.path()).unwrap();

        assert_eq!(manifest.total_entries, 0);
        assert_eq!(manifest.total_size, 0);
        assert!(manifest.entries.is_empty());
        assert_eq!(manifest.format, ArchiveType::Tar);
    }

    #[test]
    fn test_list_archive_tar_gz_sorted() {
        let mut temp_file = NamedTempFile::with_suffix(".tar.gz").unwrap();
        let tar_data = tar_bytes(&[("zeta.txt", &b"zz"[..]), ("alpha.txt", &b"a"[..])]);
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_data).unwrap();
        temp_file.write_all(&encoder.finish().unwrap()).unwrap();
        temp_file.flush().unwrap();

        let manifest = list_archive(temp_file.path()).unwrap();

        assert_eq!(manifest.format, ArchiveType::TarGz);
        assert_eq!(manifest.file_count, 2);
        assert_eq!(manifest.total_size, 3);
        let names: Vec<_> = manifest.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn test_list_archive_zip_with_dirs_and_symlink() {
        let temp_file = NamedTempFile::with_suffix(".zip").unwrap();
        let file = std::fs::File::create(temp_file.path()).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        zip.add_directory("docs/", options).unwrap();
        zip.start_file("docs/readme.md", options).unwrap();
        zip.write_all(b"# readme").unwrap();
        zip.add_symlink("docs/latest", "readme.md", options).unwrap();
        zip.finish().unwrap();

        let manifest = list_archive(temp_file.path()).unwrap();

        assert_eq!(manifest.format, ArchiveType::Zip);
        assert_eq!(manifest.total_entries, 3);
        assert_eq!(manifest.dir_count, 1);
        assert_eq!(manifest.file_count, 2);

        let link = manifest
            .entries
            .iter()
            .find(|e| e.name == "docs/latest")
            .unwrap();
        assert_eq!(link.kind, EntryKind::Symlink);
        assert_eq!(link.link_name, Some(SYMLINK_LABEL));

        let readme = manifest
            .entries
            .iter()
            .find(|e| e.name == "docs/readme.md")
            .unwrap();
        assert_eq!(readme.link_name, None);
        assert_eq!(readme.size, 8);
    }

    #[test]
    fn test_list_archive_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.tar");
        std::fs::write(&path, tar_bytes(&[("x.txt", &b"x"[..])])).unwrap();

        list_archive(&path).unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
