//! ZIP archive entry source.

use std::io::Read;
use std::io::Seek;
use std::time::SystemTime;

use chrono::NaiveDate;

use crate::ExtractionError;
use crate::Result;
use crate::types::EntryKind;
use crate::types::EntryMeta;

use super::traits::EntryHandler;
use super::traits::EntrySource;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// ZIP archive entry source.
pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    /// Reads the central directory of a ZIP archive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the central directory cannot be parsed.
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(|e| {
            ExtractionError::InvalidArchive(format!("failed to open ZIP archive: {e}"))
        })?;
        Ok(Self { archive })
    }

    /// Number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn format_name(&self) -> &str {
        "zip"
    }

    fn for_each_entry(&mut self, handler: &mut EntryHandler<'_>) -> Result<()> {
        for i in 0..self.archive.len() {
            let mut entry = self.archive.by_index(i).map_err(|e| {
                ExtractionError::InvalidArchive(format!("failed to read ZIP entry: {e}"))
            })?;

            let kind = convert_zip_entry_type(entry.is_dir(), entry.unix_mode());
            let meta = EntryMeta {
                name: entry.name().to_string(),
                size: entry.size(),
                mode: entry.unix_mode().unwrap_or(match kind {
                    EntryKind::Directory => 0o755,
                    _ => 0o644,
                }),
                modified: entry.last_modified().and_then(dos_to_system_time),
                kind,
            };

            if handler(meta, &mut entry).is_break() {
                break;
            }
        }

        Ok(())
    }
}

fn convert_zip_entry_type(is_dir: bool, unix_mode: Option<u32>) -> EntryKind {
    if is_dir {
        EntryKind::Directory
    } else if unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
        EntryKind::Symlink
    } else {
        EntryKind::File
    }
}

/// Converts a DOS timestamp, read as UTC, into a `SystemTime`.
fn dos_to_system_time(dt: zip::DateTime) -> Option<SystemTime> {
    let naive = NaiveDate::from_ymd_opt(
        i32::from(dt.year()),
        u32::from(dt.month()),
        u32::from(dt.day()),
    )?
    .and_hms_opt(
        u32::from(dt.hour()),
        u32::from(dt.minute()),
        u32::from(dt.second()),
    )?;
    Some(SystemTime::from(naive.and_utc()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::ops::ControlFlow;
    use std::time::Duration;
    use zip::write::SimpleFileOptions;

    fn build_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let time = zip::DateTime::from_date_and_time(2024, 1, 2, 3, 4, 6).unwrap();
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .last_modified_time(time);

        zip.add_directory("pkg/", options).unwrap();
        zip.start_file("pkg/readme.txt", options.unix_permissions(0o640))
            .unwrap();
        std::io::Write::write_all(&mut zip, b"read me").unwrap();
        zip.add_symlink("pkg/link", "readme.txt", options).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_zip_source_reports_entries() {
        let mut source = ZipSource::new(Cursor::new(build_zip())).unwrap();
        assert_eq!(source.format_name(), "zip");
        assert_eq!(source.len(), 3);

        let mut seen = Vec::new();
        source
            .for_each_entry(&mut |meta, reader| {
                let mut content = Vec::new();
                reader.read_to_end(&mut content).unwrap();
                seen.push((meta, content));
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(seen[0].0.kind, EntryKind::Directory);
        assert_eq!(seen[1].0.name, "pkg/readme.txt");
        assert_eq!(seen[1].0.kind, EntryKind::File);
        assert_eq!(seen[1].0.mode & 0o777, 0o640);
        assert_eq!(seen[1].1, b"read me");
        assert_eq!(seen[2].0.kind, EntryKind::Symlink);
    }

    #[test]
    fn test_zip_timestamp_conversion() {
        let dt = zip::DateTime::from_date_and_time(2024, 1, 2, 3, 4, 6).unwrap();
        let expected = SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_164_646);
        assert_eq!(dos_to_system_time(dt), Some(expected));
    }

    #[test]
    fn test_zip_invalid() {
        let result = ZipSource::new(Cursor::new(b"PK\x03\x04garbage".to_vec()));
        assert!(matches!(result, Err(ExtractionError::InvalidArchive(_))));
    }

    #[test]
    fn test_zip_entry_type_mapping() {
        assert_eq!(convert_zip_entry_type(true, None), EntryKind::Directory);
        assert_eq!(convert_zip_entry_type(false, Some(0o120_777)), EntryKind::Symlink);
        assert_eq!(convert_zip_entry_type(false, Some(0o100_644)), EntryKind::File);
        assert_eq!(convert_zip_entry_type(false, None), EntryKind::File);
    }
}
