//! Tar archive entry source.
//!
//! Works over any decompressing reader, so plain, gzip, bzip2, xz and zstd
//! tarballs share one implementation.

use std::io::Read;
use std::ops::ControlFlow;
use std::time::Duration;
use std::time::SystemTime;

use crate::ExtractionError;
use crate::Result;
use crate::types::EntryKind;
use crate::types::EntryMeta;

use super::traits::EntryHandler;
use super::traits::EntrySource;

/// Tar archive entry source.
pub struct TarSource<R: Read> {
    archive: tar::Archive<R>,
    format_name: &'static str,
}

impl<R: Read> TarSource<R> {
    /// Wraps an already-decompressed tar stream.
    #[must_use]
    pub fn new(reader: R, format_name: &'static str) -> Self {
        Self {
            archive: tar::Archive::new(reader),
            format_name,
        }
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn format_name(&self) -> &str {
        self.format_name
    }

    fn for_each_entry(&mut self, handler: &mut EntryHandler<'_>) -> Result<()> {
        let entries = self
            .archive
            .entries()
            .map_err(|e| ExtractionError::InvalidArchive(format!("failed to read TAR entries: {e}")))?;

        for entry_result in entries {
            let mut entry = entry_result.map_err(|e| {
                ExtractionError::InvalidArchive(format!("failed to read TAR entry: {e}"))
            })?;

            let header = entry.header();
            let kind = convert_tar_entry_type(header.entry_type());
            let meta = EntryMeta {
                name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
                size: entry.size(),
                mode: header.mode().unwrap_or(default_mode(kind)),
                modified: header
                    .mtime()
                    .ok()
                    .and_then(|t| SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(t))),
                kind,
            };

            if handler(meta, &mut entry).is_break() {
                break;
            }
        }

        Ok(())
    }
}

fn convert_tar_entry_type(entry_type: tar::EntryType) -> EntryKind {
    match entry_type {
        tar::EntryType::Directory => EntryKind::Directory,
        tar::EntryType::Symlink => EntryKind::Symlink,
        tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::GNUSparse => {
            EntryKind::File
        }
        _ => EntryKind::Other,
    }
}

const fn default_mode(kind: EntryKind) -> u32 {
    match kind {
        EntryKind::Directory => 0o755,
        _ => 0o644,
    }
}
