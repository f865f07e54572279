//! Materialization of single validated entries.
//!
//! - [`extract_file`]: streams a payload into a new file
//! - [`create_directory`]: idempotent directory creation

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use filetime::FileTime;
use tracing::debug;

use crate::CancellationToken;
use crate::Result;
use crate::copy::COPY_BUFFER_SIZE;
use crate::copy::CopyBuffer;
use crate::copy::copy_cancellable;
use crate::types::EntryMeta;

/// Writes `reader` to `target` and returns the number of bytes written.
///
/// Parent directories are created as needed and an existing file is
/// truncated. On any failure, including cancellation, the partial file is
/// removed before the error is returned. Permissions and modification time
/// are applied afterwards on a best-effort basis.
pub fn extract_file(
    reader: &mut dyn Read,
    target: &Path,
    meta: &EntryMeta,
    buffer: &mut CopyBuffer,
    cancel: &CancellationToken,
) -> Result<u64> {
    if let Some(parent) = target.parent() {
        create_dir_all(parent)?;
    }

    let file = File::create(target)?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    let copied = copy_cancellable(reader, &mut writer, buffer, cancel)
        .and_then(|n| writer.flush().map(|()| n).map_err(Into::into));
    drop(writer);

    let bytes = match copied {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(target) {
                debug!(path = %target.display(), error = %remove_err, "failed to remove partial file");
            }
            return Err(e);
        }
    };

    apply_metadata(target, meta);
    Ok(bytes)
}

/// Creates the directory at `target`. Succeeds if it already exists.
pub fn create_directory(target: &Path) -> Result<()> {
    create_dir_all(target)?;
    Ok(())
}

/// Applies `mode & 0o777 | 0o200` and the entry's mtime. Failures are logged.
fn apply_metadata(target: &Path, meta: &EntryMeta) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = (meta.mode & 0o777) | 0o200;
        if let Err(e) = std::fs::set_permissions(target, std::fs::Permissions::from_mode(mode)) {
            debug!(path = %target.display(), mode = format_args!("{mode:o}"), error = %e, "failed to set permissions");
        }
    }

    if let Some(modified) = meta.modified
        && let Err(e) = filetime::set_file_mtime(target, FileTime::from_system_time(modified))
    {
        debug!(path = %target.display(), error = %e, "failed to set modification time");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ExtractionError;
    use crate::types::EntryKind;
    use std::io::Cursor;
    use std::time::Duration;
    use std::time::SystemTime;
    use tempfile::TempDir;

    #[test]
    fn test_extract_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/c.txt");
        let meta = EntryMeta::new("a/b/c.txt", EntryKind::File, 5, 0o644);
        let mut buffer = CopyBuffer::new();

        let written = extract_file(
            &mut Cursor::new(b"hello".to_vec()),
            &target,
            &meta,
            &mut buffer,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn test_extract_file_truncates_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("f.txt");
        std::fs::write(&target, b"much longer old content").unwrap();
        let meta = EntryMeta::new("f.txt", EntryKind::File, 3, 0o644);

        extract_file(
            &mut Cursor::new(b"new".to_vec()),
            &target,
            &meta,
            &mut CopyBuffer::new(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_extract_file_cancelled_removes_partial() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("partial.bin");
        let meta = EntryMeta::new("partial.bin", EntryKind::File, 10, 0o644);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = extract_file(
            &mut Cursor::new(vec![0u8; 10]),
            &target,
            &meta,
            &mut CopyBuffer::new(),
            &cancel,
        );
        assert!(matches!(result, Err(ExtractionError::Cancelled)));
        assert!(!target.exists());
    }

    #[test]
    fn test_extract_file_applies_mtime() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("dated.txt");
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let meta = EntryMeta::new("dated.txt", EntryKind::File, 1, 0o644).with_modified(Some(when));

        extract_file(
            &mut Cursor::new(b"x".to_vec()),
            &target,
            &meta,
            &mut CopyBuffer::new(),
            &CancellationToken::new(),
        )
        .unwrap();
        let modified = std::fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(modified, when);
    }

    #[test]
    #[cfg(unix)]
    fn test_extract_file_mode_is_owner_writable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("ro.txt");
        let meta = EntryMeta::new("ro.txt", EntryKind::File, 1, 0o100_444);

        extract_file(
            &mut Cursor::new(b"x".to_vec()),
            &target,
            &meta,
            &mut CopyBuffer::new(),
            &CancellationToken::new(),
        )
        .unwrap();
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_create_directory_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("x/y");
        create_directory(&dir).unwrap();
        create_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
