//! Archive format detection.
//!
//! Formats are identified by magic bytes first and by file extension when
//! the header is inconclusive (old tar archives carry no signature).

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::ExtractionError;
use crate::Result;

const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xB5, 0x2F, 0xFD];
const ZIP_MAGICS: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const USTAR_MAGIC: &[u8] = b"ustar";
const USTAR_OFFSET: usize = 257;

/// Bytes read from the start of a file for sniffing.
const SNIFF_LEN: usize = 512;

/// Base delay between identification attempts; attempt `n` waits `n` times this.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// ZIP archive.
    Zip,
}

impl ArchiveType {
    /// Returns a short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::TarZst => "tar.zst",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detects the archive type from a file path's extension.
///
/// # Errors
///
/// Returns `UnsupportedFormat` if the extension is unknown.
pub fn detect_format(path: &Path) -> Result<ArchiveType> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or(ExtractionError::UnsupportedFormat)?;

    match extension.to_ascii_lowercase().as_str() {
        "tar" => Ok(ArchiveType::Tar),
        "gz" | "tgz" => Ok(ArchiveType::TarGz),
        "bz2" | "tbz" | "tbz2" => Ok(ArchiveType::TarBz2),
        "xz" | "txz" => Ok(ArchiveType::TarXz),
        "zst" | "tzst" => Ok(ArchiveType::TarZst),
        "zip" => Ok(ArchiveType::Zip),
        _ => Err(ExtractionError::UnsupportedFormat),
    }
}

/// Identifies a format from the leading bytes of a file.
#[must_use]
pub fn sniff_format(header: &[u8]) -> Option<ArchiveType> {
    if header.starts_with(GZIP_MAGIC) {
        Some(ArchiveType::TarGz)
    } else if header.starts_with(BZIP2_MAGIC) {
        Some(ArchiveType::TarBz2)
    } else if header.starts_with(XZ_MAGIC) {
        Some(ArchiveType::TarXz)
    } else if header.starts_with(ZSTD_MAGIC) {
        Some(ArchiveType::TarZst)
    } else if ZIP_MAGICS.iter().any(|magic| header.starts_with(magic)) {
        Some(ArchiveType::Zip)
    } else if header
        .get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len())
        .is_some_and(|magic| magic == USTAR_MAGIC)
    {
        Some(ArchiveType::Tar)
    } else {
        None
    }
}

/// Identifies the format of the archive at `path`.
///
/// The file handle used for sniffing is closed before returning; extraction
/// re-opens the input.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `UnsupportedFormat` if
/// neither the header nor the extension is recognized.
pub fn identify(path: &Path) -> Result<ArchiveType> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;

    if let Some(format) = sniff_format(&header) {
        debug!(format = %format, "format identified from header");
        return Ok(format);
    }

    let format = detect_format(path)?;
    debug!(format = %format, "format identified from extension");
    Ok(format)
}

/// Calls [`identify`] up to `attempts` times with linear backoff.
///
/// # Errors
///
/// Returns the error of the last attempt.
pub fn identify_with_retry(path: &Path, attempts: usize) -> Result<ArchiveType> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match identify(path) {
            Ok(format) => return Ok(format),
            Err(e) if attempt < attempts => {
                warn!(attempt, max = attempts, error = %e, "format identification failed, retrying");
                std::thread::sleep(RETRY_BACKOFF * u32::try_from(attempt).unwrap_or(u32::MAX));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
