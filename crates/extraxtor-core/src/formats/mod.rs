//! Archive format detection and entry sources.

pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::ExtractionError;
use crate::Result;

pub use self::detect::ArchiveType;
pub use self::detect::detect_format;
pub use self::detect::identify;
pub use self::detect::identify_with_retry;
pub use self::tar::TarSource;
pub use self::traits::EntryHandler;
pub use self::traits::EntrySource;
pub use self::zip::ZipSource;

/// Opens `path` as an entry source of the given format.
///
/// # Errors
///
/// Returns `Io` if the file cannot be opened and `InvalidArchive` if the
/// decoder rejects the stream header.
pub fn open_source(path: &Path, format: ArchiveType) -> Result<Box<dyn EntrySource>> {
    let reader = BufReader::new(File::open(path)?);
    let name = format.name();

    let source: Box<dyn EntrySource> = match format {
        ArchiveType::Tar => Box::new(TarSource::new(reader, name)),
        ArchiveType::TarGz => Box::new(TarSource::new(GzDecoder::new(reader), name)),
        ArchiveType::TarBz2 => Box::new(TarSource::new(BzDecoder::new(reader), name)),
        ArchiveType::TarXz => Box::new(TarSource::new(XzDecoder::new(reader), name)),
        ArchiveType::TarZst => {
            let decoder = zstd::stream::read::Decoder::with_buffer(reader).map_err(|e| {
                ExtractionError::InvalidArchive(format!("failed to create zstd decoder: {e}"))
            })?;
            Box::new(TarSource::new(decoder, name))
        }
        ArchiveType::Zip => Box::new(ZipSource::new(reader)?),
    };

    Ok(source)
}

/// Counts the entries of an archive without writing anything.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or decoded.
pub fn count_entries(path: &Path, format: ArchiveType) -> Result<usize> {
    let mut source = open_source(path, format)?;
    let mut count = 0;
    source.for_each_entry(&mut |_, _: &mut dyn Read| {
        count += 1;
        ControlFlow::Continue(())
    })?;
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn tar_bytes() -> Vec<u8> {
        let mut builder = ::tar::Builder::new(Vec::new());
        for name in ["a.txt", "b.txt"] {
            let mut header = ::tar::Header::new_gnu();
            header.set_size(1);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, &b"x"[..]).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_open_plain_tar() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.tar");
        std::fs::write(&path, tar_bytes()).unwrap();

        let source = open_source(&path, ArchiveType::Tar).unwrap();
        assert_eq!(source.format_name(), "tar");
        assert_eq!(count_entries(&path, ArchiveType::Tar).unwrap(), 2);
    }

    #[test]
    fn test_open_tar_gz() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.tar.gz");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let format = identify(&path).unwrap();
        assert_eq!(format, ArchiveType::TarGz);
        assert_eq!(count_entries(&path, format).unwrap(), 2);
    }

    #[test]
    fn test_open_tar_zst() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.tar.zst");
        std::fs::write(&path, zstd::encode_all(&tar_bytes()[..], 3).unwrap()).unwrap();

        let format = identify(&path).unwrap();
        assert_eq!(format, ArchiveType::TarZst);
        assert_eq!(count_entries(&path, format).unwrap(), 2);
    }

    #[test]
    fn test_open_tar_bz2() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.tar.bz2");
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(&tar_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        assert_eq!(count_entries(&path, identify(&path).unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_corrupt_gzip_is_invalid_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.tar.gz");
        // Valid gzip header followed by a deflate block with a reserved type.
        let mut data = vec![0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF];
        data.extend_from_slice(&[0xFF; 16]);
        std::fs::write(&path, data).unwrap();

        let result = count_entries(&path, ArchiveType::TarGz);
        assert!(matches!(result, Err(ExtractionError::InvalidArchive(_))));
    }
}
