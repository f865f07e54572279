//! Chunked file copy with a reusable 64 KiB buffer.
//!
//! Extraction workers and the flattener's copy fallback both stream through
//! [`CopyBuffer`]; workers additionally poll a [`CancellationToken`] between
//! chunks so a cancelled run stops mid-file.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::CancellationToken;
use crate::ExtractionError;

/// Buffer size for every streaming copy (64 KiB).
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stack-allocated buffer for chunked copying.
///
/// # Examples
///
/// ```no_run
/// # use extraxtor_core::copy::{CopyBuffer, copy_with_buffer};
/// # use extraxtor_core::ExtractionError;
/// # fn example() -> Result<(), ExtractionError> {
/// let mut buffer = CopyBuffer::new();
/// let mut input = std::fs::File::open("input.txt")?;
/// let mut output = std::fs::File::create("output.txt")?;
///
/// let bytes_copied = copy_with_buffer(&mut input, &mut output, &mut buffer)?;
/// println!("Copied {} bytes", bytes_copied);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer` and returns the number of bytes copied.
///
/// # Errors
///
/// Returns `ExtractionError::Io` if reading or writing fails.
#[inline]
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, ExtractionError> {
    copy_chunks(reader, writer, buffer, || false)
}

/// Like [`copy_with_buffer`], but stops with `ExtractionError::Cancelled`
/// as soon as `cancel` fires between two chunks.
///
/// # Errors
///
/// Returns `ExtractionError::Io` if reading or writing fails and
/// `ExtractionError::Cancelled` on cancellation.
#[inline]
pub fn copy_cancellable<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    cancel: &CancellationToken,
) -> Result<u64, ExtractionError> {
    copy_chunks(reader, writer, buffer, || cancel.is_cancelled())
}

fn copy_chunks<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    is_cancelled: F,
) -> Result<u64, ExtractionError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: Fn() -> bool,
{
    let mut total: u64 = 0;

    loop {
        if is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractionError::Io(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(ExtractionError::Io)?;

        total += bytes_read as u64;
    }

    Ok(total)
}
