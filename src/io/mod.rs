//! Bounded file reading for content scanning.
//!
//! `SafeFileReader` refuses files above a size ceiling before reading a
//! single byte and caps every read at a byte budget, so a file that grows
//! between the size check and the read still cannot exhaust memory.

pub mod error;

use crate::io::error::{IoError, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Largest file the string scanner will read (5 MiB).
pub const DEFAULT_MAX_SCAN_BYTES: u64 = 5 * 1024 * 1024;

/// Resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// The maximum number of bytes returned by a single read.
    pub max_read_bytes: u64,
}

impl IOLimits {
    /// Limits that admit files up to `max_bytes` and read them whole.
    pub fn whole_file(max_bytes: u64) -> Self {
        Self {
            max_file_size: max_bytes,
            max_read_bytes: max_bytes,
        }
    }
}

impl Default for IOLimits {
    fn default() -> Self {
        Self::whole_file(DEFAULT_MAX_SCAN_BYTES)
    }
}

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;

        if self.bytes_read >= self.limit {
            debug!(limit = self.limit, "BoundedReader limit reached");
        }

        Ok(n)
    }
}

/// Safe file reader with resource limits.
pub struct SafeFileReader {
    file: File,
    size: u64,
    limits: IOLimits,
}

impl SafeFileReader {
    /// Open a file with safety limits.
    ///
    /// Fails with `IoError::FileTooLarge` when the file exceeds
    /// `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(IoError::NotRegularFile);
        }
        let size = meta.len();

        debug!(
            path = %path.display(),
            size,
            max_file_size = limits.max_file_size,
            "Opening file for bounded reading"
        );

        if size > limits.max_file_size {
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: size,
            });
        }

        Ok(Self { file, size, limits })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn limits(&self) -> &IOLimits {
        &self.limits
    }

    /// Read the entire file with bounds checking.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut reader = BoundedReader::new(&mut self.file, self.limits.max_read_bytes);
        let mut data = Vec::with_capacity(self.size.min(self.limits.max_read_bytes) as usize);
        reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Get file size without opening it.
pub fn file_size<P: AsRef<Path>>(path: P) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}
