//! Content hashing for scan targets.
//!
//! Files are digested in fixed-size chunks so memory use stays flat no matter
//! how large the upload is.

use crate::error::{Result, ScanError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read size used when hashing files.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes the SHA-256 digest of everything `reader` yields, `chunk_size` bytes at a time.
pub fn sha256_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Computes the SHA-256 digest of a file.
///
/// Any failure to open or read the file is fatal for the caller; no partial
/// digest is ever returned.
pub fn sha256_file(path: &Path, chunk_size: usize) -> Result<String> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    sha256_reader(file, chunk_size).map_err(|e| ScanError::io(path, e))
}
