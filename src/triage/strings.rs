//! Indicator substring scanning.
//!
//! Content is read whole (under a size ceiling), decoded lossily as UTF-8,
//! lowercased and matched against every indicator substring in one pass.
//!
//! Known limitation: binary files are scanned as their lossy text
//! projection. An indicator split by an invalid byte sequence, or stored as
//! UTF-16, is not found.

use crate::indicators::IndicatorSet;
use crate::io::error::IoError;
use crate::io::{IOLimits, SafeFileReader};
use std::path::Path;
use tracing::{debug, warn};

/// Pluggable string-scanning stage of the analysis pipeline.
pub trait StringScanner: Send + Sync {
    /// Matched indicator strings, in the indicator set's order. Never fails:
    /// oversized or unreadable files produce an empty list.
    fn scan(&self, path: &Path, indicators: &IndicatorSet, max_size_bytes: u64) -> Vec<String>;
}

/// The standard scanner backed by the indicator set's matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorScanner;

impl StringScanner for IndicatorScanner {
    fn scan(&self, path: &Path, indicators: &IndicatorSet, max_size_bytes: u64) -> Vec<String> {
        scan_file(path, indicators, max_size_bytes)
    }
}

/// Scan a file for indicator substrings.
///
/// Files larger than `max_size_bytes` are skipped entirely; there is no
/// partial scan.
pub fn scan_file(path: &Path, indicators: &IndicatorSet, max_size_bytes: u64) -> Vec<String> {
    if indicators.bad_strings().is_empty() {
        return Vec::new();
    }

    let data = match SafeFileReader::open(path, IOLimits::whole_file(max_size_bytes))
        .and_then(|mut reader| reader.read_all())
    {
        Ok(data) => data,
        Err(IoError::FileTooLarge { limit, found }) => {
            debug!(
                path = %path.display(),
                size = found,
                limit,
                "Skipping string scan for oversized file"
            );
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "String scan read failed");
            return Vec::new();
        }
    };

    scan_bytes(&data, indicators)
}

/// Match indicator substrings against raw bytes.
pub fn scan_bytes(data: &[u8], indicators: &IndicatorSet) -> Vec<String> {
    let text = String::from_utf8_lossy(data).to_lowercase();
    indicators
        .find_bad_strings(&text)
        .into_iter()
        .map(str::to_owned)
        .collect()
}
