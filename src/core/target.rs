//! What gets scanned.

use std::path::{Path, PathBuf};

/// Declared name used when neither the caller nor the path provides one.
pub const UNKNOWN_FILENAME: &str = "unknown_file";

/// Materialized content plus the name the caller declared for it.
///
/// The declared filename drives extension classification and metadata
/// dispatch; it need not match the path (uploads land in temp files with
/// random names). The path must stay readable for the duration of the
/// analysis and its lifetime belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub filename: String,
}

impl ScanTarget {
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
        }
    }

    /// Target whose declared name is the path's final component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = basename_or_unknown(&path);
        Self { path, filename }
    }
}

fn basename_or_unknown(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_FILENAME.to_string())
}
