//! Error types for the CloudShield scanning engine.
//!
//! Only failures that make a verdict impossible are represented here. Stages
//! that degrade gracefully (metadata extraction, string scanning, alerting)
//! absorb their own errors and never surface through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for CloudShield operations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan target could not be read or stat'ed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An indicator source exists but could not be read
    #[error("Failed to load indicators from {path:?}: {source}")]
    Indicators {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The multi-pattern matcher could not be built from the indicator strings
    #[error("Indicator matcher error: {0}")]
    Matcher(String),

    /// Content could not be spooled into temporary storage
    #[error("Failed to spool scan target: {0}")]
    Intake(#[source] std::io::Error),

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Deadline exceeded
    #[error("Operation timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// A blocking worker task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for CloudShield operations
pub type Result<T> = std::result::Result<T, ScanError>;
