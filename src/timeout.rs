//! Deadline utilities for work that runs outside the detection core.
//!
//! The core itself defines no timeouts; callers use these helpers to bound
//! waits such as draining in-flight alert deliveries at shutdown.

use crate::error::{Result, ScanError};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Timeout configuration for an awaited operation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Whether to log timeout warnings
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    /// Disable the warning emitted on expiry.
    pub fn quiet(mut self) -> Self {
        self.log_warnings = false;
        self
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        operation = %config.operation_name,
        timeout_ms = config.duration.as_millis() as u64,
        "Starting operation with timeout"
    );

    match timeout(config.duration, future).await {
        Ok(result) => {
            debug!(operation = %config.operation_name, "Operation completed");
            result
        }
        Err(_) => {
            if config.log_warnings {
                warn!(
                    operation = %config.operation_name,
                    seconds = config.duration.as_secs(),
                    "Operation timed out"
                );
            }
            Err(ScanError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}
