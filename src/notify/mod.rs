//! Fire-and-forget threat alerts.
//!
//! A notifier's only contract is a message string. Deliveries are spawned on
//! the current tokio runtime and never awaited by the scan that triggered
//! them; failures are logged and dropped. `AlertDispatcher::drain` gives a
//! shutting-down process a bounded wait for deliveries still in flight.

#[cfg(feature = "alerts-telegram")]
pub mod telegram;

#[cfg(feature = "alerts-telegram")]
pub use telegram::TelegramNotifier;

use crate::core::ScanResult;
use crate::error::{Result, ScanError};
use crate::timeout::{with_timeout, TimeoutConfig};
use crate::triage::config::AlertConfig;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[cfg(feature = "alerts-telegram")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("alert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one alert message.
pub trait Notifier: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn send(
        &self,
        message: String,
    ) -> impl Future<Output = std::result::Result<(), NotifyError>> + Send;
}

/// Writes alerts to the log instead of an external channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: String) -> std::result::Result<(), NotifyError> {
        warn!(alert = %message, "Threat alert");
        Ok(())
    }
}

/// The configured alert channel.
#[derive(Debug, Clone)]
pub enum AlertChannel {
    #[cfg(feature = "alerts-telegram")]
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl AlertChannel {
    /// Telegram when both token and chat id are set, the log otherwise.
    pub fn from_config(config: &AlertConfig) -> Self {
        #[cfg(feature = "alerts-telegram")]
        if let Some(telegram) = TelegramNotifier::from_config(config) {
            return AlertChannel::Telegram(telegram);
        }
        #[cfg(not(feature = "alerts-telegram"))]
        let _ = config;
        AlertChannel::Log(LogNotifier)
    }
}

impl Notifier for AlertChannel {
    fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "alerts-telegram")]
            AlertChannel::Telegram(n) => n.name(),
            AlertChannel::Log(n) => n.name(),
        }
    }

    async fn send(&self, message: String) -> std::result::Result<(), NotifyError> {
        match self {
            #[cfg(feature = "alerts-telegram")]
            AlertChannel::Telegram(n) => n.send(message).await,
            AlertChannel::Log(n) => n.send(message).await,
        }
    }
}

/// Alert text for a malicious verdict.
pub fn threat_alert(result: &ScanResult) -> String {
    format!(
        "\u{26a0}\u{fe0f} THREAT DETECTED!\nFile: {}\nRisk: {}\nTime: {}",
        result.filename(),
        result.risk(),
        result.scan_time()
    )
}

/// Spawns deliveries and keeps their handles for a bounded drain.
pub struct AlertDispatcher<N> {
    notifier: Arc<N>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl<N: Notifier> AlertDispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier: Arc::new(notifier),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Queue `message` for delivery without waiting on it.
    ///
    /// Returns `false` when called outside a tokio runtime; the alert is
    /// dropped in that case.
    pub fn dispatch(&self, message: String) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                notifier = self.notifier.name(),
                "No async runtime; alert dropped"
            );
            return false;
        };
        let notifier = Arc::clone(&self.notifier);
        let task = runtime.spawn(async move {
            match notifier.send(message).await {
                Ok(()) => debug!(notifier = notifier.name(), "Alert delivered"),
                Err(e) => warn!(notifier = notifier.name(), error = %e, "Alert delivery failed"),
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(task);
        true
    }

    /// Deliveries not yet known to be finished.
    pub fn pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.len()
    }

    /// Wait for in-flight deliveries, up to `timeout`. Returns how many were
    /// awaited.
    pub async fn drain(&self, timeout: TimeoutConfig) -> Result<usize> {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };
        let count = handles.len();
        if count == 0 {
            return Ok(0);
        }
        with_timeout(timeout, async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Alert task did not complete");
                }
            }
            Ok::<_, ScanError>(count)
        })
        .await
    }
}
