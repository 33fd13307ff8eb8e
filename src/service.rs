//! Async scanning service: intake, analysis on blocking workers, alerts.
//!
//! The service owns the shared indicator set and configuration. Each scan
//! runs the synchronous analyzer on tokio's blocking pool so file I/O never
//! stalls the runtime; a malicious verdict queues an alert that the scan does
//! not wait for.

use crate::core::{ScanResult, ScanTarget, UNKNOWN_FILENAME};
use crate::error::{Result, ScanError};
use crate::indicators::IndicatorSet;
use crate::metadata::MetadataRegistry;
use crate::notify::{threat_alert, AlertChannel, AlertDispatcher, Notifier};
use crate::timeout::TimeoutConfig;
use crate::triage::config::ScanConfig;
use crate::triage::Analyzer;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

const SPOOL_PREFIX: &str = "cloudshield-";

pub struct ScanService<N = AlertChannel> {
    indicators: Arc<IndicatorSet>,
    config: Arc<ScanConfig>,
    metadata: Arc<MetadataRegistry>,
    alerts: AlertDispatcher<N>,
}

impl ScanService<AlertChannel> {
    /// Alerts go to Telegram when configured, to the log otherwise.
    pub fn from_config(indicators: Arc<IndicatorSet>, config: ScanConfig) -> Self {
        let channel = AlertChannel::from_config(&config.alerts);
        Self::new(indicators, config, channel)
    }
}

impl<N: Notifier> ScanService<N> {
    pub fn new(indicators: Arc<IndicatorSet>, config: ScanConfig, notifier: N) -> Self {
        Self {
            indicators,
            config: Arc::new(config),
            metadata: Arc::new(MetadataRegistry::with_defaults()),
            alerts: AlertDispatcher::new(notifier),
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataRegistry) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn alerts(&self) -> &AlertDispatcher<N> {
        &self.alerts
    }

    /// Scan an existing file. The caller keeps ownership of the path; the
    /// declared name defaults to its basename.
    pub async fn scan_path(
        &self,
        path: impl Into<PathBuf>,
        filename: Option<String>,
    ) -> Result<ScanResult> {
        let target = match filename {
            Some(name) => ScanTarget::new(path, name),
            None => ScanTarget::from_path(path),
        };
        self.scan_target(target).await
    }

    pub async fn scan_target(&self, target: ScanTarget) -> Result<ScanResult> {
        self.run(move |analyzer| analyzer.analyze_target(&target))
            .await
    }

    /// Spool `bytes` into a temporary file and scan it. The file is removed
    /// whether or not the analysis succeeds.
    pub async fn scan_bytes(&self, bytes: Vec<u8>, filename: Option<String>) -> Result<ScanResult> {
        let filename = filename.unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
        self.run(move |analyzer| {
            let spooled = spool(&mut bytes.as_slice())?;
            analyzer.analyze(spooled.path(), &filename)
        })
        .await
    }

    /// Like `scan_bytes`, reading the content from a stream.
    pub async fn scan_reader<R>(&self, mut reader: R, filename: Option<String>) -> Result<ScanResult>
    where
        R: Read + Send + 'static,
    {
        let filename = filename.unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
        self.run(move |analyzer| {
            let spooled = spool(&mut reader)?;
            analyzer.analyze(spooled.path(), &filename)
        })
        .await
    }

    /// Wait for queued alerts, bounded by `alerts.drain_timeout_secs`.
    pub async fn shutdown(&self) -> Result<usize> {
        let timeout = TimeoutConfig::new(self.config.alerts.drain_timeout_secs, "alert_drain");
        self.alerts.drain(timeout).await
    }

    async fn run<F>(&self, job: F) -> Result<ScanResult>
    where
        F: FnOnce(&Analyzer<'_>) -> Result<ScanResult> + Send + 'static,
    {
        let indicators = Arc::clone(&self.indicators);
        let config = Arc::clone(&self.config);
        let metadata = Arc::clone(&self.metadata);
        let result = tokio::task::spawn_blocking(move || {
            let analyzer = Analyzer::with_config(&indicators, &config).with_metadata(&metadata);
            job(&analyzer)
        })
        .await
        .map_err(|e| crate::log_error!(ScanError::Task(e.to_string()), "scan worker"))??;

        if result.is_malicious() {
            self.alerts.dispatch(threat_alert(&result));
        }
        Ok(result)
    }
}

/// Copy `reader` into a fresh temporary file, deleted when dropped.
fn spool<R: Read + ?Sized>(reader: &mut R) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(SPOOL_PREFIX)
        .tempfile()
        .map_err(ScanError::Intake)?;
    let written = io::copy(reader, &mut file).map_err(ScanError::Intake)?;
    file.flush().map_err(ScanError::Intake)?;
    debug!(path = %file.path().display(), bytes = written, "Spooled scan target");
    Ok(file)
}
