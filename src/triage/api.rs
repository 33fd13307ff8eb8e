//! The per-file analysis pipeline.
//!
//! Stages run in a fixed order: extension, hash, strings, metadata. Only
//! hashing (and the final size lookup) can fail the call; every other stage
//! degrades to "no finding".

use crate::core::scan_result::timestamp_now;
use crate::core::{Metadata, ScanResult, ScanTarget};
use crate::error::{Result, ScanError};
use crate::hashing::{sha256_file, DEFAULT_CHUNK_SIZE};
use crate::indicators::IndicatorSet;
use crate::io::{file_size, DEFAULT_MAX_SCAN_BYTES};
use crate::metadata::MetadataRegistry;
use crate::triage::config::ScanConfig;
use crate::triage::extension::{extension_of, normalized_extension};
use crate::triage::score::{Finding, RiskAssessment};
use crate::triage::strings::{IndicatorScanner, StringScanner};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Tunables for one analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerSettings {
    pub chunk_size: usize,
    pub max_scan_bytes: u64,
    pub metadata_enabled: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
            metadata_enabled: true,
        }
    }
}

impl From<&ScanConfig> for AnalyzerSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            chunk_size: config.hashing.chunk_size,
            max_scan_bytes: config.strings.max_scan_bytes,
            metadata_enabled: config.metadata.enabled,
        }
    }
}

/// Runs the detection pipeline against a borrowed indicator set.
///
/// Holds no mutable state, so one analyzer may serve any number of
/// concurrent calls.
pub struct Analyzer<'a, S = IndicatorScanner> {
    indicators: &'a IndicatorSet,
    metadata: &'a MetadataRegistry,
    settings: AnalyzerSettings,
    scanner: S,
}

impl<'a> Analyzer<'a> {
    /// Default settings and the process-wide metadata readers.
    pub fn new(indicators: &'a IndicatorSet) -> Self {
        Self {
            indicators,
            metadata: MetadataRegistry::global(),
            settings: AnalyzerSettings::default(),
            scanner: IndicatorScanner,
        }
    }

    pub fn with_config(indicators: &'a IndicatorSet, config: &ScanConfig) -> Self {
        Self::new(indicators).with_settings(AnalyzerSettings::from(config))
    }
}

impl<'a, S: StringScanner> Analyzer<'a, S> {
    pub fn with_settings(mut self, settings: AnalyzerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metadata(mut self, metadata: &'a MetadataRegistry) -> Self {
        self.metadata = metadata;
        self
    }

    /// Swap the string-scanning stage.
    pub fn with_scanner<T: StringScanner>(self, scanner: T) -> Analyzer<'a, T> {
        Analyzer {
            indicators: self.indicators,
            metadata: self.metadata,
            settings: self.settings,
            scanner,
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Analyze the file at `path` under the declared `filename`.
    ///
    /// Fails only when the file cannot be hashed or sized.
    pub fn analyze(&self, path: &Path, filename: &str) -> Result<ScanResult> {
        let span = crate::span_trace!("analyze", filename = %filename);
        let _guard = span.enter();

        let mut assessment = RiskAssessment::new();

        let extension = normalized_extension(filename);
        if self.indicators.contains_extension(&extension) {
            assessment.record(Finding::DangerousExtension(
                extension_of(filename).to_string(),
            ));
        }
        debug!(extension = %extension, risk = %assessment.risk(), "Extension checked");

        let hash = sha256_file(path, self.settings.chunk_size)?;
        if self.indicators.contains_hash(&hash) {
            assessment.record(Finding::KnownBadHash);
        }
        debug!(hash = %hash, risk = %assessment.risk(), "Hash checked");

        if assessment.is_critical() {
            debug!("Risk is critical; skipping string scan");
        } else {
            let matches = self
                .scanner
                .scan(path, self.indicators, self.settings.max_scan_bytes);
            debug!(matches = matches.len(), "Strings scanned");
            for m in matches {
                assessment.record(Finding::SuspiciousString(m));
            }
        }

        let metadata = self.extract_metadata(path, filename, &extension);

        let file_size = file_size(path).map_err(|e| ScanError::io(path, e))?;
        let (risk, findings) = assessment.into_parts();
        let result = ScanResult::new(
            filename.to_string(),
            hash,
            findings,
            risk,
            timestamp_now(),
            file_size,
            metadata,
        );
        info!(
            filename = %result.filename(),
            malicious = result.is_malicious(),
            risk = %result.risk(),
            findings = result.findings().len(),
            "Analysis complete"
        );
        Ok(result)
    }

    pub fn analyze_target(&self, target: &ScanTarget) -> Result<ScanResult> {
        self.analyze(&target.path, &target.filename)
    }

    /// Analyze targets in parallel; results keep the input order.
    pub fn analyze_many(&self, targets: &[ScanTarget]) -> Vec<Result<ScanResult>> {
        targets
            .par_iter()
            .map(|target| self.analyze_target(target))
            .collect()
    }

    fn extract_metadata(&self, path: &Path, filename: &str, extension: &str) -> Metadata {
        if !self.settings.metadata_enabled || !self.metadata.supports(extension) {
            return Metadata::new();
        }
        self.metadata.extract(path, filename)
    }
}

/// Analyze one file with default settings.
pub fn analyze(indicators: &IndicatorSet, path: &Path, filename: &str) -> Result<ScanResult> {
    Analyzer::new(indicators).analyze(path, filename)
}
