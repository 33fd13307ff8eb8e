//! The verdict produced by one file analysis.

use super::risk::RiskLevel;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document properties keyed by name. A failed extraction holds a single
/// `error` entry.
pub type Metadata = BTreeMap<String, String>;

/// Format of `ScanResult::scan_time`.
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Complete, immutable output of one analysis.
///
/// Field names are the serialized wire contract. Deserialized values must
/// satisfy the same rules `new` enforces: `malicious` agrees with
/// `findings`, and the risk is `low` exactly when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScanResult")]
pub struct ScanResult {
    filename: String,
    hash: String,
    malicious: bool,
    findings: Vec<String>,
    risk: RiskLevel,
    scan_time: String,
    file_size: u64,
    metadata: Metadata,
}

impl ScanResult {
    /// Assemble a verdict. `malicious` is derived from `findings`.
    pub(crate) fn new(
        filename: String,
        hash: String,
        findings: Vec<String>,
        risk: RiskLevel,
        scan_time: String,
        file_size: u64,
        metadata: Metadata,
    ) -> Self {
        Self {
            filename,
            hash,
            malicious: !findings.is_empty(),
            findings,
            risk,
            scan_time,
            file_size,
            metadata,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Lowercase hex SHA-256 of the full file content.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_malicious(&self) -> bool {
        self.malicious
    }

    pub fn findings(&self) -> &[String] {
        &self.findings
    }

    pub fn risk(&self) -> RiskLevel {
        self.risk
    }

    pub fn scan_time(&self) -> &str {
        &self.scan_time
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }
}

#[derive(Deserialize)]
struct RawScanResult {
    filename: String,
    hash: String,
    malicious: bool,
    findings: Vec<String>,
    risk: RiskLevel,
    scan_time: String,
    file_size: u64,
    metadata: Metadata,
}

impl TryFrom<RawScanResult> for ScanResult {
    type Error = String;

    fn try_from(raw: RawScanResult) -> std::result::Result<Self, Self::Error> {
        let found = !raw.findings.is_empty();
        if raw.malicious != found {
            return Err(format!(
                "malicious is {} but {} findings were reported",
                raw.malicious,
                raw.findings.len()
            ));
        }
        if found == (raw.risk == RiskLevel::Low) {
            return Err(format!(
                "risk {} is inconsistent with {} findings",
                raw.risk,
                raw.findings.len()
            ));
        }
        Ok(Self::new(
            raw.filename,
            raw.hash,
            raw.findings,
            raw.risk,
            raw.scan_time,
            raw.file_size,
            raw.metadata,
        ))
    }
}

/// Current local time in `SCAN_TIME_FORMAT`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(SCAN_TIME_FORMAT).to_string()
}
