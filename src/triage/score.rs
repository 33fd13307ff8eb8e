//! Risk scoring policy.
//!
//! Every finding carries a severity floor. Recording a finding raises the
//! accumulated risk to at least that floor, so risk can only move up.

use crate::core::RiskLevel;
use std::fmt;

/// A matched indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Extension as written in the declared filename, e.g. `.exe`.
    DangerousExtension(String),
    KnownBadHash,
    SuspiciousString(String),
}

impl Finding {
    /// Minimum risk implied by this finding.
    pub fn severity(&self) -> RiskLevel {
        match self {
            Finding::DangerousExtension(_) => RiskLevel::High,
            Finding::KnownBadHash => RiskLevel::Critical,
            Finding::SuspiciousString(_) => RiskLevel::Medium,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DangerousExtension(ext) => write!(f, "Dangerous extension: {ext}"),
            Finding::KnownBadHash => f.write_str("Hash matches known malware"),
            Finding::SuspiciousString(s) => write!(f, "Suspicious string: '{s}'"),
        }
    }
}

/// Accumulates findings and the resulting risk level.
#[derive(Debug, Clone, Default)]
pub struct RiskAssessment {
    risk: RiskLevel,
    findings: Vec<String>,
}

impl RiskAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, finding: Finding) {
        self.risk.raise_to(finding.severity());
        self.findings.push(finding.to_string());
    }

    pub fn risk(&self) -> RiskLevel {
        self.risk
    }

    /// Critical is the ceiling; nothing later in the pipeline can change it.
    pub fn is_critical(&self) -> bool {
        self.risk == RiskLevel::Critical
    }

    pub fn findings(&self) -> &[String] {
        &self.findings
    }

    pub fn into_parts(self) -> (RiskLevel, Vec<String>) {
        (self.risk, self.findings)
    }
}
