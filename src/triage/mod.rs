//! The detection engine: extension classification, string scanning, risk
//! scoring and the analysis pipeline that ties them together.

pub mod api;
pub mod config;
pub mod extension;
pub mod score;
pub mod strings;

pub use api::{analyze, Analyzer, AnalyzerSettings};
pub use score::{Finding, RiskAssessment};
pub use strings::{IndicatorScanner, StringScanner};
