//! Core data types for CloudShield scanning.
//!
//! These are the values that cross the boundary between the detection engine
//! and its callers: what to scan, how risky it is, and the final verdict.

pub mod risk;
pub mod scan_result;
pub mod target;

pub use risk::RiskLevel;
pub use scan_result::{Metadata, ScanResult};
pub use target::{ScanTarget, UNKNOWN_FILENAME};
