//! CloudShield: the detection engine behind a file-intake scanning service.
//!
//! A file and its declared name go through a fixed pipeline: extension
//! classification, SHA-256 lookup, indicator substring scan, and document
//! metadata extraction. The pipeline produces a `ScanResult` with a risk
//! level that only ever moves up.
//!
//! The indicator set is loaded once and passed by reference into every
//! analysis; nothing in the engine mutates shared state.
//!
//! ```no_run
//! use cloudshield::{Analyzer, IndicatorSet};
//! use std::path::Path;
//!
//! # fn main() -> cloudshield::Result<()> {
//! let indicators = IndicatorSet::load_dir(Path::new("iocs"))?;
//! let verdict = Analyzer::new(&indicators).analyze(Path::new("/tmp/upload"), "invoice.exe")?;
//! println!("{} -> {}", verdict.filename(), verdict.risk());
//! # Ok(())
//! # }
//! ```

/// Core data types module
pub mod core;
pub mod error;
pub mod hashing;
pub mod indicators;
pub mod io;
pub mod logging;
pub mod metadata;
pub mod notify;
pub mod service;
pub mod timeout;
pub mod triage;

pub use crate::core::{Metadata, RiskLevel, ScanResult, ScanTarget};
pub use crate::error::{Result, ScanError};
pub use crate::indicators::{IndicatorCounts, IndicatorSet};
pub use crate::metadata::MetadataRegistry;
pub use crate::notify::{AlertChannel, AlertDispatcher, LogNotifier, Notifier};
pub use crate::service::ScanService;
pub use crate::triage::config::ScanConfig;
pub use crate::triage::{analyze, Analyzer};
