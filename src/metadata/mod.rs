//! Best-effort document metadata extraction.
//!
//! Readers are keyed by lowercase extension; exactly one reader runs per
//! file. A reader failure of any kind, panics included, is converted into a
//! single `error` entry and never propagates into the analysis.

#[cfg(feature = "metadata-pdf")]
pub mod pdf;
#[cfg(feature = "metadata-xlsx")]
pub mod xlsx;

use crate::core::Metadata;
use crate::triage::extension::normalized_extension;
use once_cell::sync::Lazy;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the failure message in a degraded mapping.
pub const ERROR_KEY: &str = "error";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[cfg(feature = "metadata-pdf")]
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),

    #[cfg(feature = "metadata-xlsx")]
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("not a spreadsheet: missing {0}")]
    NotSpreadsheet(&'static str),

    #[error("reader panicked: {0}")]
    Panic(String),
}

/// A document property reader for a fixed set of extensions.
pub trait MetadataReader: Send + Sync {
    fn name(&self) -> &'static str;
    /// Lowercase extensions including the dot, e.g. `.pdf`.
    fn extensions(&self) -> &'static [&'static str];
    fn read(&self, path: &Path) -> Result<Metadata, MetadataError>;
}

/// Result of running one reader behind the failure boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Extracted(Metadata),
    Failed(String),
}

impl MetadataOutcome {
    /// Collapse into the mapping carried by the scan result.
    pub fn into_metadata(self) -> Metadata {
        match self {
            MetadataOutcome::Extracted(m) => m,
            MetadataOutcome::Failed(reason) => {
                Metadata::from([(ERROR_KEY.to_string(), format!("Extraction failed: {reason}"))])
            }
        }
    }
}

/// Registered readers, selected by extension.
#[derive(Default)]
pub struct MetadataRegistry {
    readers: Vec<Box<dyn MetadataReader>>,
}

static DEFAULT_REGISTRY: Lazy<MetadataRegistry> = Lazy::new(MetadataRegistry::with_defaults);

impl MetadataRegistry {
    /// A registry with no readers; every extension yields empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// The readers compiled into this build (`.pdf`, `.xlsx`).
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "metadata-pdf")]
        {
            registry.register(pdf::PdfReader);
        }
        #[cfg(feature = "metadata-xlsx")]
        {
            registry.register(xlsx::XlsxReader);
        }
        registry
    }

    /// Process-wide registry with the default readers.
    pub fn global() -> &'static MetadataRegistry {
        &DEFAULT_REGISTRY
    }

    /// Register a reader. A later reader claiming an extension already
    /// claimed is ignored for that extension.
    pub fn register<R: MetadataReader + 'static>(&mut self, reader: R) -> &mut Self {
        self.readers.push(Box::new(reader));
        self
    }

    pub fn reader_for(&self, extension: &str) -> Option<&dyn MetadataReader> {
        self.readers
            .iter()
            .find(|r| r.extensions().iter().any(|e| *e == extension))
            .map(|r| &**r)
    }

    /// Whether `extension` (lowercase, with dot) is in the whitelist.
    pub fn supports(&self, extension: &str) -> bool {
        self.reader_for(extension).is_some()
    }

    /// Sorted whitelist of extensions.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self
            .readers
            .iter()
            .flat_map(|r| r.extensions().iter().copied())
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }

    /// Extract metadata for `filename`'s extension. Unknown extensions yield
    /// an empty mapping; failures yield `{"error": ...}`.
    pub fn extract(&self, path: &Path, filename: &str) -> Metadata {
        let extension = normalized_extension(filename);
        match self.reader_for(&extension) {
            Some(reader) => self.run(reader, path).into_metadata(),
            None => Metadata::new(),
        }
    }

    /// Run one reader inside the failure boundary.
    pub fn run(&self, reader: &dyn MetadataReader, path: &Path) -> MetadataOutcome {
        let outcome = match catch_unwind(AssertUnwindSafe(|| reader.read(path))) {
            Ok(Ok(metadata)) => MetadataOutcome::Extracted(metadata),
            Ok(Err(e)) => MetadataOutcome::Failed(e.to_string()),
            Err(payload) => MetadataOutcome::Failed(
                MetadataError::Panic(panic_message(payload.as_ref())).to_string(),
            ),
        };
        match &outcome {
            MetadataOutcome::Extracted(m) => {
                debug!(reader = reader.name(), fields = m.len(), "Metadata extracted")
            }
            MetadataOutcome::Failed(reason) => {
                warn!(reader = reader.name(), path = %path.display(), %reason, "Metadata extraction failed")
            }
        }
        outcome
    }
}

/// Extract metadata with the default readers.
pub fn extract(path: &Path, filename: &str) -> Metadata {
    MetadataRegistry::global().extract(path, filename)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
