//! Operator-supplied indicator lists.
//!
//! An `IndicatorSet` is loaded once at startup and is read-only afterwards,
//! so any number of concurrent analyses can share it without locking.

use crate::error::{Result, ScanError};
use crate::triage::config::IndicatorConfig;
use aho_corasick::AhoCorasick;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Known-bad hashes, substrings and extensions.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    hashes: HashSet<String>,
    /// Sorted and unique; this order is the order string findings are reported in.
    bad_strings: Vec<String>,
    bad_extensions: HashSet<String>,
    /// Multi-pattern matcher over `bad_strings`; pattern ids index into it.
    matcher: Option<AhoCorasick>,
}

/// Entry counts per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorCounts {
    pub hashes: usize,
    pub bad_strings: usize,
    pub bad_extensions: usize,
}

impl IndicatorSet {
    /// An indicator set that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from in-memory lists, applying the same normalization as `load`.
    pub fn from_lists<H, S, E>(hashes: H, bad_strings: S, bad_extensions: E) -> Result<Self>
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self::from_normalized(
            normalize_entries(hashes),
            normalize_entries(bad_strings),
            normalize_entries(bad_extensions),
        )
    }

    /// Load the three lists named by `config`.
    ///
    /// A missing file yields an empty category. Any other read failure is an
    /// error naming the offending file.
    pub fn load(config: &IndicatorConfig) -> Result<Self> {
        let set = Self::from_normalized(
            read_indicator_file(&config.hashes_path())?,
            read_indicator_file(&config.strings_path())?,
            read_indicator_file(&config.extensions_path())?,
        )?;
        let counts = set.counts();
        info!(
            dir = %config.dir.display(),
            hashes = counts.hashes,
            bad_strings = counts.bad_strings,
            bad_extensions = counts.bad_extensions,
            "Indicators loaded"
        );
        Ok(set)
    }

    /// Load from `dir` using the default file names.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&IndicatorConfig::with_dir(dir.as_ref()))
    }

    fn from_normalized(
        hashes: BTreeSet<String>,
        bad_strings: BTreeSet<String>,
        bad_extensions: BTreeSet<String>,
    ) -> Result<Self> {
        let bad_strings: Vec<String> = bad_strings.into_iter().collect();
        let matcher = if bad_strings.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&bad_strings).map_err(|e| ScanError::Matcher(e.to_string()))?)
        };
        Ok(Self {
            hashes: hashes.into_iter().collect(),
            bad_strings,
            bad_extensions: bad_extensions.into_iter().collect(),
            matcher,
        })
    }

    /// Whether `digest` (hex, any case) is a known-bad hash.
    pub fn contains_hash(&self, digest: &str) -> bool {
        self.hashes.contains(&digest.trim().to_ascii_lowercase())
    }

    /// Whether `extension` (with leading dot, already lowercased) is listed.
    /// The empty extension never matches.
    pub fn contains_extension(&self, extension: &str) -> bool {
        !extension.is_empty() && self.bad_extensions.contains(extension)
    }

    /// Indicator substrings in reporting order.
    pub fn bad_strings(&self) -> &[String] {
        &self.bad_strings
    }

    /// Every indicator substring contained in `text`, each reported once, in
    /// `bad_strings()` order. `text` must already be lowercased.
    pub fn find_bad_strings(&self, text: &str) -> Vec<&str> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        let mut hit = vec![false; self.bad_strings.len()];
        let mut remaining = hit.len();
        for m in matcher.find_overlapping_iter(text) {
            let slot = &mut hit[m.pattern().as_usize()];
            if !*slot {
                *slot = true;
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
        self.bad_strings
            .iter()
            .zip(hit)
            .filter_map(|(s, matched)| matched.then_some(s.as_str()))
            .collect()
    }

    pub fn counts(&self) -> IndicatorCounts {
        IndicatorCounts {
            hashes: self.hashes.len(),
            bad_strings: self.bad_strings.len(),
            bad_extensions: self.bad_extensions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty() && self.bad_strings.is_empty() && self.bad_extensions.is_empty()
    }
}

/// Trim, lowercase and deduplicate entries; blank entries are dropped.
pub fn normalize_entries<I>(entries: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn read_indicator_file(path: &Path) -> Result<BTreeSet<String>> {
    match std::fs::read_to_string(path) {
        Ok(body) => Ok(normalize_entries(body.lines())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Indicator file missing; category left empty");
            Ok(BTreeSet::new())
        }
        Err(source) => Err(ScanError::Indicators {
            path: path.to_path_buf(),
            source,
        }),
    }
}
