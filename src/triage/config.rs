//! Configuration for the scanning pipeline.
//!
//! Every section has defaults matching the reference deployment, so an empty
//! JSON object (or no file at all) is a valid configuration. Values are
//! layered: file, then environment, then command-line flags.

use crate::error::{Result, ScanError};
use crate::hashing::DEFAULT_CHUNK_SIZE;
use crate::io::DEFAULT_MAX_SCAN_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `indicators.dir`.
pub const ENV_IOC_DIR: &str = "CLOUDSHIELD_IOC_DIR";
/// Environment variable carrying the Telegram bot token.
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable carrying the Telegram chat id.
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Master configuration for the scanning pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Where indicator lists are loaded from.
    pub indicators: IndicatorConfig,
    /// Content hashing.
    pub hashing: HashingConfig,
    /// Indicator substring scanning.
    pub strings: StringScanConfig,
    /// Document metadata extraction.
    pub metadata: MetadataConfig,
    /// Alert delivery.
    pub alerts: AlertConfig,
}

impl ScanConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ScanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Self::from_json_str(&body)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = get(ENV_IOC_DIR) {
            self.indicators.dir = PathBuf::from(dir);
        }
        if let Some(token) = get(ENV_TELEGRAM_TOKEN) {
            self.alerts.telegram_token = Some(token);
        }
        if let Some(chat_id) = get(ENV_TELEGRAM_CHAT_ID) {
            self.alerts.telegram_chat_id = Some(chat_id);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hashing.chunk_size == 0 {
            return Err(ScanError::Config(
                "hashing.chunk_size must be non-zero".into(),
            ));
        }
        for (label, name) in [
            ("indicators.hashes_file", &self.indicators.hashes_file),
            ("indicators.strings_file", &self.indicators.strings_file),
            ("indicators.extensions_file", &self.indicators.extensions_file),
        ] {
            if name.trim().is_empty() {
                return Err(ScanError::Config(format!("{label} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Indicator source locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Directory holding the three line-delimited lists (default: `iocs`).
    pub dir: PathBuf,
    /// Known-bad SHA-256 digests (default: `hashes.txt`).
    pub hashes_file: String,
    /// Known-bad substrings (default: `bad_strings.txt`).
    pub strings_file: String,
    /// Known-bad extensions, with leading dot (default: `bad_extensions.txt`).
    pub extensions_file: String,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("iocs"),
            hashes_file: "hashes.txt".into(),
            strings_file: "bad_strings.txt".into(),
            extensions_file: "bad_extensions.txt".into(),
        }
    }
}

impl IndicatorConfig {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn hashes_path(&self) -> PathBuf {
        self.dir.join(&self.hashes_file)
    }

    pub fn strings_path(&self) -> PathBuf {
        self.dir.join(&self.strings_file)
    }

    pub fn extensions_path(&self) -> PathBuf {
        self.dir.join(&self.extensions_file)
    }
}

/// Hashing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Read size in bytes (default: 4096).
    pub chunk_size: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// String scanning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringScanConfig {
    /// Files larger than this are not string-scanned at all (default: 5 MiB).
    pub max_scan_bytes: u64,
}

impl Default for StringScanConfig {
    fn default() -> Self {
        Self {
            max_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
        }
    }
}

/// Metadata extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Run metadata readers for whitelisted extensions (default: true).
    pub enabled: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Alert delivery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// How long shutdown waits for in-flight alerts (default: 10s).
    pub drain_timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            telegram_chat_id: None,
            drain_timeout_secs: 10,
        }
    }
}
