//! Ordering and short-circuit rules of the scoring policy.

use crate::common::test_utils::{create_temp_file, indicators};
use cloudshield::hashing::sha256_digest;
use cloudshield::triage::{AnalyzerSettings, StringScanner};
use cloudshield::{Analyzer, IndicatorSet, RiskLevel};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reports a fixed match and counts how often it ran.
struct SpyScanner {
    calls: AtomicUsize,
    hits: Vec<String>,
}

impl SpyScanner {
    fn reporting(hits: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            hits: hits.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StringScanner for &SpyScanner {
    fn scan(&self, _path: &Path, _indicators: &IndicatorSet, _max: u64) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hits.clone()
    }
}

#[test]
fn string_scan_skipped_only_at_critical() {
    let content = b"some upload";
    let hash = sha256_digest(content);
    let tmp = create_temp_file(content);

    // critical: hash match, scanner never runs
    let set = indicators(&[hash.as_str()], &[], &[]);
    let spy = SpyScanner::reporting(&["x"]);
    let r = Analyzer::new(&set)
        .with_scanner(&spy)
        .analyze(tmp.path(), "upload.txt")
        .unwrap();
    assert_eq!(spy.calls(), 0);
    assert_eq!(r.risk(), RiskLevel::Critical);

    // high: extension match, scanner still runs
    let set = indicators(&[], &[], &[".scr"]);
    let spy = SpyScanner::reporting(&["x"]);
    let r = Analyzer::new(&set)
        .with_scanner(&spy)
        .analyze(tmp.path(), "upload.scr")
        .unwrap();
    assert_eq!(spy.calls(), 1);
    assert_eq!(r.risk(), RiskLevel::High);
    assert_eq!(r.findings().len(), 2);
}

#[test]
fn hash_check_runs_regardless_of_extension() {
    let content = b"dual hit";
    let hash = sha256_digest(content);
    let tmp = create_temp_file(content);
    let set = indicators(&[hash.as_str()], &[], &[".exe"]);

    let r = cloudshield::analyze(&set, tmp.path(), "dual.exe").unwrap();
    assert_eq!(r.risk(), RiskLevel::Critical);
    assert_eq!(
        r.findings(),
        ["Dangerous extension: .exe", "Hash matches known malware"]
    );
}

#[test]
fn strings_never_downgrade_high() {
    let tmp = create_temp_file(b"contains eval( here");
    let set = indicators(&[], &["eval("], &[".js"]);
    let r = cloudshield::analyze(&set, tmp.path(), "app.js").unwrap();
    assert_eq!(r.risk(), RiskLevel::High);
    assert_eq!(
        r.findings(),
        ["Dangerous extension: .js", "Suspicious string: 'eval('"]
    );
}

#[test]
fn multiple_strings_each_become_a_finding() {
    let tmp = create_temp_file(b"PowerShell -enc AAAA; cmd.exe /c whoami");
    let set = indicators(&[], &["powershell -enc", "cmd.exe /c", "not-present"], &[]);
    let r = cloudshield::analyze(&set, tmp.path(), "notes.txt").unwrap();
    assert_eq!(r.risk(), RiskLevel::Medium);
    assert_eq!(
        r.findings(),
        [
            "Suspicious string: 'cmd.exe /c'",
            "Suspicious string: 'powershell -enc'"
        ]
    );
}

#[test]
fn oversized_file_is_not_string_scanned() {
    let mut content = vec![b'a'; 64];
    content.extend_from_slice(b"malware-signature");
    let tmp = create_temp_file(&content);
    let set = indicators(&[], &["malware-signature"], &[]);

    let limit = content.len() as u64;
    let at_limit = AnalyzerSettings {
        max_scan_bytes: limit,
        ..AnalyzerSettings::default()
    };
    let below_limit = AnalyzerSettings {
        max_scan_bytes: limit - 1,
        ..AnalyzerSettings::default()
    };

    let r = Analyzer::new(&set)
        .with_settings(at_limit)
        .analyze(tmp.path(), "big.txt")
        .unwrap();
    assert_eq!(r.risk(), RiskLevel::Medium);

    let r = Analyzer::new(&set)
        .with_settings(below_limit)
        .analyze(tmp.path(), "big.txt")
        .unwrap();
    assert_eq!(r.risk(), RiskLevel::Low);
    assert!(!r.is_malicious());
    // Hash and size are still reported for skipped files
    assert_eq!(r.file_size(), limit);
    assert_eq!(r.hash(), sha256_digest(&content));
}

#[test]
fn empty_file_is_clean() {
    let tmp = create_temp_file(b"");
    let set = indicators(&[], &["x"], &[]);
    let r = cloudshield::analyze(&set, tmp.path(), "empty").unwrap();
    assert_eq!(r.file_size(), 0);
    assert_eq!(
        r.hash(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(r.risk(), RiskLevel::Low);
}

#[test]
fn missing_file_fails_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let set = IndicatorSet::empty();
    let err = cloudshield::analyze(&set, &dir.path().join("vanished"), "vanished.txt")
        .unwrap_err();
    assert!(matches!(err, cloudshield::ScanError::Io { .. }));
}
