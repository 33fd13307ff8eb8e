//! The async service: temp-file intake and fire-and-forget alerts.

use crate::common::sample_ioc_dir;
use crate::common::test_utils::create_temp_file;
use cloudshield::notify::NotifyError;
use cloudshield::timeout::TimeoutConfig;
use cloudshield::{IndicatorSet, Notifier, RiskLevel, ScanConfig, ScanService};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: String) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Always fails delivery.
struct BrokenNotifier;

impl Notifier for BrokenNotifier {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn send(&self, _message: String) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            status: 500,
            body: "unavailable".into(),
        })
    }
}

fn service<N: Notifier>(notifier: N) -> ScanService<N> {
    let indicators = Arc::new(IndicatorSet::load_dir(sample_ioc_dir()).unwrap());
    ScanService::new(indicators, ScanConfig::default(), notifier)
}

async fn drain<N: Notifier>(service: &ScanService<N>) {
    service
        .alerts()
        .drain(TimeoutConfig::new(5, "test_drain"))
        .await
        .unwrap();
}

#[tokio::test]
async fn malicious_upload_sends_one_alert() {
    let notifier = RecordingNotifier::default();
    let svc = service(notifier.clone());

    let r = svc
        .scan_bytes(b"echo malware-signature".to_vec(), Some("run.bat".into()))
        .await
        .unwrap();
    assert_eq!(r.risk(), RiskLevel::High);
    drain(&svc).await;

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        format!(
            "\u{26a0}\u{fe0f} THREAT DETECTED!\nFile: run.bat\nRisk: high\nTime: {}",
            r.scan_time()
        )
    );
}

#[tokio::test]
async fn clean_upload_sends_nothing() {
    let notifier = RecordingNotifier::default();
    let svc = service(notifier.clone());

    let r = svc
        .scan_bytes(b"hello".to_vec(), Some("hello.txt".into()))
        .await
        .unwrap();
    assert!(!r.is_malicious());
    drain(&svc).await;
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn failed_alert_does_not_affect_verdict() {
    let svc = service(BrokenNotifier);
    let r = svc
        .scan_bytes(b"x".to_vec(), Some("x.exe".into()))
        .await
        .unwrap();
    assert!(r.is_malicious());
    assert_eq!(r.risk(), RiskLevel::High);
    drain(&svc).await;
}

#[tokio::test]
async fn stream_intake_defaults_to_unknown_file() {
    let svc = service(RecordingNotifier::default());
    let r = svc
        .scan_reader(std::io::Cursor::new(b"streamed".to_vec()), None)
        .await
        .unwrap();
    assert_eq!(r.filename(), "unknown_file");
    assert_eq!(r.file_size(), 8);
}

#[tokio::test]
async fn scan_path_keeps_callers_file_and_uses_basename() {
    let svc = service(RecordingNotifier::default());
    let tmp = create_temp_file(b"keep me");
    let expected_name = tmp
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    let r = svc.scan_path(tmp.path(), None).await.unwrap();
    assert_eq!(r.filename(), expected_name);
    assert!(tmp.path().exists());

    let r = svc
        .scan_path(tmp.path(), Some("declared.js".into()))
        .await
        .unwrap();
    assert_eq!(r.filename(), "declared.js");
    assert_eq!(r.risk(), RiskLevel::High);
}

#[tokio::test]
async fn missing_path_is_an_error() {
    let svc = service(RecordingNotifier::default());
    let dir = tempfile::tempdir().unwrap();
    let err = svc
        .scan_path(dir.path().join("nope.bin"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, cloudshield::ScanError::Io { .. }));
}
