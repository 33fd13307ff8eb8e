//! Tracing setup for the scanner.
//!
//! Events go to stderr so verdicts on stdout stay machine-readable. The
//! filter comes from `RUST_LOG` and falls back to `info`.

use std::str::FromStr;
use std::sync::Once;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Default filter directive when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" | "pretty" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Only the first call in a process has any
/// effect; later calls, and calls made after another subscriber was
/// installed, are ignored.
pub fn init(format: LogFormat) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter());
        let installed = match format {
            LogFormat::Human => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true)
                        .with_target(true),
                )
                .try_init(),
        };
        if installed.is_ok() {
            debug!(?format, "Tracing initialized");
        }
    });
}

/// Human-readable output.
pub fn init_tracing() {
    init(LogFormat::Human);
}

/// One JSON object per event.
pub fn init_tracing_json() {
    init(LogFormat::Json);
}

/// Open an `info`-level span.
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Log an error at `error` level and evaluate to it.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = %e, "Operation failed");
        e
    }};
    ($err:expr, $msg:expr) => {{
        let e = $err;
        tracing::error!(error = %e, context = $msg, "Operation failed");
        e
    }};
}
