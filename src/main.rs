use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cloudshield::logging::{self, LogFormat};
use cloudshield::{IndicatorSet, ScanConfig, ScanResult, ScanService};
use tracing::warn;

/// Exit status when at least one scanned file is malicious.
const EXIT_MALICIOUS: u8 = 2;

/// Scan files against operator-supplied indicators of compromise.
///
/// Indicator lists are read from `hashes.txt`, `bad_strings.txt` and
/// `bad_extensions.txt` in the indicator directory. Alerts for malicious
/// files go to Telegram when `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` are
/// set, and to the log otherwise.
#[derive(Parser, Debug)]
#[command(name = "cloudshield", version, about = "File intake malware scanner", long_about = None)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Indicator directory (overrides config and CLOUDSHIELD_IOC_DIR).
    #[arg(long, global = true)]
    ioc_dir: Option<PathBuf>,

    /// Files larger than this are not string-scanned.
    #[arg(long, global = true)]
    max_scan_bytes: Option<u64>,

    /// Log output format: `human` or `json`.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "human")]
    log_format: LogFormat,

    /// Shorthand for `--log-format json`.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan one or more files. Use `-` to read from stdin.
    Scan {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Declared filename; defaults to the path's basename (or
        /// `unknown_file` for stdin). Only valid with a single path.
        #[arg(long)]
        name: Option<String>,

        /// Print each verdict as one line of JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how many indicators were loaded.
    Indicators {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(if cli.log_json {
        LogFormat::Json
    } else {
        cli.log_format
    });

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let indicators = IndicatorSet::load(&config.indicators).with_context(|| {
        format!(
            "Failed to load indicators from {}",
            config.indicators.dir.display()
        )
    })?;

    match cli.command {
        Command::Indicators { json } => {
            let counts = indicators.counts();
            if json {
                println!("{}", serde_json::to_string(&counts)?);
            } else {
                println!("hashes:         {}", counts.hashes);
                println!("bad strings:    {}", counts.bad_strings);
                println!("bad extensions: {}", counts.bad_extensions);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Scan { paths, name, json } => {
            if name.is_some() && paths.len() > 1 {
                bail!("--name can only be used with a single path");
            }
            let service = ScanService::from_config(Arc::new(indicators), config);
            let code = scan_all(&service, paths, name, json).await;
            if let Err(e) = service.shutdown().await {
                warn!(error = %e, "Pending alerts were not delivered");
            }
            Ok(code)
        }
    }
}

fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    config.apply_env();
    if let Some(dir) = &cli.ioc_dir {
        config.indicators.dir = dir.clone();
    }
    if let Some(limit) = cli.max_scan_bytes {
        config.strings.max_scan_bytes = limit;
    }
    config.validate()?;
    Ok(config)
}

/// Scan every path in order. Exit status is 2 if anything was malicious,
/// 1 if any file could not be scanned, 0 otherwise.
async fn scan_all(
    service: &ScanService,
    paths: Vec<PathBuf>,
    name: Option<String>,
    json: bool,
) -> ExitCode {
    let mut malicious = false;
    let mut failed = false;
    for path in paths {
        let outcome = if path == Path::new("-") {
            service.scan_reader(std::io::stdin(), name.clone()).await
        } else {
            service.scan_path(path.clone(), name.clone()).await
        };
        match outcome {
            Ok(result) => {
                malicious |= result.is_malicious();
                if let Err(e) = print_result(&result, json) {
                    eprintln!("{}: {e:#}", path.display());
                    failed = true;
                }
            }
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failed = true;
            }
        }
    }
    if malicious {
        ExitCode::from(EXIT_MALICIOUS)
    } else if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_result(result: &ScanResult, json: bool) -> Result<()> {
    if json {
        println!("{}", result.to_json_string()?);
        return Ok(());
    }
    let verdict = if result.is_malicious() { "MALICIOUS" } else { "clean" };
    println!("{}: {} (risk: {})", result.filename(), verdict, result.risk());
    println!("  sha256: {}", result.hash());
    println!("  size:   {} bytes", result.file_size());
    println!("  time:   {}", result.scan_time());
    for finding in result.findings() {
        println!("  - {finding}");
    }
    for (key, value) in result.metadata() {
        println!("  {key}: {value}");
    }
    Ok(())
}
