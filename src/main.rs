//! Siteguard - Website Security Posture Scanner
//!
//! Command line caller for the scan engine. Prints one JSON envelope per
//! target on stdout; logs go to stderr or a rotating file.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use siteguard::{Config, ScanEngine, ScanRequest, ScanResponse, ScanType, Status};

/// Website security posture scanner
#[derive(Parser, Debug)]
#[command(name = "siteguard")]
#[command(author, version, about = "Website security posture scanner", long_about = None)]
struct Cli {
    /// Target URLs (http:// or https://)
    #[arg(required_unless_present_any = ["generate_config", "validate_config"])]
    urls: Vec<String>,

    /// Scan mode (defaults to the configured scan type)
    #[arg(short = 't', long, value_enum, env = "SITEGUARD_SCAN_TYPE")]
    scan_type: Option<ScanType>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Configuration file path
    #[arg(short, long, env = "SITEGUARD_CONFIG")]
    config: Option<String>,

    /// Primary probe timeout in milliseconds
    #[arg(long, env = "SITEGUARD_TIMEOUT_MS")]
    timeout: Option<u64>,

    /// Maximum concurrent content discovery requests
    #[arg(long, env = "SITEGUARD_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "SITEGUARD_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, env = "SITEGUARD_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, env = "SITEGUARD_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One compact JSON envelope per line
    Json,
    /// Pretty-printed JSON envelopes
    Pretty,
    /// Human-readable summary
    Summary,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.generate_config {
        return match generate_default_config() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => usage_error(e),
        };
    }

    if let Err(e) = init_logging(&cli) {
        return usage_error(e);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return usage_error(e),
    };

    if cli.validate_config {
        eprintln!("Configuration is valid");
        return ExitCode::SUCCESS;
    }

    match run(&cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => usage_error(e),
    }
}

fn usage_error(e: anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "error:".red().bold(), e);
    ExitCode::from(2)
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(log_path) = &cli.log_file {
        // File-based logging with daily rotation
        let path = std::path::Path::new(log_path);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Config::data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|_| std::path::PathBuf::from(".")),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {:?}", dir))?;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("siteguard.log");
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, filename);

        if cli.log_json {
            subscriber
                .with(fmt::layer().json().with_writer(file_appender).with_ansi(false))
                .try_init()?;
        } else {
            subscriber
                .with(fmt::layer().with_writer(file_appender).with_ansi(false))
                .try_init()?;
        }
    } else if cli.log_json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

/// Load configuration with CLI overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(timeout) = cli.timeout {
        config.scanner.request_timeout_ms = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.scanner.max_concurrency = concurrency;
    }
    if let Some(scan_type) = cli.scan_type {
        config.scanner.default_scan_type = scan_type;
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let config = Config::default();
    let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

    println!("{}", toml);
    Ok(())
}

/// Scan every target concurrently and print results in argument order.
///
/// Returns whether every scan succeeded.
async fn run(cli: &Cli, config: Config) -> Result<bool> {
    let engine = ScanEngine::new(&config).context("Failed to initialize scan engine")?;

    let responses = futures::future::join_all(cli.urls.iter().map(|url| {
        engine.handle(ScanRequest {
            url: url.clone(),
            scan_type: cli.scan_type,
        })
    }))
    .await;

    for (url, response) in cli.urls.iter().zip(&responses) {
        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(response)?),
            OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(response)?),
            OutputFormat::Summary => print_summary(url, response),
        }
    }

    Ok(responses.iter().all(|r| r.success))
}

fn print_summary(url: &str, response: &ScanResponse) {
    let Some(report) = &response.report else {
        println!(
            "{} {}: {}",
            "FAILED".red().bold(),
            url,
            response.error.as_deref().unwrap_or("unknown error")
        );
        return;
    };

    let score = report.risk_score;
    let score_text = format!("{}/100", score);
    let score_text = match score {
        80..=100 => score_text.green().bold(),
        50..=79 => score_text.yellow().bold(),
        _ => score_text.red().bold(),
    };

    println!("{} {}", report.general.url.bold(), score_text);
    println!(
        "  HTTP {} in {} ({} bytes){}",
        report.general.status,
        report.general.duration,
        report.general.size,
        report
            .general
            .ip
            .as_deref()
            .map(|ip| format!(" from {}", ip))
            .unwrap_or_default()
    );

    let sections = [
        ("headers", report.headers.values().collect::<Vec<_>>()),
        ("cookies", report.cookies.iter().collect()),
        ("ssl", report.ssl.iter().collect()),
        ("content", report.content.iter().flatten().collect()),
        ("supply chain", report.supply_chain.iter().flatten().collect()),
        ("tech", report.tech.iter().collect()),
        ("robots", report.robots.iter().collect()),
    ];

    for (section, findings) in sections {
        for finding in findings.into_iter().filter(|f| f.status != Status::Pass) {
            let label = match finding.status {
                Status::Fail => "FAIL".red().bold(),
                Status::Warning => "WARN".yellow().bold(),
                Status::Info => "INFO".blue(),
                Status::Pass => "PASS".green(),
            };
            let score = finding
                .score
                .map(|s| format!(" (-{})", s))
                .unwrap_or_default();
            println!("  {} [{}] {}{}", label, section, finding.message, score.dimmed());
        }
    }
}
