//! Siteguard - Website Security Posture Scanner
//!
//! Probes a target URL with a battery of non-intrusive checks (security
//! headers, cookie flags, TLS/HSTS, technology fingerprinting, sensitive
//! paths, vulnerable front-end libraries) and reduces the findings into a
//! 0-100 risk score where higher is safer.
//!
//! ```no_run
//! use siteguard::{Config, ScanEngine, ScanType};
//!
//! # async fn run() -> Result<(), siteguard::SiteguardError> {
//! let engine = ScanEngine::new(&Config::default())?;
//! let report = engine.scan("https://example.com", ScanType::Quick).await?;
//! println!("risk score: {}", report.risk_score);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod http;
pub mod scanner;

pub use app::Config;
pub use error::{AnalysisError, ConfigError, HttpError, SiteguardError, UserHint};
pub use scanner::{
    AnalysisResult, GeneralInfo, Report, RiskScorer, ScanEngine, ScanRequest, ScanResponse,
    ScanState, ScanType, Status,
};
