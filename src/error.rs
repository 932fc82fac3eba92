//! Custom error types for Siteguard
//!
//! Scan-level failures (`InvalidInput`, `Unreachable`, `Timeout`) surface to
//! the caller. Everything an individual analyzer hits is an [`AnalysisError`]
//! and is absorbed by the engine.

use thiserror::Error;

/// Main error type for Siteguard operations
#[derive(Error, Debug)]
pub enum SiteguardError {
    /// Malformed target URL, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The primary probe could not complete
    #[error("Target unreachable: {url} ({reason})")]
    Unreachable { url: String, reason: String },

    /// The primary probe exceeded its timeout
    #[error("Target timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },
}

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Failed to read response body: {0}")]
    BodyRead(String),

    #[error("Failed to build HTTP client: {0}")]
    Builder(String),
}

/// Failure of a single analyzer's own network call.
///
/// Never escapes the engine: the affected report field degrades to
/// empty/null instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{analyzer}: {source}")]
    Network {
        analyzer: &'static str,
        #[source]
        source: HttpError,
    },

    #[error("{analyzer}: unexpected status {status}")]
    UnexpectedStatus { analyzer: &'static str, status: u16 },

    #[error("{analyzer}: {reason}")]
    Other { analyzer: &'static str, reason: String },
}

impl AnalysisError {
    pub fn network(analyzer: &'static str, source: HttpError) -> Self {
        AnalysisError::Network { analyzer, source }
    }

    pub fn analyzer(&self) -> &'static str {
        match self {
            AnalysisError::Network { analyzer, .. }
            | AnalysisError::UnexpectedStatus { analyzer, .. }
            | AnalysisError::Other { analyzer, .. } => analyzer,
        }
    }
}

impl HttpError {
    /// Classify a reqwest transport error
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(timeout_ms)
        } else if err.is_connect() {
            let msg = error_chain(&err);
            if msg.to_lowercase().contains("certificate") || msg.to_lowercase().contains("tls") {
                HttpError::TlsError(msg)
            } else {
                HttpError::ConnectionError(msg)
            }
        } else if err.is_builder() {
            HttpError::InvalidUrl(error_chain(&err))
        } else if err.is_body() || err.is_decode() {
            HttpError::BodyRead(error_chain(&err))
        } else {
            HttpError::RequestFailed(error_chain(&err))
        }
    }
}

/// Flatten an error and its sources into one line
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = inner.source();
    }
    msg
}

impl SiteguardError {
    /// Promote a primary-probe failure to a scan-level error
    pub fn from_probe(url: &str, err: HttpError) -> Self {
        match err {
            HttpError::Timeout(timeout_ms) => SiteguardError::Timeout {
                url: url.to_string(),
                timeout_ms,
            },
            HttpError::InvalidUrl(reason) => SiteguardError::InvalidInput(reason),
            other => SiteguardError::Unreachable {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SiteguardError::InvalidInput(reason) => format!("Invalid URL: {}", reason),
            SiteguardError::Unreachable { url, reason } => {
                format!("Could not reach {}: {}", url, reason)
            }
            SiteguardError::Timeout { url, timeout_ms } => format!(
                "{} did not respond within {}ms. The server may be slow or unresponsive.",
                url, timeout_ms
            ),
            SiteguardError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            SiteguardError::Http(e) => format!("Network issue: {}", e.user_hint()),
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ReadError { path, .. } => {
                format!("Could not read '{}'. Check if the file exists and you have read permissions.", path)
            }
            ConfigError::ParseError(_) => {
                "The configuration file has invalid syntax. Check for TOML formatting errors.".into()
            }
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl UserHint for HttpError {
    fn user_hint(&self) -> String {
        match self {
            HttpError::ConnectionError(_) => {
                "Could not connect to the server. Check if it's running and accessible.".into()
            }
            HttpError::Timeout(ms) => {
                format!("Request timed out after {}ms. The server may be slow or unresponsive.", ms)
            }
            HttpError::InvalidUrl(url) => {
                format!("'{}' is not a valid URL. Check the format.", url)
            }
            HttpError::TlsError(_) => {
                "TLS/SSL connection failed. The certificate may be invalid or expired.".into()
            }
            _ => self.to_string(),
        }
    }
}
