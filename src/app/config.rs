//! Application configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::scanner::ScanType;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scanner settings
    pub scanner: ScannerConfig,

    /// Content discovery settings
    pub discovery: DiscoveryConfig,

    /// Host resolution settings
    pub dns: DnsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Scan mode used when the caller does not pick one
    pub default_scan_type: ScanType,

    /// Primary probe timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Per-candidate timeout for content discovery in milliseconds
    pub path_timeout_ms: u64,

    /// HTTPS probe timeout in milliseconds
    pub ssl_timeout_ms: u64,

    /// robots.txt fetch timeout in milliseconds
    pub robots_timeout_ms: u64,

    /// Maximum in-flight content discovery requests
    pub max_concurrency: usize,

    /// Maximum redirects followed by the primary probe
    pub max_redirects: usize,

    /// Response bodies beyond this size are truncated before analysis
    pub max_body_bytes: usize,

    /// User agent string
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Paths probed for exposed admin/config/VCS endpoints
    pub candidate_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Fall back to DNS-over-HTTPS when the OS resolver fails
    pub doh_enabled: bool,

    /// DNS-over-HTTPS JSON endpoint
    pub doh_url: String,

    /// Resolution timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            default_scan_type: ScanType::Quick,
            request_timeout_ms: 5000,
            path_timeout_ms: 3000,
            ssl_timeout_ms: 5000,
            robots_timeout_ms: 3000,
            max_concurrency: 10,
            max_redirects: 10,
            max_body_bytes: 5 * 1024 * 1024, // 5MB
            user_agent: format!("Siteguard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            candidate_paths: [
                "/admin",
                "/login",
                "/dashboard",
                "/.env",
                "/wp-config.php",
                "/backup",
                "/.git/config",
                "/api",
                "/swagger.json",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            doh_enabled: true,
            doh_url: "https://cloudflare-dns.com/dns-query".to_string(),
            timeout_ms: 3000,
        }
    }
}

impl ScannerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn path_timeout(&self) -> Duration {
        Duration::from_millis(self.path_timeout_ms)
    }

    pub fn ssl_timeout(&self) -> Duration {
        Duration::from_millis(self.ssl_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|source| {
                ConfigError::ReadError {
                    path: config_path.display().to_string(),
                    source,
                }
            })?;

            let config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;

            tracing::info!("Loaded configuration from {:?}", config_path);
            Ok(config)
        } else if path.is_some() {
            Err(ConfigError::ReadError {
                path: config_path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            }
            .into())
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("scanner.request_timeout_ms", self.scanner.request_timeout_ms),
            ("scanner.path_timeout_ms", self.scanner.path_timeout_ms),
            ("scanner.ssl_timeout_ms", self.scanner.ssl_timeout_ms),
            ("scanner.robots_timeout_ms", self.scanner.robots_timeout_ms),
            ("dns.timeout_ms", self.dns.timeout_ms),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        if self.scanner.max_concurrency == 0 {
            return Err(invalid("scanner.max_concurrency", "must be greater than 0"));
        }

        if self.scanner.max_body_bytes == 0 {
            return Err(invalid("scanner.max_body_bytes", "must be greater than 0"));
        }

        if let Some(path) = self
            .discovery
            .candidate_paths
            .iter()
            .find(|p| !p.starts_with('/'))
        {
            return Err(invalid(
                "discovery.candidate_paths",
                &format!("'{}' must start with '/'", path),
            ));
        }

        if self.dns.doh_enabled && url::Url::parse(&self.dns.doh_url).is_err() {
            return Err(invalid("dns.doh_url", "not a valid URL"));
        }

        Ok(())
    }

    /// Get default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "siteguard", "siteguard")
            .context("Failed to determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("io", "siteguard", "siteguard")
            .context("Failed to determine data directory")?;

        Ok(dirs.data_dir().to_path_buf())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.discovery.candidate_paths.len(), 9);
        assert_eq!(config.scanner.default_scan_type, ScanType::Quick);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nrequest_timeout_ms = 1500\ndefault_scan_type = \"deep\"").unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.scanner.request_timeout_ms, 1500);
        assert_eq!(config.scanner.default_scan_type, ScanType::Deep);
        assert_eq!(config.scanner.path_timeout_ms, 3000);
        assert!(config.dns.doh_enabled);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(Config::load(path.to_str()).is_err());
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner\nrequest_timeout_ms = ").unwrap();
        assert!(Config::load(file.path().to_str()).is_err());
    }

    #[test]
    fn test_validate_rejects_relative_candidate() {
        let mut config = Config::default();
        config.discovery.candidate_paths.push("admin.php".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("discovery.candidate_paths"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.scanner.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[discovery]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.scanner.max_concurrency, config.scanner.max_concurrency);
    }
}
