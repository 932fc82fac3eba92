//! Application configuration

mod config;

pub use config::{Config, DiscoveryConfig, DnsConfig, ScannerConfig};
