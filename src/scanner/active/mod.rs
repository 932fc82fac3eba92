//! Active analyzers
//!
//! Each issues its own requests with its own timeout. A failure here only
//! empties the analyzer's report field.

mod discovery;
mod robots;
mod ssl;

pub use discovery::ContentDiscoveryProbe;
pub use robots::{disallow_rules, RobotsAnalyzer};
pub use ssl::{classify_https, SslAnalyzer};
