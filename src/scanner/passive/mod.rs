//! Passive analyzers
//!
//! Work only on the primary response; no network I/O.

mod cookies;
mod headers;
mod supply_chain;
mod tech;

pub use cookies::{analyze_cookies, split_set_cookie, CookieSecurityRule};
pub use headers::{analyze_headers, SecurityHeadersRule, CSP, HSTS, SERVER, X_FRAME};
pub use supply_chain::{analyze_scripts, extract_script_sources, SupplyChainRule};
pub use tech::{fingerprint, TechFingerprintRule};

use crate::http::Response;

/// Trait for passive analysis rules
pub trait PassiveRule {
    /// Shape of the report field this rule fills
    type Output;

    /// Rule name
    fn name(&self) -> &'static str;

    /// Analyze the primary response
    fn analyze(&self, response: &Response) -> Self::Output;
}
