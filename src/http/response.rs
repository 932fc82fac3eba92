//! HTTP response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP response as seen by the analyzers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Response headers, lowercased names. Repeated headers are joined with ", ".
    pub headers: HashMap<String, String>,

    /// Raw `Set-Cookie` values, one entry per header line
    pub set_cookies: Vec<String>,

    /// Response body, lossily decoded and capped at the configured size
    pub body: String,

    /// Response time in milliseconds
    pub duration_ms: u64,

    /// Size of the response body in bytes, before any truncation
    pub size: usize,
}

impl Response {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a specific header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        header(&self.headers, name)
    }
}

/// Case-insensitive header lookup
pub fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name) {
        return Some(v.as_str());
    }
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

impl Default for Response {
    fn default() -> Self {
        Self {
            url: String::new(),
            status: 0,
            headers: HashMap::new(),
            set_cookies: Vec::new(),
            body: String::new(),
            duration_ms: 0,
            size: 0,
        }
    }
}
