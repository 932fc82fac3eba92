//! Security headers analysis

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::http::{header, Response};
use crate::scanner::findings::AnalysisResult;
use crate::scanner::passive::PassiveRule;
use crate::scanner::remediation;

pub const HSTS: &str = "HSTS";
pub const CSP: &str = "CSP";
pub const X_FRAME: &str = "X-Frame";
pub const SERVER: &str = "Server";

/// Rule for checking security headers
pub struct SecurityHeadersRule;

impl SecurityHeadersRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SecurityHeadersRule {
    fn default() -> Self {
        Self::new()
    }
}

impl PassiveRule for SecurityHeadersRule {
    type Output = BTreeMap<String, AnalysisResult>;

    fn name(&self) -> &'static str {
        "Security Headers"
    }

    fn analyze(&self, response: &Response) -> Self::Output {
        analyze_headers(&response.headers)
    }
}

/// Evaluate the fixed header policy. Every key is always present.
pub fn analyze_headers(headers: &HashMap<String, String>) -> BTreeMap<String, AnalysisResult> {
    let mut results = BTreeMap::new();

    let hsts = match header(headers, "Strict-Transport-Security") {
        Some(value) => AnalysisResult::pass("HSTS is enabled").with_details(value),
        None => AnalysisResult::fail("Missing Strict-Transport-Security header")
            .with_details("Browsers may connect over plain HTTP, allowing protocol downgrade attacks.")
            .with_score(20)
            .with_remediation(remediation::HSTS),
    };
    results.insert(HSTS.to_string(), hsts);

    let csp = match header(headers, "Content-Security-Policy") {
        Some(value) => {
            let weaknesses: Vec<&str> = ["'unsafe-inline'", "'unsafe-eval'"]
                .into_iter()
                .filter(|w| value.contains(w))
                .collect();
            if weaknesses.is_empty() {
                AnalysisResult::pass("Content-Security-Policy is set").with_details(value)
            } else {
                AnalysisResult::pass(format!(
                    "Content-Security-Policy is set but allows {}",
                    weaknesses.join(" and ")
                ))
                .with_details(value)
            }
        }
        None => AnalysisResult::warning("Missing Content-Security-Policy header")
            .with_details("No policy restricts script sources; XSS and data injection are easier to exploit.")
            .with_score(15)
            .with_remediation(remediation::CSP),
    };
    results.insert(CSP.to_string(), csp);

    let x_frame = match header(headers, "X-Frame-Options") {
        Some(value) => AnalysisResult::pass("Clickjacking protection is enabled").with_details(value),
        None => AnalysisResult::fail("Missing X-Frame-Options header")
            .with_details("The page can be framed by other origins (clickjacking).")
            .with_score(10)
            .with_remediation(remediation::X_FRAME),
    };
    results.insert(X_FRAME.to_string(), x_frame);

    let server = match header(headers, "Server") {
        Some(value) => {
            let message = if discloses_version(value) {
                "Server banner discloses software and version"
            } else {
                "Server banner is exposed"
            };
            AnalysisResult::info(message)
                .with_details(value)
                .with_score(5)
                .with_remediation(remediation::SERVER_BANNER)
        }
        None => AnalysisResult::pass("Server banner is hidden"),
    };
    results.insert(SERVER.to_string(), server);

    results
}

fn discloses_version(server: &str) -> bool {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION
        .get_or_init(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("valid version regex"))
        .is_match(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::findings::Status;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_headers() {
        let results = analyze_headers(&HashMap::new());

        assert_eq!(results.len(), 4);
        assert_eq!(results[HSTS].status, Status::Fail);
        assert_eq!(results[HSTS].score, Some(20));
        assert_eq!(results[CSP].status, Status::Warning);
        assert_eq!(results[CSP].score, Some(15));
        assert_eq!(results[X_FRAME].status, Status::Fail);
        assert_eq!(results[X_FRAME].score, Some(10));
        assert_eq!(results[SERVER].status, Status::Pass);
        assert_eq!(results[SERVER].score, None);
    }

    #[test]
    fn test_all_headers_present() {
        let results = analyze_headers(&headers(&[
            ("strict-transport-security", "max-age=63072000"),
            ("content-security-policy", "default-src 'self'"),
            ("x-frame-options", "DENY"),
        ]));

        assert!(results.values().all(|r| r.status == Status::Pass));
        assert!(results.values().all(|r| r.score.is_none()));
        assert_eq!(results[HSTS].details.as_deref(), Some("max-age=63072000"));
    }

    #[test]
    fn test_server_banner_is_informational_regardless_of_value() {
        for value in ["cloudflare", "Apache/2.4.41 (Ubuntu)"] {
            let results = analyze_headers(&headers(&[("server", value)]));
            assert_eq!(results[SERVER].status, Status::Info);
            assert_eq!(results[SERVER].score, Some(5));
        }

        let results = analyze_headers(&headers(&[("server", "nginx/1.18.0")]));
        assert!(results[SERVER].message.contains("version"));
    }

    #[test]
    fn test_weak_csp_still_passes() {
        let results = analyze_headers(&headers(&[(
            "content-security-policy",
            "script-src 'self' 'unsafe-inline'",
        )]));

        assert_eq!(results[CSP].status, Status::Pass);
        assert!(results[CSP].message.contains("'unsafe-inline'"));
        assert_eq!(results[CSP].score, None);
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let results = analyze_headers(&headers(&[("X-Frame-Options", "SAMEORIGIN")]));
        assert_eq!(results[X_FRAME].status, Status::Pass);
    }

    #[test]
    fn test_deterministic_output() {
        let input = headers(&[("server", "nginx"), ("x-frame-options", "DENY")]);
        let first = serde_json::to_string(&analyze_headers(&input)).unwrap();
        let second = serde_json::to_string(&analyze_headers(&input)).unwrap();
        assert_eq!(first, second);
    }
}
