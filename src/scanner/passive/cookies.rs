//! Cookie security analysis

use std::sync::OnceLock;

use regex::Regex;

use crate::http::Response;
use crate::scanner::findings::AnalysisResult;
use crate::scanner::passive::PassiveRule;
use crate::scanner::remediation;

/// Deduction per missing flag
const MISSING_FLAG_SCORE: u32 = 5;

/// Flags checked on every cookie, as (attribute, display name)
const FLAGS: [(&str, &str); 3] = [
    ("secure", "Secure"),
    ("httponly", "HttpOnly"),
    ("samesite", "SameSite"),
];

/// Rule for checking cookie security
pub struct CookieSecurityRule;

impl CookieSecurityRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CookieSecurityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl PassiveRule for CookieSecurityRule {
    type Output = Vec<AnalysisResult>;

    fn name(&self) -> &'static str {
        "Cookie Security"
    }

    fn analyze(&self, response: &Response) -> Self::Output {
        analyze_cookies(&response.set_cookies)
    }
}

/// One result per cookie found across all `Set-Cookie` values
pub fn analyze_cookies<S: AsRef<str>>(set_cookie_values: &[S]) -> Vec<AnalysisResult> {
    set_cookie_values
        .iter()
        .flat_map(|raw| split_set_cookie(raw.as_ref()))
        .map(analyze_cookie)
        .collect()
}

fn analyze_cookie(cookie: &str) -> AnalysisResult {
    let name = cookie_name(cookie);
    // Flags live after the first ';', never in name=value
    let attributes = cookie
        .split_once(';')
        .map(|(_, attrs)| attrs.to_ascii_lowercase())
        .unwrap_or_default();

    let missing: Vec<&str> = FLAGS
        .iter()
        .filter(|(attr, _)| !attributes.contains(attr))
        .map(|(_, display)| *display)
        .collect();

    if missing.is_empty() {
        return AnalysisResult::pass(format!("Cookie '{}' is secure", name));
    }

    AnalysisResult::warning(format!(
        "Cookie '{}' is missing {}",
        name,
        missing.join(", ")
    ))
    .with_details(format!("Missing flags: {}", missing.join(", ")))
    .with_score(MISSING_FLAG_SCORE * missing.len() as u32)
    .with_remediation(remediation::COOKIE_FLAGS)
}

fn cookie_name(cookie: &str) -> &str {
    let pair = cookie.split(';').next().unwrap_or(cookie);
    pair.split('=').next().unwrap_or(pair).trim()
}

/// Split a (possibly folded) `Set-Cookie` value into individual cookies.
///
/// A boundary is a comma followed by `name=`, so commas inside
/// `Expires=Wed, 21 Oct 2015 07:28:00 GMT` stay put.
pub fn split_set_cookie(raw: &str) -> Vec<&str> {
    static NEXT_COOKIE: OnceLock<Regex> = OnceLock::new();
    let next_cookie = NEXT_COOKIE.get_or_init(|| {
        Regex::new(r"^\s*[!#$%&'*+\-.^_`|~0-9A-Za-z]+=").expect("valid cookie boundary regex")
    });

    let mut cookies = Vec::new();
    let mut start = 0;
    for (idx, _) in raw.match_indices(',') {
        if next_cookie.is_match(&raw[idx + 1..]) {
            cookies.push(&raw[start..idx]);
            start = idx + 1;
        }
    }
    cookies.push(&raw[start..]);

    cookies
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}
