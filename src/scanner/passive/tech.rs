//! Technology fingerprinting
//!
//! Substring signatures over response headers and the lowercased HTML body.
//! Every match is informational.

use std::collections::HashMap;

use crate::http::{header, Response};
use crate::scanner::findings::AnalysisResult;
use crate::scanner::passive::PassiveRule;

/// A technology signature
struct Signature {
    name: &'static str,
    category: &'static str,
    /// Lowercase substrings searched in the body
    body: &'static [&'static str],
    /// (header, lowercase substring) pairs
    headers: &'static [(&'static str, &'static str)],
}

const SIGNATURES: &[Signature] = &[
    Signature {
        name: "WordPress",
        category: "CMS",
        body: &["wp-content/", "wp-includes/", "content=\"wordpress"],
        headers: &[("link", "api.w.org")],
    },
    Signature {
        name: "Drupal",
        category: "CMS",
        body: &["drupal-settings-json", "/sites/default/files/", "content=\"drupal"],
        headers: &[("x-generator", "drupal"), ("x-drupal-cache", "")],
    },
    Signature {
        name: "Joomla",
        category: "CMS",
        body: &["content=\"joomla", "/media/jui/", "/media/system/js/"],
        headers: &[],
    },
    Signature {
        name: "Shopify",
        category: "E-commerce",
        body: &["cdn.shopify.com", "shopify.theme"],
        headers: &[("x-shopid", "")],
    },
    Signature {
        name: "Wix",
        category: "Site builder",
        body: &["static.wixstatic.com", "wix-warmup-data"],
        headers: &[("x-wix-request-id", "")],
    },
    Signature {
        name: "Next.js",
        category: "JavaScript framework",
        body: &["__next_data__", "/_next/static/"],
        headers: &[("x-powered-by", "next.js")],
    },
    Signature {
        name: "Nuxt",
        category: "JavaScript framework",
        body: &["window.__nuxt__", "/_nuxt/"],
        headers: &[],
    },
    Signature {
        name: "React",
        category: "JavaScript library",
        body: &["data-reactroot", "react-dom", "__reactcontainer"],
        headers: &[],
    },
    Signature {
        name: "Vue.js",
        category: "JavaScript framework",
        body: &["data-v-app", "vue.min.js", "vue.global", "vue.runtime"],
        headers: &[],
    },
    Signature {
        name: "Angular",
        category: "JavaScript framework",
        body: &["ng-version=", "ng-app", "angular.min.js"],
        headers: &[],
    },
    Signature {
        name: "Svelte",
        category: "JavaScript framework",
        body: &["svelte-", "__sveltekit"],
        headers: &[],
    },
    Signature {
        name: "jQuery",
        category: "JavaScript library",
        body: &["jquery"],
        headers: &[],
    },
    Signature {
        name: "Bootstrap",
        category: "UI framework",
        body: &["bootstrap.min.css", "bootstrap.min.js", "bootstrap.bundle"],
        headers: &[],
    },
];

/// Headers whose value is echoed verbatim as a detection
const ECHO_HEADERS: &[(&str, &str)] = &[
    ("server", "Web server"),
    ("x-powered-by", "Powered by"),
    ("x-aspnet-version", "ASP.NET version"),
];

/// Technology fingerprinting rule
pub struct TechFingerprintRule;

impl TechFingerprintRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TechFingerprintRule {
    fn default() -> Self {
        Self::new()
    }
}

impl PassiveRule for TechFingerprintRule {
    type Output = Vec<AnalysisResult>;

    fn name(&self) -> &'static str {
        "Technology Fingerprint"
    }

    fn analyze(&self, response: &Response) -> Self::Output {
        fingerprint(&response.headers, &response.body)
    }
}

/// Detect technologies; results are in detection order
pub fn fingerprint(headers: &HashMap<String, String>, body: &str) -> Vec<AnalysisResult> {
    let mut results = Vec::new();
    let lowered = body.to_lowercase();

    for (name, label) in ECHO_HEADERS {
        if let Some(value) = header(headers, name) {
            results.push(
                AnalysisResult::info(format!("{}: {}", label, value))
                    .with_details(format!("{} header", name)),
            );
        }
    }

    for signature in SIGNATURES {
        if let Some(evidence) = match_signature(signature, headers, &lowered) {
            tracing::debug!(technology = signature.name, %evidence, "Signature matched");
            results.push(
                AnalysisResult::info(format!("{} detected ({})", signature.name, signature.category))
                    .with_details(evidence),
            );
        }
    }

    if let Some(generator) = generator_meta(body) {
        results.push(
            AnalysisResult::info(format!("Generator: {}", generator))
                .with_details("<meta name=\"generator\">"),
        );
    }

    results
}

fn match_signature(
    signature: &Signature,
    headers: &HashMap<String, String>,
    body: &str,
) -> Option<String> {
    for (name, needle) in signature.headers {
        if let Some(value) = header(headers, name) {
            if value.to_lowercase().contains(needle) {
                return Some(format!("{} header", name));
            }
        }
    }

    signature
        .body
        .iter()
        .find(|marker| body.contains(*marker))
        .map(|marker| format!("body contains '{}'", marker))
}

/// Content of `<meta name="generator">`, if any
fn generator_meta(body: &str) -> Option<String> {
    let document = scraper::Html::parse_document(body);
    let selector = scraper::Selector::parse("meta[name][content]").ok()?;
    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(|content| content.to_string())
}
