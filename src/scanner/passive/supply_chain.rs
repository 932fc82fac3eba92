//! Front-end supply chain check
//!
//! Pulls every `<script src>` out of the page with an HTML parser and checks
//! the URLs against a small static table of vulnerable or end-of-life
//! library versions. Not a CVE feed.

use std::sync::OnceLock;

use regex::Regex;

use crate::http::Response;
use crate::scanner::findings::AnalysisResult;
use crate::scanner::passive::PassiveRule;

/// Deduction for a library with a published CVE
const CVE_SCORE: u32 = 20;

/// Deduction for an end-of-life library without a known CVE
const EOL_SCORE: u32 = 10;

type Version = (u32, u32, u32);

/// How to find a library and its version in a script URL
struct Library {
    name: &'static str,
    /// Regex over the lowercased URL, first group captures the version
    pattern: &'static str,
    /// Replacement URL suggested in the remediation
    upgrade_src: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advisory {
    Cve(&'static str),
    EndOfLife,
}

/// A vulnerable version range of one library
struct VulnerableRange {
    library: &'static str,
    /// Inclusive
    from: Version,
    /// Exclusive
    below: Version,
    advisory: Advisory,
    summary: &'static str,
    fixed_in: &'static str,
}

const LIBRARIES: &[Library] = &[
    Library {
        name: "jQuery",
        pattern: r"jquery(?:\.min)?[/@-]v?(\d+\.\d+(?:\.\d+)?)",
        upgrade_src: "https://code.jquery.com/jquery-3.7.1.min.js",
    },
    Library {
        name: "Bootstrap",
        pattern: r"bootstrap[/@-]v?(\d+\.\d+(?:\.\d+)?)",
        upgrade_src: "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js",
    },
    Library {
        name: "AngularJS",
        pattern: r"angular(?:js|\.js)?[/@-]v?(1\.\d+(?:\.\d+)?)",
        upgrade_src: "https://cdn.jsdelivr.net/npm/@angular/core@latest",
    },
    Library {
        name: "Lodash",
        pattern: r"lodash(?:\.js)?[/@-]v?(\d+\.\d+(?:\.\d+)?)",
        upgrade_src: "https://cdn.jsdelivr.net/npm/lodash@4.17.21/lodash.min.js",
    },
    Library {
        name: "Moment.js",
        pattern: r"moment(?:\.js)?[/@-]v?(\d+\.\d+(?:\.\d+)?)",
        upgrade_src: "https://cdn.jsdelivr.net/npm/moment@2.30.1/moment.min.js",
    },
    Library {
        name: "Handlebars",
        pattern: r"handlebars(?:\.js)?[/@-]v?(\d+\.\d+(?:\.\d+)?)",
        upgrade_src: "https://cdn.jsdelivr.net/npm/handlebars@4.7.8/dist/handlebars.min.js",
    },
    Library {
        name: "Vue.js",
        // Anchored so `bootstrap-vue@2.x` is not read as Vue itself
        pattern: r"(?:^|[/@])vue(?:\.js)?[/@-]v?(2\.\d+(?:\.\d+)?)",
        upgrade_src: "https://unpkg.com/vue@3/dist/vue.global.prod.js",
    },
];

const RANGES: &[VulnerableRange] = &[
    VulnerableRange {
        library: "jQuery",
        from: (0, 0, 0),
        below: (3, 5, 0),
        advisory: Advisory::Cve("CVE-2020-11022"),
        summary: "XSS through jQuery.htmlPrefilter when passing untrusted HTML to DOM manipulation methods",
        fixed_in: "3.5.0",
    },
    VulnerableRange {
        library: "Bootstrap",
        from: (0, 0, 0),
        below: (3, 4, 1),
        advisory: Advisory::Cve("CVE-2019-8331"),
        summary: "XSS in the tooltip/popover data-template attribute",
        fixed_in: "3.4.1",
    },
    VulnerableRange {
        library: "Bootstrap",
        from: (4, 0, 0),
        below: (4, 3, 1),
        advisory: Advisory::Cve("CVE-2019-8331"),
        summary: "XSS in the tooltip/popover data-template attribute",
        fixed_in: "4.3.1",
    },
    VulnerableRange {
        library: "Bootstrap",
        from: (3, 4, 1),
        below: (4, 0, 0),
        advisory: Advisory::EndOfLife,
        summary: "Bootstrap 3 reached end of life and receives no security fixes",
        fixed_in: "5.x",
    },
    VulnerableRange {
        library: "AngularJS",
        from: (1, 0, 0),
        below: (1, 8, 0),
        advisory: Advisory::Cve("CVE-2020-7676"),
        summary: "XSS through regex-based HTML sanitization in jqLite/jQuery wrappers",
        fixed_in: "1.8.0",
    },
    VulnerableRange {
        library: "AngularJS",
        from: (1, 8, 0),
        below: (2, 0, 0),
        advisory: Advisory::EndOfLife,
        summary: "AngularJS reached end of life in January 2022",
        fixed_in: "Angular 2+",
    },
    VulnerableRange {
        library: "Lodash",
        from: (0, 0, 0),
        below: (4, 17, 21),
        advisory: Advisory::Cve("CVE-2021-23337"),
        summary: "Command injection through the template function",
        fixed_in: "4.17.21",
    },
    VulnerableRange {
        library: "Moment.js",
        from: (0, 0, 0),
        below: (2, 29, 4),
        advisory: Advisory::Cve("CVE-2022-31129"),
        summary: "ReDoS in RFC 2822 date parsing",
        fixed_in: "2.29.4",
    },
    VulnerableRange {
        library: "Handlebars",
        from: (0, 0, 0),
        below: (4, 7, 7),
        advisory: Advisory::Cve("CVE-2021-23369"),
        summary: "Remote code execution when compiling untrusted templates",
        fixed_in: "4.7.7",
    },
    VulnerableRange {
        library: "Vue.js",
        from: (2, 0, 0),
        below: (3, 0, 0),
        advisory: Advisory::EndOfLife,
        summary: "Vue 2 reached end of life on December 31st, 2023",
        fixed_in: "3.x",
    },
];

fn compiled_libraries() -> &'static [(Regex, &'static Library)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static Library)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        LIBRARIES
            .iter()
            .map(|lib| (Regex::new(lib.pattern).expect("valid library pattern"), lib))
            .collect()
    })
}

/// Supply chain rule
pub struct SupplyChainRule;

impl SupplyChainRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupplyChainRule {
    fn default() -> Self {
        Self::new()
    }
}

impl PassiveRule for SupplyChainRule {
    type Output = Vec<AnalysisResult>;

    fn name(&self) -> &'static str {
        "Supply Chain"
    }

    fn analyze(&self, response: &Response) -> Self::Output {
        analyze_scripts(&response.body, &response.url)
    }
}

/// Check every script source in `html`; relative sources resolve against `base_url`
pub fn analyze_scripts(html: &str, base_url: &str) -> Vec<AnalysisResult> {
    let sources = extract_script_sources(html, base_url);
    if sources.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<AnalysisResult> = sources.iter().filter_map(|src| check_source(src)).collect();

    if results.is_empty() {
        results.push(
            AnalysisResult::info(format!(
                "No known vulnerable libraries among {} external script(s)",
                sources.len()
            ))
            .with_details("Checked against a small static library table; this is not an exhaustive audit."),
        );
    }

    results
}

/// Unique `<script src>` values in document order
pub fn extract_script_sources(html: &str, base_url: &str) -> Vec<String> {
    let base = url::Url::parse(base_url).ok();
    let document = scraper::Html::parse_document(html);
    let Ok(selector) = scraper::Selector::parse("script[src]") else {
        return Vec::new();
    };

    let mut sources: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src").map(str::trim) else {
            continue;
        };
        if src.is_empty() {
            continue;
        }
        let resolved = match &base {
            Some(base) => base
                .join(src)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| src.to_string()),
            None => src.to_string(),
        };
        if !sources.contains(&resolved) {
            sources.push(resolved);
        }
    }

    sources
}

fn check_source(src: &str) -> Option<AnalysisResult> {
    let lowered = src.to_lowercase();

    for (regex, library) in compiled_libraries() {
        let Some(captures) = regex.captures(&lowered) else {
            continue;
        };
        let Some(version) = captures.get(1).and_then(|m| parse_version(m.as_str())) else {
            continue;
        };

        // A patched library does not end the search; the URL may name another
        let Some(range) = RANGES
            .iter()
            .filter(|r| r.library == library.name)
            .find(|r| version >= r.from && version < r.below)
        else {
            continue;
        };

        tracing::debug!(library = library.name, version = ?version, src, "Vulnerable library matched");
        return Some(to_result(library, range, version, src));
    }

    None
}

fn to_result(library: &Library, range: &VulnerableRange, version: Version, src: &str) -> AnalysisResult {
    let version = format!("{}.{}.{}", version.0, version.1, version.2);
    let remediation = format!(
        "Upgrade {} to {} or later:\n<script src=\"{}\"></script>",
        library.name, range.fixed_in, library.upgrade_src
    );

    let result = match range.advisory {
        Advisory::Cve(id) => AnalysisResult::fail(format!(
            "{} {} is vulnerable ({}): {}",
            library.name, version, id, range.summary
        ))
        .with_score(CVE_SCORE),
        Advisory::EndOfLife => AnalysisResult::warning(format!(
            "{} {} is end-of-life: {}",
            library.name, version, range.summary
        ))
        .with_score(EOL_SCORE),
    };

    result.with_details(src).with_remediation(remediation)
}

fn parse_version(raw: &str) -> Option<Version> {
    let mut parts = raw.split('.').map(|p| p.parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}
