//! robots.txt summary

use std::time::Duration;

use crate::error::AnalysisError;
use crate::http::HttpClient;
use crate::scanner::findings::AnalysisResult;

/// Number of disallowed paths quoted in the finding
const PREVIEW_LEN: usize = 5;

/// robots.txt analyzer
pub struct RobotsAnalyzer {
    client: HttpClient,
    timeout: Duration,
}

impl RobotsAnalyzer {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetch `/robots.txt` from the origin of `base` and summarize it
    pub async fn analyze(&self, base: &url::Url) -> Result<AnalysisResult, AnalysisError> {
        let target = base
            .join("/robots.txt")
            .map_err(|e| AnalysisError::Other {
                analyzer: "robots",
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .get(target.as_str(), self.timeout)
            .await
            .map_err(|e| AnalysisError::network("robots", e))?;

        if !response.is_success() {
            return Err(AnalysisError::UnexpectedStatus {
                analyzer: "robots",
                status: response.status,
            });
        }

        Ok(summarize(&response.body))
    }
}

/// Disallow rule values in file order
pub fn disallow_rules(robots: &str) -> Vec<&str> {
    robots
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case("disallow").then_some(value)
        })
        // Strip trailing comments; an empty value disallows nothing
        .map(|value| value.split('#').next().unwrap_or("").trim())
        .filter(|value| !value.is_empty())
        .collect()
}

pub fn summarize(robots: &str) -> AnalysisResult {
    let rules = disallow_rules(robots);

    if rules.is_empty() {
        return AnalysisResult::warning("robots.txt has no Disallow rules");
    }

    let preview = rules
        .iter()
        .take(PREVIEW_LEN)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let details = if rules.len() > PREVIEW_LEN {
        format!("{}, ... ({} more)", preview, rules.len() - PREVIEW_LEN)
    } else {
        preview
    };

    AnalysisResult::info(format!("robots.txt lists {} disallowed path(s)", rules.len()))
        .with_details(details)
}
