//! Content discovery
//!
//! HEAD-probes a fixed list of sensitive paths concurrently. Redirects are
//! not followed and per-path failures are dropped.

use futures::stream::{self, StreamExt};
use std::time::Duration;

use crate::http::{HttpClient, Redirects};
use crate::scanner::findings::AnalysisResult;
use crate::scanner::remediation;

/// Deduction for an exposed dotfile (`.env`, `.git`)
const DOTFILE_SCORE: u32 = 15;

/// Statuses that prove something lives at the path
const EXPOSED_STATUSES: [u16; 3] = [200, 401, 403];

/// Content discovery probe
pub struct ContentDiscoveryProbe {
    client: HttpClient,
    paths: Vec<String>,
    timeout: Duration,
    concurrency: usize,
}

impl ContentDiscoveryProbe {
    pub fn new(client: HttpClient, paths: Vec<String>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            client,
            paths,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every candidate under the origin of `base`.
    ///
    /// Results keep candidate-list order.
    pub async fn run(&self, base: &url::Url) -> Vec<AnalysisResult> {
        let findings: Vec<Option<AnalysisResult>> = stream::iter(self.paths.iter())
            .map(|path| self.probe_path(base, path))
            .buffered(self.concurrency)
            .collect()
            .await;

        findings.into_iter().flatten().collect()
    }

    async fn probe_path(&self, base: &url::Url, path: &str) -> Option<AnalysisResult> {
        let target = base.join(path).ok()?;

        let response = match self
            .client
            .head(target.as_str(), self.timeout, Redirects::Manual)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(path, error = %e, "Candidate probe failed");
                return None;
            }
        };

        let status = response.status;
        if !EXPOSED_STATUSES.contains(&status) {
            return None;
        }

        tracing::debug!(path, status, "Candidate path exposed");
        Some(classify(path, status))
    }
}

fn classify(path: &str, status: u16) -> AnalysisResult {
    let details = format!("{} (HTTP {})", path, status);

    if path.contains(".env") || path.contains(".git") {
        return AnalysisResult::fail(format!("Sensitive file exposed: {}", path))
            .with_details(details)
            .with_score(DOTFILE_SCORE)
            .with_remediation(remediation::DENY_DOTFILES);
    }

    let message = match status {
        200 => format!("Accessible path found: {}", path),
        _ => format!("Protected path found: {}", path),
    };
    AnalysisResult::info(message)
        .with_details(details)
        .with_remediation(remediation::RESTRICT_PANEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use crate::scanner::findings::Status;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn probe(paths: &[&str]) -> ContentDiscoveryProbe {
        let config = Config::default();
        ContentDiscoveryProbe::new(
            HttpClient::new(&config).unwrap(),
            paths.iter().map(|p| p.to_string()).collect(),
            Duration::from_millis(500),
            4,
        )
    }

    #[test]
    fn test_classify_dotfiles_fail() {
        let env = classify("/.env", 200);
        assert_eq!(env.status, Status::Fail);
        assert_eq!(env.score, Some(15));

        let git = classify("/.git/config", 403);
        assert_eq!(git.status, Status::Fail);
        assert_eq!(git.details.as_deref(), Some("/.git/config (HTTP 403)"));
    }

    #[test]
    fn test_classify_other_paths_info() {
        let admin = classify("/admin", 401);
        assert_eq!(admin.status, Status::Info);
        assert_eq!(admin.score, None);
        assert!(admin.message.contains("Protected"));
    }

    #[tokio::test]
    async fn test_only_exposed_statuses_are_reported() {
        let server = MockServer::start().await;
        for (p, status) in [("/admin", 403), ("/.env", 200), ("/login", 302), ("/api", 500)] {
            Mock::given(method("HEAD"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
        }

        let base = url::Url::parse(&server.uri()).unwrap();
        let results = probe(&["/admin", "/login", "/.env", "/api", "/backup"]).run(&base).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].details.as_deref(), Some("/admin (HTTP 403)"));
        assert_eq!(results[1].status, Status::Fail);
    }

    #[tokio::test]
    async fn test_slow_candidate_does_not_cancel_siblings() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/backup"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/swagger.json"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let base = url::Url::parse(&server.uri()).unwrap();
        let results = probe(&["/backup", "/swagger.json"]).run(&base).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].message.contains("/swagger.json"));
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty() {
        let base = url::Url::parse("http://127.0.0.1:1/").unwrap();
        assert!(probe(&["/admin", "/.env"]).run(&base).await.is_empty());
    }
}
