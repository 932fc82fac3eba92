//! HTTPS reachability and HSTS posture

use std::time::Duration;

use crate::http::{HttpClient, Redirects, Response};
use crate::scanner::findings::AnalysisResult;
use crate::scanner::remediation;

/// Deduction for serving over plain HTTP
const PLAINTEXT_SCORE: u32 = 50;

/// SSL analyzer
pub struct SslAnalyzer {
    client: HttpClient,
    timeout: Duration,
}

impl SslAnalyzer {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Always yields one finding.
    ///
    /// A missing HSTS header is never scored here; the header check owns it.
    pub async fn analyze(&self, url: &url::Url) -> AnalysisResult {
        if url.scheme() != "https" {
            return AnalysisResult::warning("Site is served over plain HTTP")
                .with_details("Traffic can be read and modified in transit.")
                .with_score(PLAINTEXT_SCORE)
                .with_remediation(remediation::HTTPS_REDIRECT);
        }

        match self
            .client
            .head(url.as_str(), self.timeout, Redirects::Manual)
            .await
        {
            Ok(response) => classify_https(&response),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "HTTPS probe failed");
                AnalysisResult::fail("SSL/TLS connection failed").with_details(e.to_string())
            }
        }
    }
}

/// Finding for a completed HTTPS exchange; never carries a score
pub fn classify_https(response: &Response) -> AnalysisResult {
    match response.header("strict-transport-security") {
        Some(hsts) => {
            AnalysisResult::pass("HTTPS is reachable and HSTS is enforced").with_details(hsts)
        }
        None => AnalysisResult::pass("HTTPS is reachable")
            .with_details("No Strict-Transport-Security header on the HTTPS response."),
    }
}
