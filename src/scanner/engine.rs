//! Scan engine orchestration

use std::time::Instant;

use super::active::{ContentDiscoveryProbe, RobotsAnalyzer, SslAnalyzer};
use super::findings::AnalysisResult;
use super::passive::{
    CookieSecurityRule, PassiveRule, SecurityHeadersRule, SupplyChainRule, TechFingerprintRule,
};
use super::report::{GeneralInfo, Report, ScanRequest, ScanResponse, ScanType};
use super::scoring::RiskScorer;
use crate::app::Config;
use crate::error::{AnalysisError, SiteguardError};
use crate::http::{HttpClient, Probe, Prober, Resolver, Response};

/// Lifecycle of a single scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Probing,
    Analyzing(ScanType),
    Scoring,
    Done,
    Failed,
}

impl ScanState {
    /// Whether `next` may follow `self`
    pub fn can_transition_to(&self, next: ScanState) -> bool {
        matches!(
            (self, next),
            (ScanState::Idle, ScanState::Probing)
                | (ScanState::Idle, ScanState::Failed)
                | (ScanState::Probing, ScanState::Analyzing(_))
                | (ScanState::Probing, ScanState::Failed)
                | (ScanState::Analyzing(_), ScanState::Scoring)
                | (ScanState::Scoring, ScanState::Done)
        )
    }
}

/// Per-scan state tracker; never shared between scans
#[derive(Debug)]
struct ScanRun {
    state: ScanState,
    started: Instant,
}

impl ScanRun {
    fn new() -> Self {
        Self {
            state: ScanState::Idle,
            started: Instant::now(),
        }
    }

    fn transition(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal scan transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "Scan state");
        self.state = next;
    }
}

/// Main scan engine
///
/// Holds only immutable configuration and clients; every call to
/// [`ScanEngine::scan`] builds its own report.
pub struct ScanEngine {
    config: Config,
    client: HttpClient,
    prober: Prober,
    headers: SecurityHeadersRule,
    cookies: CookieSecurityRule,
    tech: TechFingerprintRule,
    supply_chain: SupplyChainRule,
}

impl ScanEngine {
    /// Create a new scan engine
    pub fn new(config: &Config) -> Result<Self, SiteguardError> {
        config.validate()?;

        let client = HttpClient::new(config)?;
        let prober = Prober::new(client.clone(), Resolver::new(config));

        Ok(Self {
            config: config.clone(),
            client,
            prober,
            headers: SecurityHeadersRule::new(),
            cookies: CookieSecurityRule::new(),
            tech: TechFingerprintRule::new(),
            supply_chain: SupplyChainRule::new(),
        })
    }

    /// Boundary entry point: always answers with the success/failure envelope
    pub async fn handle(&self, request: ScanRequest) -> ScanResponse {
        let scan_type = request
            .scan_type
            .unwrap_or(self.config.scanner.default_scan_type);

        match self.scan(&request.url, scan_type).await {
            Ok(report) => ScanResponse::ok(report),
            Err(e) => ScanResponse::failed(e.user_message()),
        }
    }

    /// Run one scan
    pub async fn scan(&self, target: &str, scan_type: ScanType) -> Result<Report, SiteguardError> {
        let mut run = ScanRun::new();

        let url = match parse_target(target) {
            Ok(url) => url,
            Err(e) => {
                run.transition(ScanState::Failed);
                return Err(e);
            }
        };

        tracing::info!(url = %url, scan_type = %scan_type, "Starting scan");

        run.transition(ScanState::Probing);
        let probe = match self
            .prober
            .probe(&url, self.config.scanner.request_timeout())
            .await
        {
            Ok(probe) => probe,
            Err(e) => {
                run.transition(ScanState::Failed);
                let err = SiteguardError::from_probe(url.as_str(), e);
                tracing::warn!(url = %url, error = %err, "Primary probe failed");
                return Err(err);
            }
        };

        run.transition(ScanState::Analyzing(scan_type));
        let mut report = Report::new(general_info(&url, &probe));
        let response = &probe.response;

        report.headers = run_rule(&self.headers, response);
        report.cookies = run_rule(&self.cookies, response);
        report.tech = run_rule(&self.tech, response);

        match scan_type {
            ScanType::Quick => {
                report.robots = absorb(self.robots().analyze(&url).await);
            }
            ScanType::Deep => {
                report.supply_chain = Some(run_rule(&self.supply_chain, response));

                let robots = self.robots();
                let ssl = SslAnalyzer::new(self.client.clone(), self.config.scanner.ssl_timeout());
                let discovery = ContentDiscoveryProbe::new(
                    self.client.clone(),
                    self.config.discovery.candidate_paths.clone(),
                    self.config.scanner.path_timeout(),
                    self.config.scanner.max_concurrency,
                );

                let (robots, ssl, content) = tokio::join!(
                    robots.analyze(&url),
                    ssl.analyze(&url),
                    discovery.run(&url),
                );

                report.robots = absorb(robots);
                report.ssl = Some(ssl);
                report.content = Some(content);
            }
        }

        run.transition(ScanState::Scoring);
        RiskScorer::finalize(&mut report);

        run.transition(ScanState::Done);
        tracing::info!(
            url = %url,
            scan_type = %scan_type,
            risk_score = report.risk_score,
            duration_ms = run.started.elapsed().as_millis() as u64,
            "Scan complete"
        );

        Ok(report)
    }

    fn robots(&self) -> RobotsAnalyzer {
        RobotsAnalyzer::new(self.client.clone(), self.config.scanner.robots_timeout())
    }
}

fn run_rule<R: PassiveRule>(rule: &R, response: &Response) -> R::Output {
    let output = rule.analyze(response);
    tracing::debug!(analyzer = rule.name(), "Passive analysis complete");
    output
}

/// Degrade an analyzer failure to an empty field
fn absorb(result: Result<AnalysisResult, AnalysisError>) -> Option<AnalysisResult> {
    match result {
        Ok(finding) => Some(finding),
        Err(e) => {
            tracing::warn!(analyzer = e.analyzer(), error = %e, "Analyzer degraded");
            None
        }
    }
}

fn general_info(url: &url::Url, probe: &Probe) -> GeneralInfo {
    GeneralInfo {
        status: probe.status(),
        url: url.to_string(),
        duration: format!("{}ms", probe.elapsed_ms()),
        size: probe.response.size,
        ip: probe.ip.map(|ip| ip.to_string()),
    }
}

/// Validate a scan target before any network call
pub fn parse_target(target: &str) -> Result<url::Url, SiteguardError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(SiteguardError::InvalidInput("URL is empty".into()));
    }

    let url = url::Url::parse(target)
        .map_err(|e| SiteguardError::InvalidInput(format!("'{}': {}", target, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SiteguardError::InvalidInput(format!(
            "'{}': scheme must be http or https",
            target
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(SiteguardError::InvalidInput(format!("'{}': missing host", target)));
    }

    Ok(url)
}
