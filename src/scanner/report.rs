//! Scan report and the request/response envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::findings::AnalysisResult;

/// Scan mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Headers, cookies, fingerprinting and robots.txt
    #[default]
    Quick,
    /// Quick checks plus SSL, content discovery and supply chain
    Deep,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Quick => "quick",
            ScanType::Deep => "deep",
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts captured once from the primary probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    /// HTTP status of the primary response
    pub status: u16,
    pub url: String,
    /// Primary probe latency, e.g. `"182ms"`
    pub duration: String,
    /// Body size in bytes
    pub size: usize,
    pub ip: Option<String>,
}

/// Aggregate output of one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub general: GeneralInfo,

    /// Header check name to result; always the full fixed key set
    pub headers: BTreeMap<String, AnalysisResult>,

    pub cookies: Vec<AnalysisResult>,

    pub tech: Vec<AnalysisResult>,

    /// `None` when robots.txt could not be fetched
    pub robots: Option<AnalysisResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AnalysisResult>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<AnalysisResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_chain: Option<Vec<AnalysisResult>>,

    /// 0-100, higher is safer
    pub risk_score: u8,
}

impl Report {
    /// Fresh report with only the probe facts filled in
    pub fn new(general: GeneralInfo) -> Self {
        Self {
            general,
            headers: BTreeMap::new(),
            cookies: Vec::new(),
            tech: Vec::new(),
            robots: None,
            content: None,
            ssl: None,
            supply_chain: None,
            risk_score: 100,
        }
    }

    /// Every finding that can carry a deduction
    pub fn scored_findings(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.headers
            .values()
            .chain(self.cookies.iter())
            .chain(self.ssl.iter())
            .chain(self.content.iter().flatten())
            .chain(self.supply_chain.iter().flatten())
    }
}

/// Boundary request from the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub url: String,
    #[serde(default)]
    pub scan_type: Option<ScanType>,
}

/// Boundary response: `{success, report}` or `{success, error}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResponse {
    pub fn ok(report: Report) -> Self {
        Self {
            success: true,
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            report: None,
            error: Some(error.into()),
        }
    }
}
