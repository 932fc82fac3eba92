//! Analysis results

use serde::{Deserialize, Serialize};

/// Outcome class of a single check
///
/// Ordered by display severity only; scoring reads [`AnalysisResult::score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Info,
    Warning,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Info => "info",
            Status::Warning => "warning",
            Status::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The atomic finding unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: Status,

    /// Human-readable summary
    pub message: String,

    /// Raw evidence (header value, matched path, certificate note)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Points this finding deducts from the risk score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,

    /// Ready-to-apply configuration snippet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl AnalysisResult {
    /// Create a new result
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            score: None,
            remediation: None,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Status::Pass, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Status::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Status::Warning, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    /// Builder pattern methods
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    /// Deduction contributed to the risk score
    pub fn deduction(&self) -> u32 {
        self.score.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let result = AnalysisResult::info("Server banner: nginx");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "info");
        assert!(json.get("score").is_none());
        assert!(json.get("remediation").is_none());
        assert_eq!(result.deduction(), 0);
    }

    #[test]
    fn test_builder() {
        let result = AnalysisResult::fail("HSTS missing")
            .with_score(20)
            .with_details("Strict-Transport-Security not set")
            .with_remediation("add_header Strict-Transport-Security \"max-age=31536000\";");

        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.deduction(), 20);
        assert!(result.details.is_some());
    }
}
