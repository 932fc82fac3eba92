//! Security posture scanner
//!
//! Passive analyzers read the primary response; active analyzers issue
//! their own bounded requests. The engine sequences both by scan mode and
//! the scorer reduces the result to one number.

mod engine;
mod findings;
mod remediation;
mod report;
mod scoring;
pub mod active;
pub mod passive;

pub use engine::{parse_target, ScanEngine, ScanState};
pub use findings::{AnalysisResult, Status};
pub use report::{GeneralInfo, Report, ScanRequest, ScanResponse, ScanType};
pub use scoring::{RiskScorer, MAX_SCORE};
