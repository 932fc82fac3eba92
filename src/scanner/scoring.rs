//! Risk score reduction

use super::report::Report;

/// Score of a report with no deductions
pub const MAX_SCORE: u32 = 100;

/// Reduces every scored finding of a report into one 0-100 number.
///
/// Tech and robots findings never count. Pure and order independent.
pub struct RiskScorer;

impl RiskScorer {
    pub fn score(report: &Report) -> u8 {
        let deductions: u32 = report
            .scored_findings()
            .map(|f| f.deduction())
            .fold(0u32, u32::saturating_add);

        MAX_SCORE.saturating_sub(deductions) as u8
    }

    /// Score and store the result on the report
    pub fn finalize(report: &mut Report) {
        report.risk_score = Self::score(report);
    }
}
