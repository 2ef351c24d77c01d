//! Content validation report (Stage 4).

use serde::{Deserialize, Serialize};

/// Quality scores and improvement suggestions for a rendered deck.
///
/// Scores are on a 1..=10 scale (clamped at parse time). The report is
/// advisory: after the single regeneration pass it is surfaced to the caller
/// regardless of `approved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ValidationReport {
    /// Factual accuracy score
    accuracy: u8,
    /// Clarity score
    clarity: u8,
    /// Completeness score
    completeness: u8,
    /// Combined score
    overall_score: f32,
    /// Ordered improvement suggestions
    improvements: Vec<String>,
    /// Whether the validator approved the deck as-is
    approved: bool,
}

impl ValidationReport {
    /// Create a new validation report, clamping scores into 1..=10.
    pub fn new(
        accuracy: u8,
        clarity: u8,
        completeness: u8,
        overall_score: f32,
        improvements: Vec<String>,
        approved: bool,
    ) -> Self {
        Self {
            accuracy: accuracy.clamp(1, 10),
            clarity: clarity.clamp(1, 10),
            completeness: completeness.clamp(1, 10),
            overall_score: overall_score.clamp(1.0, 10.0),
            improvements,
            approved,
        }
    }
}
