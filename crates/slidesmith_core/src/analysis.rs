//! Script analysis output (Stage 1).

use serde::{Deserialize, Serialize};

/// Structured analysis of a narration script.
///
/// Produced by the Script Analyzer and consumed read-only by every later
/// stage. All five fields are required; `key_points` must be non-empty
/// (enforced at parse time, before this value is constructed).
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct AnalysisResult {
    /// Main theme of the presentation
    main_theme: String,
    /// Ordered key points extracted from the script
    key_points: Vec<String>,
    /// Intended audience description
    target_audience: String,
    /// Presentation style (e.g. "technical", "executive summary")
    presentation_style: String,
    /// High-level content structure summary
    content_structure: String,
}

impl AnalysisResult {
    /// Create a new analysis result.
    pub fn new(
        main_theme: impl Into<String>,
        key_points: Vec<String>,
        target_audience: impl Into<String>,
        presentation_style: impl Into<String>,
        content_structure: impl Into<String>,
    ) -> Self {
        Self {
            main_theme: main_theme.into(),
            key_points,
            target_audience: target_audience.into(),
            presentation_style: presentation_style.into(),
            content_structure: content_structure.into(),
        }
    }
}
