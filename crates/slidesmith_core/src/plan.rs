//! Slide composition plan (Stage 2).

use serde::{Deserialize, Serialize};

/// One chosen slide template with the model's justification.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct PlanEntry {
    /// Name of the chosen template; must exist in the catalog
    template_name: String,
    /// Why the model chose this template at this position
    #[serde(default)]
    reason: String,
}

impl PlanEntry {
    /// Create a new plan entry.
    pub fn new(template_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            reason: reason.into(),
        }
    }
}

/// Ordered list of chosen slide templates for a script.
///
/// Ordering is the presentation order exactly as the model returned it; no
/// reordering heuristic is applied downstream. Duplicate template names are
/// allowed (e.g. several content slides).
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct CompositionPlan {
    /// Summary of the composition strategy
    #[serde(default)]
    strategy: String,
    /// Ordered plan entries
    slides: Vec<PlanEntry>,
}

impl CompositionPlan {
    /// Create a new composition plan.
    pub fn new(strategy: impl Into<String>, slides: Vec<PlanEntry>) -> Self {
        Self {
            strategy: strategy.into(),
            slides,
        }
    }

    /// Number of planned slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the plan has no entries.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
