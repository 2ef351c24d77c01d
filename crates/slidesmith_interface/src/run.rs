//! Pipeline run-result types.
//!
//! These are shared between the executor (in slidesmith_pipeline) and
//! callers that inspect the outcome of a run.

use serde::{Deserialize, Serialize};
use slidesmith_core::{AnalysisResult, CompositionPlan, Deck, ValidationReport};

/// Pipeline stages in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Stage {
    /// Stage 1: script analysis
    Analyze,
    /// Stage 2: slide composition
    Compose,
    /// Stage 3: per-slide parameter generation
    GenerateParameters,
    /// Template rendering
    Render,
    /// Stage 4: content validation
    Validate,
    /// Optional regeneration pass after a rejected validation
    Regenerate,
}

/// Raw prompt/response record for one stage invocation.
///
/// Kept for diagnostics; the parsed, validated output of each stage lives in
/// the typed fields of [`PipelineRun`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Which stage produced this trace
    pub stage: Stage,
    /// The exact prompt sent to the driver
    pub prompt: String,
    /// The raw response text
    pub response: String,
    /// Position in the invocation sequence (0-indexed)
    pub sequence_number: usize,
}

/// A non-fatal problem collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    /// Stage that raised the warning
    pub stage: Stage,
    /// Template name the warning concerns, when slide-scoped
    pub template_name: Option<String>,
    /// Diagnostic text
    pub message: String,
}

/// Complete result of a successful pipeline run.
///
/// A run either completes with a deck (possibly with fewer slides than
/// planned, plus warnings) or fails with a stage-tagged error; it never
/// returns a deck containing unresolved required placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// The final deck
    pub deck: Deck,
    /// The script analysis the deck was built from
    pub analysis: AnalysisResult,
    /// The composition plan after unknown-name filtering
    pub plan: CompositionPlan,
    /// The last validation report; `None` when the validation call itself
    /// failed (recorded as a warning)
    pub report: Option<ValidationReport>,
    /// Non-fatal problems collected along the way
    pub warnings: Vec<RunWarning>,
    /// Raw prompt/response traces in invocation order
    pub traces: Vec<StageTrace>,
}
