//! Pipeline stage error types.

/// Specific error conditions for pipeline execution.
///
/// Fatal variants abort the run; `ParameterGenerationFailed` is per-slide
/// and collected as a warning; `RenderFailed` is an internal invariant
/// violation that is surfaced, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Script analysis failed after the corrective retry (fatal)
    #[display("Script analysis failed: {}", _0)]
    AnalysisFailed(String),
    /// Composition produced no valid plan entries (fatal)
    #[display("Slide composition failed: {}", _0)]
    CompositionFailed(String),
    /// Parameter generation failed for one slide (isolated)
    #[display("Parameter generation failed for slide '{}': {}", slide, message)]
    ParameterGenerationFailed {
        /// Template name of the failed slide
        slide: String,
        /// Diagnostic text
        message: String,
    },
    /// A required placeholder was still unresolved at render time
    #[display("Render failed: {}", _0)]
    RenderFailed(String),
}

impl PipelineErrorKind {
    /// The stage that originated this error, for stage-tagged diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineErrorKind::AnalysisFailed(_) => "Analyze",
            PipelineErrorKind::CompositionFailed(_) => "Compose",
            PipelineErrorKind::ParameterGenerationFailed { .. } => "GenerateParameters",
            PipelineErrorKind::RenderFailed(_) => "Render",
        }
    }

    /// Whether this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineErrorKind::ParameterGenerationFailed { .. })
    }
}

/// Error type for pipeline execution.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::AnalysisFailed(
///     "missing keys after retry".to_string(),
/// ));
/// assert_eq!(err.kind.stage(), "Analyze");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error [{}]: {} at line {} in {}", kind.stage(), kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
