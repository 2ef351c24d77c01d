//! Template substitution error types.

/// Specific error conditions for template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TemplateErrorKind {
    /// A `${name}` marker has no corresponding key in the variables mapping
    #[display("No value supplied for placeholder '${{{}}}'", _0)]
    MissingVariable(String),
    /// The requested template id is not in the store
    #[display("Unknown prompt template '{}'", _0)]
    UnknownTemplate(String),
}

/// Error type for template store operations.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{TemplateError, TemplateErrorKind};
///
/// let err = TemplateError::new(TemplateErrorKind::MissingVariable("title".into()));
/// assert!(format!("{}", err).contains("title"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Template Error: {} at line {} in {}", kind, line, file)]
pub struct TemplateError {
    /// The specific error condition
    pub kind: TemplateErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TemplateError {
    /// Create a new TemplateError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TemplateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for the missing-variable case.
    #[track_caller]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::MissingVariable(name.into()))
    }
}
