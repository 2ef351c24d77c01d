//! Structured response parsing error types.

/// Specific error conditions when parsing LLM responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ResponseErrorKind {
    /// No balanced JSON object could be located or parsed in the raw text
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),
    /// A JSON object parsed but is missing required keys for the stage schema
    #[display("Schema violation: {}", _0)]
    SchemaViolation(String),
}

impl ResponseErrorKind {
    /// Whether this condition is eligible for a single corrective retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResponseErrorKind::MalformedResponse(_) | ResponseErrorKind::SchemaViolation(_)
        )
    }
}

/// Error type for structured response parsing.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{ResponseError, ResponseErrorKind};
///
/// let err = ResponseError::new(ResponseErrorKind::SchemaViolation(
///     "missing keys: key_points".to_string(),
/// ));
/// assert!(format!("{}", err).contains("key_points"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Response Error: {} at line {} in {}", kind, line, file)]
pub struct ResponseError {
    /// The specific error condition
    pub kind: ResponseErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ResponseError {
    /// Create a new ResponseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ResponseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for the malformed-response case.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ResponseErrorKind::MalformedResponse(message.into()))
    }

    /// Shorthand for the schema-violation case.
    #[track_caller]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ResponseErrorKind::SchemaViolation(message.into()))
    }
}
