//! Top-level error wrapper types.

use crate::{CatalogError, PipelineError, ResponseError, TemplateError};

/// The foundation error enum for the slidesmith workspace.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{SlidesmithError, TemplateError, TemplateErrorKind};
///
/// let template_err = TemplateError::missing("title");
/// let err: SlidesmithError = template_err.into();
/// assert!(format!("{}", err).contains("title"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum SlidesmithErrorKind {
    /// Template substitution error
    #[from(TemplateError)]
    Template(TemplateError),
    /// Structured response parsing error
    #[from(ResponseError)]
    Response(ResponseError),
    /// Slide catalog loading or validation error
    #[from(CatalogError)]
    Catalog(CatalogError),
    /// Pipeline stage error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Renderer subprocess error
    #[from(std::io::Error)]
    Io(std::io::Error),
}

/// Slidesmith error with kind discrimination.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{SlidesmithResult, ResponseError};
///
/// fn might_fail() -> SlidesmithResult<()> {
///     Err(ResponseError::malformed("no JSON object found"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Slidesmith Error: {}", _0)]
pub struct SlidesmithError(Box<SlidesmithErrorKind>);

impl SlidesmithError {
    /// Create a new error from a kind.
    pub fn new(kind: SlidesmithErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SlidesmithErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to SlidesmithErrorKind
impl<T> From<T> for SlidesmithError
where
    T: Into<SlidesmithErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for slidesmith operations.
pub type SlidesmithResult<T> = std::result::Result<T, SlidesmithError>;
