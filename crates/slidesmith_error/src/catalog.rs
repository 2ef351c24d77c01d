//! Slide catalog loading and validation error types.

/// Specific error conditions for slide catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CatalogErrorKind {
    /// Failed to read a catalog file
    #[display("Failed to read catalog file: {}", _0)]
    FileRead(String),
    /// Failed to parse TOML content
    #[display("Failed to parse catalog TOML: {}", _0)]
    TomlParse(String),
    /// Catalog contains no slide descriptors
    #[display("Catalog '{}' contains no slide templates", _0)]
    EmptyCatalog(String),
    /// Two descriptors share a name
    #[display("Duplicate slide template name '{}'", _0)]
    DuplicateName(String),
    /// A required placeholder never appears in the descriptor body
    #[display(
        "Template '{}' declares required placeholder '{}' absent from its body",
        template,
        placeholder
    )]
    UndeclaredPlaceholder {
        /// Descriptor name
        template: String,
        /// The missing placeholder
        placeholder: String,
    },
    /// A descriptor body is empty or whitespace
    #[display("Template '{}' has an empty body", _0)]
    EmptyBody(String),
}

/// Error type for slide catalog operations.
///
/// # Examples
///
/// ```
/// use slidesmith_error::{CatalogError, CatalogErrorKind};
///
/// let err = CatalogError::new(CatalogErrorKind::DuplicateName("title_slide".into()));
/// assert!(format!("{}", err).contains("title_slide"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Catalog Error: {} at line {} in {}", kind, line, file)]
pub struct CatalogError {
    /// The specific error condition
    pub kind: CatalogErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CatalogError {
    /// Create a new CatalogError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CatalogErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
