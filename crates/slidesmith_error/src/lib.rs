//! Error types for the slidesmith pipeline.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use slidesmith_error::{SlidesmithResult, TemplateError, TemplateErrorKind};
//!
//! fn resolve() -> SlidesmithResult<String> {
//!     Err(TemplateError::new(TemplateErrorKind::MissingVariable(
//!         "title".to_string(),
//!     )))?
//! }
//!
//! match resolve() {
//!     Ok(s) => println!("Resolved: {}", s),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod error;
mod pipeline;
mod response;
mod template;

pub use catalog::{CatalogError, CatalogErrorKind};
pub use error::{SlidesmithError, SlidesmithErrorKind, SlidesmithResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use response::{ResponseError, ResponseErrorKind};
pub use template::{TemplateError, TemplateErrorKind};
