//! Static slide template definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The static definition of one slide template.
///
/// Descriptors form the catalog that the Slide Composer chooses from and the
/// Template Renderer substitutes into. Immutable once loaded.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct SlideTemplateDescriptor {
    /// Unique template name within the catalog
    name: String,
    /// Human-readable purpose, shown to the composition stage
    purpose: String,
    /// Placeholder names that must be supplied at render time
    required_placeholders: BTreeSet<String>,
    /// Template body containing `${name}` markers
    body: String,
}

impl SlideTemplateDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        purpose: impl Into<String>,
        required_placeholders: BTreeSet<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            purpose: purpose.into(),
            required_placeholders,
            body: body.into(),
        }
    }
}
