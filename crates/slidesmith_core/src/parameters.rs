//! Per-slide generated parameters (Stage 3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generated placeholder values for one planned slide.
///
/// `parameters` covers at least the referenced descriptor's required
/// placeholders (checked before construction); extra keys are carried along
/// and ignored at render time.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct SlideParameterSet {
    /// Name of the template these parameters belong to
    template_name: String,
    /// Placeholder name to value mapping
    parameters: BTreeMap<String, String>,
}

impl SlideParameterSet {
    /// Create a new parameter set.
    pub fn new(template_name: impl Into<String>, parameters: BTreeMap<String, String>) -> Self {
        Self {
            template_name: template_name.into(),
            parameters,
        }
    }

    /// Placeholder names present in this set, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }
}
