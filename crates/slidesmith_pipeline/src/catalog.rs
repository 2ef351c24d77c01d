//! Slide template catalogs loaded from TOML.
//!
//! A catalog is the composition search space: the ordered set of slide
//! template descriptors Stage 2 chooses from and the renderer substitutes
//! into.
//!
//! # Example catalog file
//!
//! ```toml
//! [catalog]
//! name = "basic"
//! description = "General-purpose deck"
//! separator = "\n\n"
//!
//! [[templates]]
//! name = "content_slide"
//! purpose = "Standard content slide"
//! required_placeholders = ["topic", "content"]
//! body = """
//! ## ${topic}
//!
//! ${content}
//!
//! ---"""
//! ```

use crate::store::placeholders_in;
use serde::Deserialize;
use slidesmith_core::SlideTemplateDescriptor;
use slidesmith_error::{CatalogError, CatalogErrorKind};
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Intermediate structure for deserializing the `[catalog]` section.
#[derive(Debug, Clone, Deserialize)]
struct TomlCatalogMeta {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_separator() -> String {
    "\n\n".to_string()
}

/// Intermediate structure for deserializing one `[[templates]]` entry.
#[derive(Debug, Clone, Deserialize)]
struct TomlTemplate {
    name: String,
    purpose: String,
    #[serde(default)]
    required_placeholders: BTreeSet<String>,
    body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlCatalogFile {
    catalog: TomlCatalogMeta,
    templates: Vec<TomlTemplate>,
}

/// An ordered, validated catalog of slide template descriptors.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct SlideCatalog {
    /// Catalog identifier
    name: String,
    /// Human-readable description
    description: String,
    /// Slide-boundary marker inserted between rendered slides
    separator: String,
    /// Descriptors in catalog order
    descriptors: Vec<SlideTemplateDescriptor>,
    #[getter(skip)]
    index: HashMap<String, usize>,
}

impl SlideCatalog {
    /// Load the built-in Marp-style catalog.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded catalog fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        include_str!("../catalog/basic.toml").parse()
    }

    /// Load a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is invalid, or
    /// validation fails.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogError::new(CatalogErrorKind::FileRead(e.to_string())))?;
        content.parse()
    }

    /// Look up a descriptor by template name.
    pub fn get(&self, template_name: &str) -> Option<&SlideTemplateDescriptor> {
        self.index
            .get(template_name)
            .map(|&i| &self.descriptors[i])
    }

    /// Whether a template name exists in the catalog.
    pub fn contains(&self, template_name: &str) -> bool {
        self.index.contains_key(template_name)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the catalog is empty (a validated catalog never is).
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Format the catalog for LLM consumption in the composition prompt.
    pub fn listing(&self) -> String {
        self.descriptors
            .iter()
            .map(|d| {
                format!(
                    "Template: {}\nPurpose: {}\nRequired placeholders: {}",
                    d.name(),
                    d.purpose(),
                    d.required_placeholders()
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Validate catalog invariants.
    ///
    /// Ensures the catalog is non-empty, names are unique, bodies are
    /// non-empty, and every required placeholder actually appears in its
    /// template body.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.descriptors.is_empty() {
            return Err(CatalogError::new(CatalogErrorKind::EmptyCatalog(
                self.name.clone(),
            )));
        }

        for descriptor in &self.descriptors {
            if descriptor.body().trim().is_empty() {
                return Err(CatalogError::new(CatalogErrorKind::EmptyBody(
                    descriptor.name().clone(),
                )));
            }

            let markers = placeholders_in(descriptor.body());
            for required in descriptor.required_placeholders() {
                if !markers.contains(required) {
                    return Err(CatalogError::new(CatalogErrorKind::UndeclaredPlaceholder {
                        template: descriptor.name().clone(),
                        placeholder: required.clone(),
                    }));
                }
            }
        }

        Ok(())
    }
}

impl FromStr for SlideCatalog {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let file: TomlCatalogFile = toml::from_str(s)
            .map_err(|e| CatalogError::new(CatalogErrorKind::TomlParse(e.to_string())))?;

        let mut descriptors = Vec::with_capacity(file.templates.len());
        let mut index = HashMap::new();

        for template in file.templates {
            if index.contains_key(&template.name) {
                return Err(CatalogError::new(CatalogErrorKind::DuplicateName(
                    template.name,
                )));
            }
            index.insert(template.name.clone(), descriptors.len());
            descriptors.push(SlideTemplateDescriptor::new(
                template.name,
                template.purpose,
                template.required_placeholders,
                template.body,
            ));
        }

        let catalog = SlideCatalog {
            name: file.catalog.name,
            description: file.catalog.description,
            separator: file.catalog.separator,
            descriptors,
            index,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = SlideCatalog::builtin().unwrap();
        assert_eq!(catalog.name(), "basic");
        assert!(catalog.contains("title_slide"));
        assert!(catalog.contains("conclusion_slide"));
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn test_builtin_required_placeholders_appear_in_bodies() {
        let catalog = SlideCatalog::builtin().unwrap();
        for descriptor in catalog.descriptors() {
            let markers = placeholders_in(descriptor.body());
            for required in descriptor.required_placeholders() {
                assert!(markers.contains(required));
            }
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let toml = r#"
[catalog]
name = "dup"

[[templates]]
name = "a"
purpose = "first"
body = "x"

[[templates]]
name = "a"
purpose = "second"
body = "y"
"#;
        let err = toml.parse::<SlideCatalog>().unwrap_err();
        assert!(matches!(err.kind, CatalogErrorKind::DuplicateName(_)));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let toml = r#"
templates = []

[catalog]
name = "empty"
"#;
        let err = toml.parse::<SlideCatalog>().unwrap_err();
        assert!(matches!(err.kind, CatalogErrorKind::EmptyCatalog(_)));
    }

    #[test]
    fn test_required_placeholder_missing_from_body_rejected() {
        let toml = r#"
[catalog]
name = "bad"

[[templates]]
name = "a"
purpose = "broken"
required_placeholders = ["title"]
body = "no markers here"
"#;
        let err = toml.parse::<SlideCatalog>().unwrap_err();
        assert!(matches!(
            err.kind,
            CatalogErrorKind::UndeclaredPlaceholder { .. }
        ));
    }

    #[test]
    fn test_listing_mentions_every_template() {
        let catalog = SlideCatalog::builtin().unwrap();
        let listing = catalog.listing();
        for descriptor in catalog.descriptors() {
            assert!(listing.contains(descriptor.name().as_str()));
        }
    }
}
