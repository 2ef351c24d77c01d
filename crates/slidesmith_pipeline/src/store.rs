//! Prompt template store and placeholder substitution.
//!
//! Templates use `${name}` markers where `name` matches
//! `[A-Za-z_][A-Za-z0-9_]*`. Matching is exact-name and case-sensitive.
//! Substituted values are treated as literal text and never re-scanned for
//! further markers, so script content cannot inject template structure.

use regex::Regex;
use slidesmith_error::{TemplateError, TemplateErrorKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Extract the set of placeholder names used in a template body.
///
/// # Examples
///
/// ```
/// use slidesmith_pipeline::placeholders_in;
///
/// let names = placeholders_in("# ${title}\n\nby ${author}");
/// assert!(names.contains("title"));
/// assert!(names.contains("author"));
/// assert_eq!(names.len(), 2);
/// ```
pub fn placeholders_in(body: &str) -> BTreeSet<String> {
    marker_regex()
        .captures_iter(body)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Replace every `${name}` marker in `body` with `variables[name]`.
///
/// Substitution is a single left-to-right pass; a substituted value is
/// emitted verbatim and never re-scanned. Text that merely resembles a
/// marker but does not match the identifier grammar is left untouched.
///
/// # Errors
///
/// Returns `MissingVariable` if a marker has no corresponding key.
///
/// # Examples
///
/// ```
/// use slidesmith_pipeline::substitute;
/// use std::collections::BTreeMap;
///
/// let vars = BTreeMap::from([("title".to_string(), "Rust".to_string())]);
/// assert_eq!(substitute("# ${title}", &vars).unwrap(), "# Rust");
/// ```
pub fn substitute(
    body: &str,
    variables: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(body.len());
    let mut last = 0;

    for cap in marker_regex().captures_iter(body) {
        let marker = cap.get(0).unwrap();
        let name = &cap[1];
        let value = variables
            .get(name)
            .ok_or_else(|| TemplateError::missing(name))?;

        result.push_str(&body[last..marker.start()]);
        result.push_str(value);
        last = marker.end();
    }

    result.push_str(&body[last..]);
    Ok(result)
}

/// Named prompt templates for the pipeline stages.
///
/// The store ships with built-in defaults for the four stage prompts and can
/// override any of them from a directory of `.md` files (file stem becomes
/// the template id).
#[derive(Debug, Clone)]
pub struct PromptStore {
    templates: HashMap<String, String>,
}

/// Template id for the Stage 1 prompt.
pub(crate) const ANALYZE_SCRIPT: &str = "analyze_script";
/// Template id for the Stage 2 prompt.
pub(crate) const COMPOSE_SLIDES: &str = "compose_slides";
/// Template id for the Stage 3 prompt.
pub(crate) const GENERATE_PARAMETERS: &str = "generate_parameters";
/// Template id for the Stage 4 prompt.
pub(crate) const VALIDATE_CONTENT: &str = "validate_content";

impl PromptStore {
    /// Create a store holding the built-in stage prompts.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            ANALYZE_SCRIPT.to_string(),
            include_str!("../prompts/analyze_script.md").to_string(),
        );
        templates.insert(
            COMPOSE_SLIDES.to_string(),
            include_str!("../prompts/compose_slides.md").to_string(),
        );
        templates.insert(
            GENERATE_PARAMETERS.to_string(),
            include_str!("../prompts/generate_parameters.md").to_string(),
        );
        templates.insert(
            VALIDATE_CONTENT.to_string(),
            include_str!("../prompts/validate_content.md").to_string(),
        );
        Self { templates }
    }

    /// Insert or replace a template.
    pub fn insert(&mut self, id: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(id.into(), body.into());
    }

    /// Override templates from a directory of `.md` files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    #[tracing::instrument(skip(self), fields(dir = %dir.as_ref().display()))]
    pub fn override_from_dir<P: AsRef<Path>>(&mut self, dir: P) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "md")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                let body = std::fs::read_to_string(&path)?;
                tracing::debug!(template = %stem, bytes = body.len(), "Loaded prompt override");
                self.templates.insert(stem.to_string(), body);
            }
        }
        Ok(())
    }

    /// Resolve a named template against a variables mapping.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTemplate` for an unrecognized id and `MissingVariable`
    /// when a marker has no corresponding key.
    pub fn resolve(
        &self,
        template_id: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        let body = self.templates.get(template_id).ok_or_else(|| {
            TemplateError::new(TemplateErrorKind::UnknownTemplate(template_id.to_string()))
        })?;
        substitute(body, variables)
    }
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_basic() {
        let result = substitute("# ${title}\n\nby ${author}", &vars(&[
            ("title", "Async Rust"),
            ("author", "Kim"),
        ]))
        .unwrap();
        assert_eq!(result, "# Async Rust\n\nby Kim");
    }

    #[test]
    fn test_substitute_missing_variable() {
        let err = substitute("${title}", &vars(&[])).unwrap_err();
        assert!(matches!(err.kind, TemplateErrorKind::MissingVariable(ref n) if n == "title"));
    }

    #[test]
    fn test_substitute_is_case_sensitive() {
        let err = substitute("${Title}", &vars(&[("title", "x")])).unwrap_err();
        assert!(matches!(err.kind, TemplateErrorKind::MissingVariable(_)));
    }

    #[test]
    fn test_substituted_value_is_not_rescanned() {
        // A value containing marker syntax must land as literal text.
        let result = substitute("${content}", &vars(&[("content", "use ${inner} here")])).unwrap();
        assert_eq!(result, "use ${inner} here");
    }

    #[test]
    fn test_substitute_is_idempotent_per_inputs() {
        let v = vars(&[("a", "1"), ("b", "2")]);
        let first = substitute("${a}-${b}-${a}", &v).unwrap();
        let second = substitute("${a}-${b}-${a}", &v).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "1-2-1");
    }

    #[test]
    fn test_non_identifier_markers_are_literal() {
        let result = substitute("cost: ${1,000} and ${}", &vars(&[])).unwrap();
        assert_eq!(result, "cost: ${1,000} and ${}");
    }

    #[test]
    fn test_extra_variables_are_ignored() {
        let result = substitute("${title}", &vars(&[("title", "T"), ("extra", "ignored")])).unwrap();
        assert_eq!(result, "T");
        assert!(!result.contains("ignored"));
    }

    #[test]
    fn test_placeholders_in_dedupes() {
        let names = placeholders_in("${a} ${b} ${a} ${not-valid}");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_store_unknown_template() {
        let store = PromptStore::builtin();
        let err = store.resolve("nonexistent", &vars(&[])).unwrap_err();
        assert!(matches!(err.kind, TemplateErrorKind::UnknownTemplate(_)));
    }

    #[test]
    fn test_builtin_prompts_present() {
        let store = PromptStore::builtin();
        for id in [
            ANALYZE_SCRIPT,
            COMPOSE_SLIDES,
            GENERATE_PARAMETERS,
            VALIDATE_CONTENT,
        ] {
            assert!(store.templates.contains_key(id), "missing {id}");
        }
    }
}
