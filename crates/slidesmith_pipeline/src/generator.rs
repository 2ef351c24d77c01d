//! Stage 3: per-slide parameter generation.

use crate::catalog::SlideCatalog;
use crate::config::PipelineConfig;
use crate::schema::{Attempt, StageSchema, validated_call};
use crate::store::{GENERATE_PARAMETERS, PromptStore};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use slidesmith_core::{AnalysisResult, CompositionPlan, GenerateRequest, SlideParameterSet};
use slidesmith_error::PipelineErrorKind;
use slidesmith_interface::{RunWarning, SlideDriver, Stage};
use std::collections::BTreeMap;

/// Raw Stage 3 response shape before placeholder-coverage checks.
#[derive(Debug, Deserialize)]
pub(crate) struct RawParameterSet {
    /// Echoed template name; advisory, the plan entry is authoritative
    #[serde(default)]
    #[allow(dead_code)]
    template_name: Option<String>,
    parameters: serde_json::Map<String, JsonValue>,
}

impl StageSchema for RawParameterSet {
    const STAGE: Stage = Stage::GenerateParameters;

    fn required_keys() -> &'static [&'static str] {
        &["parameters"]
    }
}

impl RawParameterSet {
    /// Flatten JSON values to strings; `null` counts as absent.
    fn into_string_map(self) -> BTreeMap<String, String> {
        self.parameters
            .into_iter()
            .filter_map(|(key, value)| match value {
                JsonValue::Null => None,
                JsonValue::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }

    fn missing_placeholders(&self, descriptor: &slidesmith_core::SlideTemplateDescriptor) -> Vec<String> {
        descriptor
            .required_placeholders()
            .iter()
            .filter(|name| !matches!(self.parameters.get(*name), Some(v) if !v.is_null()))
            .cloned()
            .collect()
    }
}

/// Result of parameter generation for one planned slide.
pub(crate) struct SlideOutcome {
    /// Index of the plan entry this outcome belongs to
    pub index: usize,
    /// The parameter set, or the warning that excludes the slide
    pub result: Result<SlideParameterSet, RunWarning>,
    /// Raw attempts for the run trace
    pub attempts: Vec<Attempt>,
}

/// Generate parameters for one plan entry.
#[tracing::instrument(skip_all, fields(template = %descriptor.name()))]
async fn generate_for_entry<D: SlideDriver + ?Sized>(
    driver: &D,
    store: &PromptStore,
    config: &PipelineConfig,
    analysis_json: &str,
    script: &str,
    index: usize,
    descriptor: &slidesmith_core::SlideTemplateDescriptor,
) -> SlideOutcome {
    let placeholders_list = descriptor
        .required_placeholders()
        .iter()
        .map(|name| format!("- {}", name))
        .collect::<Vec<_>>()
        .join("\n");
    let json_example = descriptor
        .required_placeholders()
        .iter()
        .map(|name| format!("  \"{}\": \"...\"", name))
        .collect::<Vec<_>>()
        .join(",\n");

    let variables = BTreeMap::from([
        ("script_content".to_string(), script.to_string()),
        ("analysis_result".to_string(), analysis_json.to_string()),
        ("template_name".to_string(), descriptor.name().clone()),
        ("template_purpose".to_string(), descriptor.purpose().clone()),
        ("placeholders_list".to_string(), placeholders_list),
        ("json_example".to_string(), json_example),
    ]);

    let prompt = match store.resolve(GENERATE_PARAMETERS, &variables) {
        Ok(prompt) => prompt,
        Err(e) => {
            // Store misconfiguration surfaces as a per-slide warning rather
            // than aborting the deck.
            return SlideOutcome {
                index,
                result: Err(slide_warning(descriptor.name(), e.to_string())),
                attempts: Vec::new(),
            };
        }
    };

    let request = GenerateRequest {
        prompt,
        model: config.model().clone(),
        temperature: *config.temperature(),
        max_tokens: *config.max_tokens(),
    };

    match validated_call::<RawParameterSet, D>(
        driver,
        &request,
        *config.call_timeout(),
        |raw| {
            let missing = raw.missing_placeholders(descriptor);
            if missing.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "missing required placeholders: {}",
                    missing.join(", ")
                ))
            }
        },
        |error| {
            format!(
                "Your previous answer could not be used: {}. \
                 Respond again with ONLY a valid JSON object of the form \
                 {{\"template_name\": \"{}\", \"parameters\": {{...}}}} where \
                 \"parameters\" contains every placeholder listed above.",
                error,
                descriptor.name()
            )
        },
    )
    .await
    {
        Ok(outcome) => SlideOutcome {
            index,
            result: Ok(SlideParameterSet::new(
                descriptor.name().clone(),
                outcome.value.into_string_map(),
            )),
            attempts: outcome.attempts,
        },
        Err(failure) => SlideOutcome {
            index,
            result: Err(slide_warning(descriptor.name(), failure.error.to_string())),
            attempts: failure.attempts,
        },
    }
}

fn slide_warning(template_name: &str, message: String) -> RunWarning {
    let kind = PipelineErrorKind::ParameterGenerationFailed {
        slide: template_name.to_string(),
        message,
    };
    tracing::warn!(
        template = %template_name,
        "Excluding slide from deck: {}",
        kind
    );
    RunWarning {
        stage: Stage::GenerateParameters,
        template_name: Some(template_name.to_string()),
        message: kind.to_string(),
    }
}

/// Generate parameter sets for the selected plan entries.
///
/// Calls are independent per slide and dispatched concurrently up to the
/// configured fan-out limit; each outcome lands in its own plan slot, so the
/// order-preserving join keeps presentation order intact. A slide that still
/// misses required placeholders after its retry is excluded with a warning;
/// the rest of the deck proceeds.
#[tracing::instrument(skip_all, fields(slides = indexes.len(), fan_out = config.fan_out()))]
pub(crate) async fn generate_parameters<D: SlideDriver + ?Sized>(
    driver: &D,
    store: &PromptStore,
    config: &PipelineConfig,
    analysis: &AnalysisResult,
    script: &str,
    plan: &CompositionPlan,
    catalog: &SlideCatalog,
    indexes: &[usize],
) -> Vec<SlideOutcome> {
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());

    let calls = indexes.iter().map(|&index| {
        let entry = &plan.slides()[index];
        let analysis_json = &analysis_json;
        async move {
            // Plan entries are pre-filtered against the catalog in Stage 2.
            match catalog.get(entry.template_name()) {
                Some(descriptor) => {
                    generate_for_entry(
                        driver,
                        store,
                        config,
                        analysis_json,
                        script,
                        index,
                        descriptor,
                    )
                    .await
                }
                None => SlideOutcome {
                    index,
                    result: Err(slide_warning(
                        entry.template_name(),
                        "template vanished from catalog".to_string(),
                    )),
                    attempts: Vec::new(),
                },
            }
        }
    });

    futures::stream::iter(calls)
        .buffered((*config.fan_out()).max(1))
        .collect()
        .await
}
