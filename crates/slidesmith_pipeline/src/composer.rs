//! Stage 2: slide composition.

use crate::catalog::SlideCatalog;
use crate::config::PipelineConfig;
use crate::schema::{Attempt, StageSchema, validated_call};
use crate::store::{COMPOSE_SLIDES, PromptStore};
use slidesmith_core::{AnalysisResult, CompositionPlan, GenerateRequest};
use slidesmith_error::{PipelineError, PipelineErrorKind, SlidesmithError};
use slidesmith_interface::{RunWarning, SlideDriver, Stage};
use std::collections::BTreeMap;

impl StageSchema for CompositionPlan {
    const STAGE: Stage = Stage::Compose;

    fn required_keys() -> &'static [&'static str] {
        &["slides"]
    }

    fn check(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("slides must be a non-empty sequence".to_string());
        }
        Ok(())
    }
}

/// Choose an ordered list of slide templates for the analyzed script.
///
/// Plan entries referencing unknown template names are dropped with a
/// warning rather than failing the stage; composition only fails when no
/// valid entry remains. The model's ordering is preserved exactly.
#[tracing::instrument(skip_all, fields(catalog = %catalog.name(), templates = catalog.len()))]
pub(crate) async fn compose<D: SlideDriver + ?Sized>(
    driver: &D,
    store: &PromptStore,
    config: &PipelineConfig,
    analysis: &AnalysisResult,
    catalog: &SlideCatalog,
) -> Result<(CompositionPlan, Vec<RunWarning>, Vec<Attempt>), (SlidesmithError, Vec<Attempt>)> {
    let analysis_json = serde_json::to_string_pretty(analysis)
        .unwrap_or_else(|_| "{}".to_string());

    let hint = match config.slide_count_hint() {
        Some(n) => format!("Aim for roughly {} slides; treat this as advisory, not a cap.", n),
        None => String::new(),
    };

    let variables = BTreeMap::from([
        ("analysis_result".to_string(), analysis_json),
        ("template_catalog".to_string(), catalog.listing()),
        ("slide_count_hint".to_string(), hint),
    ]);
    let prompt = store
        .resolve(COMPOSE_SLIDES, &variables)
        .map_err(|e| (SlidesmithError::from(e), Vec::new()))?;

    let request = GenerateRequest {
        prompt,
        model: config.model().clone(),
        temperature: *config.temperature(),
        max_tokens: *config.max_tokens(),
    };

    let outcome = validated_call::<CompositionPlan, D>(
        driver,
        &request,
        *config.call_timeout(),
        |_| Ok(()),
        |error| {
            format!(
                "Your previous answer could not be used: {}. \
                 Respond again with ONLY a valid JSON object of the form \
                 {{\"strategy\": \"...\", \"slides\": [{{\"template_name\": \"...\", \"reason\": \"...\"}}]}} \
                 using only template names from the catalog above.",
                error
            )
        },
    )
    .await
    .map_err(|failure| {
        let error = PipelineError::new(PipelineErrorKind::CompositionFailed(
            failure.error.to_string(),
        ));
        (SlidesmithError::from(error), failure.attempts)
    })?;

    let (plan, warnings) = filter_unknown_entries(outcome.value, catalog);

    if plan.is_empty() {
        let error = PipelineError::new(PipelineErrorKind::CompositionFailed(
            "no plan entry references a known template".to_string(),
        ));
        return Err((error.into(), outcome.attempts));
    }

    tracing::info!(
        planned = plan.len(),
        dropped = warnings.len(),
        "Composition plan accepted"
    );

    Ok((plan, warnings, outcome.attempts))
}

/// Drop plan entries whose template name is not in the catalog.
fn filter_unknown_entries(
    plan: CompositionPlan,
    catalog: &SlideCatalog,
) -> (CompositionPlan, Vec<RunWarning>) {
    let strategy = plan.strategy().clone();
    let mut kept = Vec::new();
    let mut warnings = Vec::new();

    for entry in plan.slides() {
        if catalog.contains(entry.template_name()) {
            kept.push(entry.clone());
        } else {
            tracing::warn!(
                template = %entry.template_name(),
                "Dropping plan entry referencing unknown template"
            );
            warnings.push(RunWarning {
                stage: Stage::Compose,
                template_name: Some(entry.template_name().clone()),
                message: format!(
                    "plan entry dropped: template '{}' is not in catalog '{}'",
                    entry.template_name(),
                    catalog.name()
                ),
            });
        }
    }

    (CompositionPlan::new(strategy, kept), warnings)
}
