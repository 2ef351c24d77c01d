//! Stage 1: script analysis.

use crate::config::PipelineConfig;
use crate::schema::{Attempt, StageSchema, validated_call};
use crate::store::{ANALYZE_SCRIPT, PromptStore};
use slidesmith_core::{AnalysisResult, GenerateRequest};
use slidesmith_error::{PipelineError, PipelineErrorKind, SlidesmithError};
use slidesmith_interface::{SlideDriver, Stage};
use std::collections::BTreeMap;

impl StageSchema for AnalysisResult {
    const STAGE: Stage = Stage::Analyze;

    fn required_keys() -> &'static [&'static str] {
        &[
            "main_theme",
            "key_points",
            "target_audience",
            "presentation_style",
            "content_structure",
        ]
    }

    fn check(&self) -> Result<(), String> {
        if self.key_points().is_empty() {
            return Err("key_points must be a non-empty sequence".to_string());
        }
        Ok(())
    }
}

/// Analyze a raw script into theme, key points, audience and structure.
///
/// One corrective retry; a second schema failure is fatal for the whole run
/// since no downstream stage can proceed without an analysis.
#[tracing::instrument(skip_all, fields(script_length = script.len()))]
pub(crate) async fn analyze<D: SlideDriver + ?Sized>(
    driver: &D,
    store: &PromptStore,
    config: &PipelineConfig,
    script: &str,
) -> Result<(AnalysisResult, Vec<Attempt>), (SlidesmithError, Vec<Attempt>)> {
    let variables = BTreeMap::from([("script_content".to_string(), script.to_string())]);
    let prompt = store
        .resolve(ANALYZE_SCRIPT, &variables)
        .map_err(|e| (SlidesmithError::from(e), Vec::new()))?;

    let request = GenerateRequest {
        prompt,
        model: config.model().clone(),
        temperature: *config.temperature(),
        max_tokens: *config.max_tokens(),
    };

    match validated_call::<AnalysisResult, D>(
        driver,
        &request,
        *config.call_timeout(),
        |_| Ok(()),
        |error| {
            format!(
                "Your previous answer could not be used: {}. \
                 Respond again with ONLY a valid JSON object containing the keys \
                 main_theme, key_points, target_audience, presentation_style and \
                 content_structure.",
                error
            )
        },
    )
    .await
    {
        Ok(outcome) => {
            tracing::info!(
                key_points = outcome.value.key_points().len(),
                "Script analysis complete"
            );
            Ok((outcome.value, outcome.attempts))
        }
        Err(failure) => {
            let error = PipelineError::new(PipelineErrorKind::AnalysisFailed(
                failure.error.to_string(),
            ));
            Err((error.into(), failure.attempts))
        }
    }
}
