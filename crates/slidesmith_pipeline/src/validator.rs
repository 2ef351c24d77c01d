//! Stage 4: advisory content validation.

use crate::catalog::SlideCatalog;
use crate::config::PipelineConfig;
use crate::schema::{Attempt, CallFailure, StageSchema, validated_call};
use crate::store::{PromptStore, VALIDATE_CONTENT};
use serde::Deserialize;
use slidesmith_core::{AnalysisResult, CompositionPlan, GenerateRequest, ValidationReport};
use slidesmith_interface::{SlideDriver, Stage};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Raw Stage 4 response shape before score clamping.
#[derive(Debug, Deserialize)]
pub(crate) struct RawReport {
    accuracy: f32,
    clarity: f32,
    completeness: f32,
    #[serde(default)]
    overall_score: Option<f32>,
    #[serde(default)]
    improvements: Vec<String>,
    approved: bool,
}

impl StageSchema for RawReport {
    const STAGE: Stage = Stage::Validate;

    fn required_keys() -> &'static [&'static str] {
        &["accuracy", "clarity", "completeness", "approved"]
    }
}

impl RawReport {
    fn into_report(self) -> ValidationReport {
        fn score(value: f32) -> u8 {
            value.round().clamp(1.0, 10.0) as u8
        }
        let overall = self
            .overall_score
            .unwrap_or((self.accuracy + self.clarity + self.completeness) / 3.0);
        ValidationReport::new(
            score(self.accuracy),
            score(self.clarity),
            score(self.completeness),
            overall,
            self.improvements,
            self.approved,
        )
    }
}

/// Run the validation call over the rendered deck.
///
/// Validation is advisory: a call that fails even after its corrective retry
/// is reported as a warning-grade outcome by the caller, never as a pipeline
/// abort.
#[tracing::instrument(skip_all)]
pub(crate) async fn validate<D: SlideDriver + ?Sized>(
    driver: &D,
    store: &PromptStore,
    config: &PipelineConfig,
    analysis: &AnalysisResult,
    plan: &CompositionPlan,
    deck_source: &str,
) -> Result<(ValidationReport, Vec<Attempt>), CallFailure> {
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());
    let plan_json = serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string());

    let variables = BTreeMap::from([
        ("deck_source".to_string(), deck_source.to_string()),
        ("analysis_result".to_string(), analysis_json),
        ("composition_plan".to_string(), plan_json),
    ]);

    let prompt = match store.resolve(VALIDATE_CONTENT, &variables) {
        Ok(prompt) => prompt,
        Err(e) => {
            return Err(CallFailure {
                error: e.into(),
                attempts: Vec::new(),
            });
        }
    };

    let request = GenerateRequest {
        prompt,
        model: config.model().clone(),
        temperature: *config.temperature(),
        max_tokens: *config.max_tokens(),
    };

    let outcome = validated_call::<RawReport, D>(
        driver,
        &request,
        *config.call_timeout(),
        |_| Ok(()),
        |error| {
            format!(
                "Your previous answer could not be used: {}. Respond again with \
                 ONLY a valid JSON object containing the keys accuracy, clarity, \
                 completeness, overall_score, improvements and approved.",
                error
            )
        },
    )
    .await?;

    let report = outcome.value.into_report();
    tracing::info!(
        accuracy = report.accuracy(),
        clarity = report.clarity(),
        completeness = report.completeness(),
        overall = report.overall_score(),
        approved = report.approved(),
        "Validation report"
    );
    Ok((report, outcome.attempts))
}

/// Map improvement notes back to the plan entries they most plausibly target.
///
/// An improvement implicates a slide when it mentions the slide's template
/// name, or a discriminative word from the template's purpose line,
/// case-insensitively. A purpose word discriminates only when it is longer
/// than three characters and unique to one template in the catalog (so
/// "slide" never matches). Unmatched improvements implicate nothing; if no
/// improvement matches any slide, regeneration has nothing to do.
pub(crate) fn implicated_slides(
    report: &ValidationReport,
    plan: &CompositionPlan,
    catalog: &SlideCatalog,
) -> BTreeSet<usize> {
    let mut word_counts: HashMap<String, usize> = HashMap::new();
    for descriptor in catalog.descriptors() {
        for word in purpose_words(descriptor.purpose()) {
            *word_counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut implicated = BTreeSet::new();
    for improvement in report.improvements() {
        let lowered = improvement.to_lowercase();
        for (index, entry) in plan.slides().iter().enumerate() {
            let name = entry.template_name();
            if lowered.contains(&name.to_lowercase()) {
                implicated.insert(index);
                continue;
            }
            let Some(descriptor) = catalog.get(name) else {
                continue;
            };
            if purpose_words(descriptor.purpose())
                .into_iter()
                .filter(|word| word_counts.get(word) == Some(&1))
                .any(|word| lowered.contains(&word))
            {
                implicated.insert(index);
            }
        }
    }
    implicated
}

fn purpose_words(purpose: &str) -> BTreeSet<String> {
    purpose
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 3)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidesmith_core::PlanEntry;

    fn report_with(improvements: Vec<String>) -> ValidationReport {
        ValidationReport::new(8, 8, 8, 8.0, improvements, false)
    }

    fn plan_of(names: &[&str]) -> CompositionPlan {
        CompositionPlan::new(
            String::new(),
            names
                .iter()
                .map(|n| PlanEntry::new(n.to_string(), String::new()))
                .collect(),
        )
    }

    #[test]
    fn name_mention_implicates_slide() {
        let catalog = SlideCatalog::builtin().unwrap();
        let plan = plan_of(&["title_slide", "content_slide", "conclusion_slide"]);
        let report = report_with(vec![
            "The content_slide about ownership is too dense.".to_string(),
        ]);
        let implicated = implicated_slides(&report, &plan, &catalog);
        assert_eq!(implicated, BTreeSet::from([1]));
    }

    #[test]
    fn purpose_word_implicates_slide() {
        let catalog = SlideCatalog::builtin().unwrap();
        let plan = plan_of(&["title_slide", "conclusion_slide"]);
        let report = report_with(vec![
            "The closing summary omits the second key point.".to_string(),
        ]);
        let implicated = implicated_slides(&report, &plan, &catalog);
        assert!(implicated.contains(&1));
    }

    #[test]
    fn unmatched_improvement_implicates_nothing() {
        let catalog = SlideCatalog::builtin().unwrap();
        let plan = plan_of(&["content_slide"]);
        let report = report_with(vec!["Vague dissatisfaction.".to_string()]);
        assert!(implicated_slides(&report, &plan, &catalog).is_empty());
    }

    #[test]
    fn raw_report_defaults_overall_to_mean() {
        let raw = RawReport {
            accuracy: 6.0,
            clarity: 9.0,
            completeness: 9.0,
            overall_score: None,
            improvements: Vec::new(),
            approved: true,
        };
        let report = raw.into_report();
        assert!((report.overall_score() - 8.0).abs() < f32::EPSILON);
    }
}
