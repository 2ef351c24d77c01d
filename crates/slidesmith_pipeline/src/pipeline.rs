//! The staged pipeline executor.

use crate::analyzer::analyze;
use crate::catalog::SlideCatalog;
use crate::composer::compose;
use crate::config::PipelineConfig;
use crate::generator::{SlideOutcome, generate_parameters};
use crate::renderer::render_deck;
use crate::schema::Attempt;
use crate::store::PromptStore;
use crate::validator::{implicated_slides, validate};
use slidesmith_core::SlideParameterSet;
use slidesmith_error::SlidesmithResult;
use slidesmith_interface::{PipelineRun, RunWarning, SlideDriver, Stage, StageTrace};

/// Runs the four LLM stages and the template renderer as one strictly
/// sequential state machine.
///
/// Stages never overlap: composition sees the complete analysis, parameter
/// generation sees the complete plan, validation sees the complete deck. The
/// only concurrency is the per-slide fan-out inside Stage 3, whose calls are
/// mutually independent.
pub struct PipelineExecutor<D> {
    driver: D,
    store: PromptStore,
    config: PipelineConfig,
}

impl<D: SlideDriver> PipelineExecutor<D> {
    /// Create an executor over a driver with the built-in prompts.
    pub fn new(driver: D, config: PipelineConfig) -> Self {
        Self {
            driver,
            store: PromptStore::builtin(),
            config,
        }
    }

    /// Replace the prompt store (e.g. after directory overrides).
    pub fn with_store(mut self, store: PromptStore) -> Self {
        self.store = store;
        self
    }

    /// Access the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run the full pipeline over a narration script.
    ///
    /// # Errors
    ///
    /// Fatal: analysis or composition failing after their corrective retry,
    /// or a render-time invariant violation. Per-slide parameter failures
    /// and validation problems are collected as warnings instead.
    #[tracing::instrument(skip_all, fields(
        provider = self.driver.provider_name(),
        model = self.driver.model_name(),
        catalog = %catalog.name(),
    ))]
    pub async fn run(&self, script: &str, catalog: &SlideCatalog) -> SlidesmithResult<PipelineRun> {
        let mut traces = Vec::new();
        let mut warnings = Vec::new();

        // Stage 1: analyze.
        let analysis = match analyze(&self.driver, &self.store, &self.config, script).await {
            Ok((analysis, attempts)) => {
                record(&mut traces, Stage::Analyze, attempts);
                analysis
            }
            Err((error, attempts)) => {
                record(&mut traces, Stage::Analyze, attempts);
                return Err(error);
            }
        };

        // Stage 2: compose.
        let plan = match compose(&self.driver, &self.store, &self.config, &analysis, catalog).await
        {
            Ok((plan, mut plan_warnings, attempts)) => {
                record(&mut traces, Stage::Compose, attempts);
                warnings.append(&mut plan_warnings);
                plan
            }
            Err((error, attempts)) => {
                record(&mut traces, Stage::Compose, attempts);
                return Err(error);
            }
        };

        // Stage 3: per-slide parameters, fanned out, order preserved.
        let all_indexes: Vec<usize> = (0..plan.len()).collect();
        let outcomes = generate_parameters(
            &self.driver,
            &self.store,
            &self.config,
            &analysis,
            script,
            &plan,
            catalog,
            &all_indexes,
        )
        .await;

        let mut slots: Vec<Option<SlideParameterSet>> = vec![None; plan.len()];
        self.absorb(outcomes, Stage::GenerateParameters, &mut slots, &mut traces, &mut warnings);

        // Render.
        let mut deck = render_deck(catalog, &surviving(&slots))?;

        // Stage 4: validate, advisory.
        let mut report = match validate(
            &self.driver,
            &self.store,
            &self.config,
            &analysis,
            &plan,
            deck.source(),
        )
        .await
        {
            Ok((report, attempts)) => {
                record(&mut traces, Stage::Validate, attempts);
                Some(report)
            }
            Err(failure) => {
                record(&mut traces, Stage::Validate, failure.attempts);
                warnings.push(RunWarning {
                    stage: Stage::Validate,
                    template_name: None,
                    message: format!("validation call failed: {}", failure.error),
                });
                None
            }
        };

        // One regeneration pass when the validator rejects the deck and its
        // improvement notes point at specific slides. The second report is
        // accepted as-is, approved or not.
        let rejected = report.as_ref().is_some_and(|r| !*r.approved());
        if rejected {
            let implicated: Vec<usize> = report
                .as_ref()
                .map(|r| implicated_slides(r, &plan, catalog))
                .unwrap_or_default()
                .into_iter()
                .filter(|&i| slots[i].is_some())
                .collect();

            if implicated.is_empty() {
                tracing::info!("Deck rejected but no improvement maps to a slide; keeping deck");
            } else {
                tracing::info!(slides = implicated.len(), "Regenerating rejected slides");
                let outcomes = generate_parameters(
                    &self.driver,
                    &self.store,
                    &self.config,
                    &analysis,
                    script,
                    &plan,
                    catalog,
                    &implicated,
                )
                .await;
                self.absorb_regenerated(outcomes, &mut slots, &mut traces, &mut warnings);

                deck = render_deck(catalog, &surviving(&slots))?;

                report = match validate(
                    &self.driver,
                    &self.store,
                    &self.config,
                    &analysis,
                    &plan,
                    deck.source(),
                )
                .await
                {
                    Ok((second, attempts)) => {
                        record(&mut traces, Stage::Validate, attempts);
                        Some(second)
                    }
                    Err(failure) => {
                        record(&mut traces, Stage::Validate, failure.attempts);
                        warnings.push(RunWarning {
                            stage: Stage::Validate,
                            template_name: None,
                            message: format!("revalidation call failed: {}", failure.error),
                        });
                        report
                    }
                };
            }
        }

        tracing::info!(
            slides = deck.len(),
            warnings = warnings.len(),
            "Pipeline run complete"
        );

        Ok(PipelineRun {
            deck,
            analysis,
            plan,
            report,
            warnings,
            traces,
        })
    }

    /// Fill plan slots from first-pass outcomes; failures empty their slot.
    fn absorb(
        &self,
        outcomes: Vec<SlideOutcome>,
        stage: Stage,
        slots: &mut [Option<SlideParameterSet>],
        traces: &mut Vec<StageTrace>,
        warnings: &mut Vec<RunWarning>,
    ) {
        for outcome in outcomes {
            record(traces, stage, outcome.attempts);
            match outcome.result {
                Ok(set) => slots[outcome.index] = Some(set),
                Err(warning) => warnings.push(warning),
            }
        }
    }

    /// Merge regeneration outcomes; a failed regeneration keeps the
    /// original parameter set rather than dropping a previously good slide.
    fn absorb_regenerated(
        &self,
        outcomes: Vec<SlideOutcome>,
        slots: &mut [Option<SlideParameterSet>],
        traces: &mut Vec<StageTrace>,
        warnings: &mut Vec<RunWarning>,
    ) {
        for outcome in outcomes {
            record(traces, Stage::Regenerate, outcome.attempts);
            match outcome.result {
                Ok(set) => slots[outcome.index] = Some(set),
                Err(mut warning) => {
                    warning.stage = Stage::Regenerate;
                    warning.message =
                        format!("kept original slide, regeneration failed: {}", warning.message);
                    warnings.push(warning);
                }
            }
        }
    }
}

fn surviving(slots: &[Option<SlideParameterSet>]) -> Vec<SlideParameterSet> {
    slots.iter().flatten().cloned().collect()
}

fn record(traces: &mut Vec<StageTrace>, stage: Stage, attempts: Vec<Attempt>) {
    for attempt in attempts {
        let sequence_number = traces.len();
        traces.push(StageTrace {
            stage,
            prompt: attempt.prompt,
            response: attempt.response,
            sequence_number,
        });
    }
}
