use async_trait::async_trait;
use slidesmith_core::{GenerateRequest, GenerateResponse};
use slidesmith_error::SlidesmithResult;
use slidesmith_interface::{SlideDriver, Stage};
use slidesmith_pipeline::{PipelineConfig, PipelineConfigBuilder, PipelineExecutor, SlideCatalog};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock LLM driver that routes each prompt to a canned response queue by
/// substring match, in prompt order.
struct MockDriver {
    rules: Mutex<Vec<Rule>>,
}

struct Rule {
    needle: String,
    responses: VecDeque<String>,
}

impl MockDriver {
    fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
        }
    }

    /// Respond to prompts containing `needle` with `responses` in order; the
    /// last response repeats once the queue drains.
    fn on(self, needle: &str, responses: &[&str]) -> Self {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.to_string(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
        });
        self
    }
}

#[async_trait]
impl SlideDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> SlidesmithResult<GenerateResponse> {
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if req.prompt.contains(&rule.needle) {
                let text = if rule.responses.len() > 1 {
                    rule.responses.pop_front().unwrap()
                } else {
                    rule.responses.front().cloned().unwrap_or_default()
                };
                return Ok(GenerateResponse { text });
            }
        }
        Ok(GenerateResponse {
            text: format!("unmatched prompt: {}", &req.prompt[..40.min(req.prompt.len())]),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model-v1"
    }
}

/// Driver that stalls far past any configured deadline before answering.
struct StalledDriver {
    calls: AtomicUsize,
}

#[async_trait]
impl SlideDriver for StalledDriver {
    async fn generate(&self, _req: &GenerateRequest) -> SlidesmithResult<GenerateResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(GenerateResponse {
            text: analysis_json().to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model-v1"
    }
}

// Substrings unique to each built-in stage prompt.
const ANALYZE: &str = "extract the information needed to plan a slide deck";
const COMPOSE: &str = "choose an ordered sequence of slide templates";
const VALIDATE: &str = "meticulous presentation reviewer";

fn analysis_json() -> &'static str {
    r#"{
        "main_theme": "Ownership in Rust",
        "key_points": ["Moves", "Borrowing", "Lifetimes"],
        "target_audience": "working programmers new to Rust",
        "presentation_style": "technical",
        "content_structure": "concept by concept, simple to subtle"
    }"#
}

fn plan_json(names: &[&str]) -> String {
    let slides: Vec<String> = names
        .iter()
        .map(|n| format!(r#"{{"template_name": "{}", "reason": "fits"}}"#, n))
        .collect();
    format!(
        r#"{{"strategy": "intro, body, close", "slides": [{}]}}"#,
        slides.join(", ")
    )
}

fn params_json(name: &str, pairs: &[(&str, &str)]) -> String {
    let entries: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!(r#""{}": "{}""#, k, v))
        .collect();
    format!(
        r#"{{"template_name": "{}", "parameters": {{{}}}}}"#,
        name,
        entries.join(", ")
    )
}

fn report_json(approved: bool, improvements: &[&str]) -> String {
    let entries: Vec<String> = improvements.iter().map(|i| format!(r#""{}""#, i)).collect();
    format!(
        r#"{{"accuracy": 9, "clarity": 8, "completeness": 9, "overall_score": 8.7,
            "improvements": [{}], "approved": {}}}"#,
        entries.join(", "),
        approved
    )
}

/// A driver scripted for a clean three-slide run.
fn happy_driver() -> MockDriver {
    MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(
            COMPOSE,
            &[&plan_json(&["title_slide", "content_slide", "conclusion_slide"])],
        )
        .on(
            r#"the template "title_slide""#,
            &[&params_json(
                "title_slide",
                &[
                    ("title", "Ownership in Rust"),
                    ("author", "Kim"),
                    ("date", "2026-08-28"),
                ],
            )],
        )
        .on(
            r#"the template "content_slide""#,
            &[&params_json(
                "content_slide",
                &[("topic", "Borrowing"), ("content", "Shared or exclusive, never both.")],
            )],
        )
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json(
                "conclusion_slide",
                &[("content", "Ownership makes lifetimes explicit.")],
            )],
        )
        .on(VALIDATE, &[&report_json(true, &[])])
}

#[tokio::test]
async fn test_full_run_renders_planned_slides_in_order() {
    let catalog = SlideCatalog::builtin().unwrap();
    let executor = PipelineExecutor::new(happy_driver(), PipelineConfig::default());

    let run = executor
        .run("Today I want to talk about ownership in Rust.", &catalog)
        .await
        .expect("pipeline run failed");

    assert_eq!(run.deck.len(), 3);
    assert!(run.warnings.is_empty());

    let names: Vec<_> = run
        .deck
        .slides()
        .iter()
        .map(|s| s.template_name().as_str())
        .collect();
    assert_eq!(names, vec!["title_slide", "content_slide", "conclusion_slide"]);

    assert!(run.deck.source().contains("Ownership in Rust"));
    assert!(run.deck.source().contains("Shared or exclusive"));
    assert!(!run.deck.source().contains("${title}"));

    let report = run.report.expect("missing validation report");
    assert!(*report.approved());

    // One trace per driver call, sequence numbers dense from zero.
    assert_eq!(run.traces.len(), 6);
    for (i, trace) in run.traces.iter().enumerate() {
        assert_eq!(trace.sequence_number, i);
    }
    assert_eq!(run.traces[0].stage, Stage::Analyze);
    assert_eq!(run.traces[1].stage, Stage::Compose);
    assert_eq!(run.traces[5].stage, Stage::Validate);
}

#[tokio::test]
async fn test_unknown_plan_entry_is_dropped_with_warning() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(
            COMPOSE,
            &[&plan_json(&["title_slide", "fancy_slide", "conclusion_slide"])],
        )
        .on(
            r#"the template "title_slide""#,
            &[&params_json(
                "title_slide",
                &[("title", "T"), ("author", "A"), ("date", "D")],
            )],
        )
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json("conclusion_slide", &[("content", "Bye")])],
        )
        .on(VALIDATE, &[&report_json(true, &[])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert_eq!(run.deck.len(), 2);
    assert_eq!(run.plan.len(), 2);
    assert_eq!(run.warnings.len(), 1);
    assert_eq!(run.warnings[0].stage, Stage::Compose);
    assert_eq!(run.warnings[0].template_name.as_deref(), Some("fancy_slide"));
}

#[tokio::test]
async fn test_failed_slide_is_excluded_and_run_continues() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["title_slide", "content_slide"])])
        .on(
            r#"the template "title_slide""#,
            &[&params_json(
                "title_slide",
                &[("title", "T"), ("author", "A"), ("date", "D")],
            )],
        )
        // Garbage on both the first attempt and the corrective retry.
        .on(r#"the template "content_slide""#, &["not json", "still not json"])
        .on(VALIDATE, &[&report_json(true, &[])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert_eq!(run.deck.len(), 1);
    assert_eq!(run.deck.slides()[0].template_name(), "title_slide");
    assert_eq!(run.warnings.len(), 1);
    assert_eq!(run.warnings[0].stage, Stage::GenerateParameters);
    assert_eq!(
        run.warnings[0].template_name.as_deref(),
        Some("content_slide")
    );
    // Both the attempt and the retry are traced.
    let generate_traces = run
        .traces
        .iter()
        .filter(|t| t.stage == Stage::GenerateParameters)
        .count();
    assert_eq!(generate_traces, 3);
}

#[tokio::test]
async fn test_analysis_failure_after_retry_is_fatal() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new().on(ANALYZE, &["no json here", "still no json"]);

    let err = executor_run(driver, &catalog).await.unwrap_err();
    assert!(err.to_string().contains("analysis failed"));
}

#[tokio::test]
async fn test_analysis_retry_with_corrective_prompt_succeeds() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        // First a malformed answer, then a think-tagged, fenced good one.
        .on(
            ANALYZE,
            &[
                "I cannot answer in JSON.",
                &format!(
                    "<think>fine, as JSON then</think>```json\n{}\n```",
                    analysis_json()
                ),
            ],
        )
        .on(COMPOSE, &[&plan_json(&["conclusion_slide"])])
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json("conclusion_slide", &[("content", "Bye")])],
        )
        .on(VALIDATE, &[&report_json(true, &[])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert_eq!(run.analysis.key_points().len(), 3);
    // The retry prompt carries a corrective instruction.
    let analyze_traces: Vec<_> = run
        .traces
        .iter()
        .filter(|t| t.stage == Stage::Analyze)
        .collect();
    assert_eq!(analyze_traces.len(), 2);
    assert!(analyze_traces[1].prompt.contains("could not be used"));
}

#[tokio::test]
async fn test_timed_out_call_retries_once_then_fails_the_stage() {
    let catalog = SlideCatalog::builtin().unwrap();
    let config = PipelineConfigBuilder::default()
        .call_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let executor = PipelineExecutor::new(
        StalledDriver {
            calls: AtomicUsize::new(0),
        },
        config,
    );

    let err = executor
        .run("Today I want to talk about ownership in Rust.", &catalog)
        .await
        .unwrap_err();

    // An elapsed deadline follows the same corrective-retry path as a parse
    // failure, so the driver is invoked twice before the stage gives up.
    assert_eq!(executor.driver().calls.load(Ordering::SeqCst), 2);
    assert!(err.to_string().contains("deadline"));
    assert!(err.to_string().contains("analysis failed"));
}

#[tokio::test]
async fn test_missing_placeholder_retry_names_the_keys_and_succeeds() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["content_slide"])])
        .on(
            r#"the template "content_slide""#,
            &[
                // First answer forgets "content"; the retry supplies it.
                &params_json("content_slide", &[("topic", "Moves")]),
                &params_json(
                    "content_slide",
                    &[("topic", "Moves"), ("content", "A move transfers ownership.")],
                ),
            ],
        )
        .on(VALIDATE, &[&report_json(true, &[])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert!(run.warnings.is_empty());
    assert_eq!(run.deck.len(), 1);
    assert!(run.deck.source().contains("A move transfers ownership."));

    let generate_traces: Vec<_> = run
        .traces
        .iter()
        .filter(|t| t.stage == Stage::GenerateParameters)
        .collect();
    assert_eq!(generate_traces.len(), 2);
    assert!(
        generate_traces[1]
            .prompt
            .contains("missing required placeholders: content")
    );
}

#[tokio::test]
async fn test_extra_parameters_are_carried_but_ignored() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["conclusion_slide"])])
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json(
                "conclusion_slide",
                &[("content", "Bye"), ("speaker_notes", "never rendered")],
            )],
        )
        .on(VALIDATE, &[&report_json(true, &[])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert_eq!(run.deck.len(), 1);
    assert!(run.deck.source().contains("Bye"));
    assert!(!run.deck.source().contains("never rendered"));
}

#[tokio::test]
async fn test_rejected_deck_gets_one_regeneration_pass() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["content_slide"])])
        .on(
            r#"the template "content_slide""#,
            &[
                &params_json(
                    "content_slide",
                    &[("topic", "Moves"), ("content", "first draft")],
                ),
                &params_json(
                    "content_slide",
                    &[("topic", "Moves"), ("content", "sharper second draft")],
                ),
            ],
        )
        .on(
            VALIDATE,
            &[
                &report_json(false, &["The content_slide is too vague."]),
                &report_json(true, &[]),
            ],
        );

    let run = executor_run(driver, &catalog).await.unwrap();

    assert!(run.deck.source().contains("sharper second draft"));
    assert!(!run.deck.source().contains("first draft"));
    let report = run.report.expect("missing validation report");
    assert!(*report.approved());

    assert!(run.traces.iter().any(|t| t.stage == Stage::Regenerate));
    let validate_count = run
        .traces
        .iter()
        .filter(|t| t.stage == Stage::Validate)
        .count();
    assert_eq!(validate_count, 2);
}

#[tokio::test]
async fn test_rejection_without_matching_improvement_keeps_deck() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["conclusion_slide"])])
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json("conclusion_slide", &[("content", "Bye")])],
        )
        .on(VALIDATE, &[&report_json(false, &["Vague dissatisfaction."])]);

    let run = executor_run(driver, &catalog).await.unwrap();

    // No improvement maps to a slide, so no regeneration happens and the
    // rejected report stands.
    assert!(!run.traces.iter().any(|t| t.stage == Stage::Regenerate));
    let report = run.report.expect("missing validation report");
    assert!(!report.approved());
    assert_eq!(run.deck.len(), 1);
}

#[tokio::test]
async fn test_failed_validation_call_is_a_warning_not_an_error() {
    let catalog = SlideCatalog::builtin().unwrap();
    let driver = MockDriver::new()
        .on(ANALYZE, &[analysis_json()])
        .on(COMPOSE, &[&plan_json(&["conclusion_slide"])])
        .on(
            r#"the template "conclusion_slide""#,
            &[&params_json("conclusion_slide", &[("content", "Bye")])],
        )
        .on(VALIDATE, &["nonsense", "more nonsense"]);

    let run = executor_run(driver, &catalog).await.unwrap();

    assert!(run.report.is_none());
    assert!(
        run.warnings
            .iter()
            .any(|w| w.stage == Stage::Validate && w.message.contains("validation call failed"))
    );
    assert_eq!(run.deck.len(), 1);
}

async fn executor_run(
    driver: MockDriver,
    catalog: &SlideCatalog,
) -> SlidesmithResult<slidesmith_interface::PipelineRun> {
    PipelineExecutor::new(driver, PipelineConfig::default())
        .run("Today I want to talk about ownership in Rust.", catalog)
        .await
}
