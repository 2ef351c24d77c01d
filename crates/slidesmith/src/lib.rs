//! Slidesmith - LLM-driven slide deck generation
//!
//! Slidesmith turns a free-form narration script into a rendered slide deck
//! by chaining four LLM-backed stages over a catalog of slide templates:
//! analyze the script, compose a slide plan, generate per-slide parameters,
//! and validate the rendered result.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use slidesmith::{
//!     MarpRenderer, OutputFormat, PipelineConfig, PipelineExecutor, RenderJob,
//!     SlideCatalog,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = my_driver()?; // any SlideDriver implementation
//!     let catalog = SlideCatalog::builtin()?;
//!     let executor = PipelineExecutor::new(driver, PipelineConfig::default());
//!
//!     let run = executor.run("Today I want to talk about...", &catalog).await?;
//!
//!     let renderer = MarpRenderer::from_env();
//!     let job = RenderJob {
//!         deck_source: run.deck.source().clone(),
//!         format: OutputFormat::Pdf,
//!         theme: None,
//!         output_filename: "deck.pdf".to_string(),
//!     };
//!     let artifact = renderer.render(&job, "out".as_ref()).await?;
//!     println!("Rendered {}", artifact.display());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Slidesmith is organized as a workspace with focused crates:
//!
//! - `slidesmith_core` - Stage data types (analysis, plan, parameters, deck)
//! - `slidesmith_interface` - `SlideDriver` and `DeckRenderer` traits
//! - `slidesmith_error` - Error types
//! - `slidesmith_pipeline` - The staged pipeline executor
//!
//! This crate (`slidesmith`) re-exports everything for convenience and adds
//! the `MarpRenderer` subprocess implementation of `DeckRenderer`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod marp;

pub use marp::MarpRenderer;
pub use slidesmith_core::telemetry::init_tracing;
pub use slidesmith_core::{
    AnalysisResult, CompositionPlan, Deck, GenerateRequest, GenerateResponse, PlanEntry,
    RenderedSlide, SlideParameterSet, SlideTemplateDescriptor, ValidationReport,
};
pub use slidesmith_error::{
    CatalogError, CatalogErrorKind, PipelineError, PipelineErrorKind, ResponseError,
    ResponseErrorKind, SlidesmithError, SlidesmithErrorKind, SlidesmithResult, TemplateError,
    TemplateErrorKind,
};
pub use slidesmith_interface::{
    DeckRenderer, OutputFormat, PipelineRun, RenderJob, RunWarning, SlideDriver, Stage, StageTrace,
};
pub use slidesmith_pipeline::{
    PipelineConfig, PipelineConfigBuilder, PipelineExecutor, PromptStore, SlideCatalog,
    placeholders_in, substitute,
};
