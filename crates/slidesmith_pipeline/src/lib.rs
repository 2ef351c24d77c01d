//! Slide generation pipeline for slidesmith.
//!
//! This crate turns a free-form narration script into rendered slide deck
//! source by chaining four LLM-backed stages over a catalog of slide
//! templates:
//!
//! 1. **Analyze** - extract theme, key points, audience and structure
//! 2. **Compose** - choose an ordered list of slide templates
//! 3. **GenerateParameters** - fill each template's placeholders
//! 4. **Validate** - score the rendered deck and suggest improvements
//!
//! Between stages 3 and 4 the template renderer substitutes parameters into
//! template bodies. A rejected validation triggers exactly one regeneration
//! pass before the report is accepted as advisory feedback.
//!
//! # Example
//!
//! ```rust,ignore
//! use slidesmith_pipeline::{PipelineConfig, PipelineExecutor, SlideCatalog};
//!
//! # async fn example(driver: impl slidesmith_interface::SlideDriver) -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = SlideCatalog::builtin()?;
//! let executor = PipelineExecutor::new(driver, PipelineConfig::default());
//!
//! let run = executor.run("Today I want to talk about...", &catalog).await?;
//! let approved = run.report.as_ref().is_some_and(|r| *r.approved());
//! println!("{} slides, approved: {}", run.deck.len(), approved);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod catalog;
mod composer;
mod config;
mod extraction;
mod generator;
mod pipeline;
mod renderer;
mod schema;
mod store;
mod validator;

pub use catalog::SlideCatalog;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use extraction::{extract_json, parse_json, strip_think_tags};
pub use pipeline::PipelineExecutor;
pub use store::{PromptStore, placeholders_in, substitute};
