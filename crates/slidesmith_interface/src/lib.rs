//! Trait definitions and shared run-result types for slidesmith.
//!
//! The pipeline depends on two external collaborators, both abstracted here:
//! the LLM backend ([`SlideDriver`]) and the deck rendering tool
//! ([`DeckRenderer`]). Run-result types live here so that the executor and
//! callers share one vocabulary without depending on each other.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod run;
mod traits;

pub use run::{PipelineRun, RunWarning, Stage, StageTrace};
pub use traits::{DeckRenderer, OutputFormat, RenderJob, SlideDriver};
