//! Core data types for the slidesmith pipeline.
//!
//! Every type here is a value created once per pipeline run and immutable
//! after construction. A failed or retried stage produces a new value rather
//! than patching the old one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod descriptor;
mod parameters;
mod plan;
mod report;
mod request;
mod slide;
pub mod telemetry;

pub use analysis::AnalysisResult;
pub use descriptor::SlideTemplateDescriptor;
pub use parameters::SlideParameterSet;
pub use plan::{CompositionPlan, PlanEntry};
pub use report::ValidationReport;
pub use request::{GenerateRequest, GenerateResponse};
pub use slide::{Deck, RenderedSlide};
