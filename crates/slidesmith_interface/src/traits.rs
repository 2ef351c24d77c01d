//! Trait definitions for LLM backends and deck renderers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slidesmith_core::{GenerateRequest, GenerateResponse};
use slidesmith_error::SlidesmithResult;
use std::path::{Path, PathBuf};

/// Core trait that all LLM backends must implement.
///
/// The pipeline treats the backend as an opaque, potentially
/// non-deterministic, potentially failing function. Transport-level retry
/// and backoff are the implementation's concern; the pipeline only adds the
/// single corrective-prompt retry per stage.
#[async_trait]
pub trait SlideDriver: Send + Sync {
    /// Generate raw text for a prompt.
    async fn generate(&self, req: &GenerateRequest) -> SlidesmithResult<GenerateResponse>;

    /// Provider name (e.g., "ollama", "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "qwen3:0.6b").
    fn model_name(&self) -> &str;
}

/// Output artifact formats supported by deck renderers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Portable Document Format
    Pdf,
    /// Standalone HTML deck
    Html,
    /// One PNG per slide
    Png,
    /// PowerPoint
    Pptx,
}

/// One rendering request for the external deck tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    /// Validated deck source text
    pub deck_source: String,
    /// Output artifact format
    pub format: OutputFormat,
    /// Optional theme stylesheet path
    pub theme: Option<PathBuf>,
    /// Output file name (without directory)
    pub output_filename: String,
}

/// External deck rendering tool boundary.
///
/// The only contract the pipeline holds with the tool is "valid deck source
/// text in, artifact path out". Process lifecycle and error codes belong to
/// the implementation.
#[async_trait]
pub trait DeckRenderer: Send + Sync {
    /// Render deck source into a shippable artifact, returning its path.
    async fn render(&self, job: &RenderJob, output_dir: &Path) -> SlidesmithResult<PathBuf>;
}
