//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable knobs for one pipeline run.
///
/// # Examples
///
/// ```
/// use slidesmith_pipeline::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::default()
///     .model("qwen3:0.6b")
///     .slide_count_hint(8u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.slide_count_hint(), &Some(8));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into, strip_option), default)]
pub struct PipelineConfig {
    /// Model identifier passed through to the driver
    model: Option<String>,
    /// Sampling temperature passed through to the driver
    temperature: Option<f32>,
    /// Token cap passed through to the driver
    max_tokens: Option<u32>,
    /// Advisory target slide count for the composition prompt (not a cap)
    slide_count_hint: Option<u32>,
    /// Maximum concurrent per-slide parameter generation calls
    #[builder(default = "4")]
    fan_out: usize,
    /// Per-call deadline; an elapsed call follows the same retry path as a
    /// parse failure
    #[builder(default = "Duration::from_secs(120)")]
    call_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            max_tokens: None,
            slide_count_hint: None,
            fan_out: 4,
            call_timeout: Duration::from_secs(120),
        }
    }
}
