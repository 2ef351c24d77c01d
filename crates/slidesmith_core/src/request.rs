//! Request and response types for LLM generation.

use serde::{Deserialize, Serialize};

/// A single-prompt generation request.
///
/// # Examples
///
/// ```
/// use slidesmith_core::GenerateRequest;
///
/// let request = GenerateRequest {
///     prompt: "Summarize this script".to_string(),
///     model: Some("qwen3:0.6b".to_string()),
///     temperature: Some(0.3),
///     max_tokens: None,
/// };
///
/// assert!(request.prompt.contains("script"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateRequest {
    /// The fully assembled prompt text
    pub prompt: String,
    /// Model identifier to use
    pub model: Option<String>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    /// Create a request carrying only a prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// The raw model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw generated text, possibly containing prose around JSON
    pub text: String,
}

impl GenerateResponse {
    /// Create a response from raw text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
