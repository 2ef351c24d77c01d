//! Rendered slide and deck types.

use serde::{Deserialize, Serialize};

/// One slide with every placeholder substituted.
///
/// Invariant: no unresolved `${...}` marker for a required placeholder
/// remains in `content` (the renderer fails rather than emit one).
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct RenderedSlide {
    /// Template the slide was rendered from
    template_name: String,
    /// Final slide source text
    content: String,
}

impl RenderedSlide {
    /// Create a new rendered slide.
    pub fn new(template_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            content: content.into(),
        }
    }
}

/// The final concatenated deck source.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct Deck {
    /// Slides in presentation order
    slides: Vec<RenderedSlide>,
    /// Complete deck source text, slides joined by the catalog separator
    source: String,
}

impl Deck {
    /// Create a deck from rendered slides and the joined source text.
    pub fn new(slides: Vec<RenderedSlide>, source: impl Into<String>) -> Self {
        Self {
            slides,
            source: source.into(),
        }
    }

    /// Number of slides in the deck.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
