//! Deck assembly from templates and generated parameters.

use crate::catalog::SlideCatalog;
use crate::store::substitute;
use slidesmith_core::{Deck, RenderedSlide, SlideParameterSet};
use slidesmith_error::{PipelineError, PipelineErrorKind, SlidesmithError};

/// Substitute each parameter set into its template body and join the results.
///
/// Stage 3 already guarantees placeholder coverage for every surviving slide,
/// so a missing variable here is an upstream bug and aborts the render rather
/// than silently emitting a partial deck.
#[tracing::instrument(skip_all, fields(slides = parameter_sets.len()))]
pub(crate) fn render_deck(
    catalog: &SlideCatalog,
    parameter_sets: &[SlideParameterSet],
) -> Result<Deck, SlidesmithError> {
    let mut slides = Vec::with_capacity(parameter_sets.len());
    for set in parameter_sets {
        let descriptor = catalog.get(set.template_name()).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::RenderFailed(format!(
                "template '{}' not found in catalog '{}'",
                set.template_name(),
                catalog.name()
            )))
        })?;
        let content = substitute(descriptor.body(), set.parameters()).map_err(|e| {
            PipelineError::new(PipelineErrorKind::RenderFailed(format!(
                "slide '{}': {}",
                set.template_name(),
                e
            )))
        })?;
        slides.push(RenderedSlide::new(set.template_name().clone(), content));
    }

    let source = slides
        .iter()
        .map(|slide| slide.content().as_str())
        .collect::<Vec<_>>()
        .join(catalog.separator());
    tracing::debug!(bytes = source.len(), "Assembled deck source");
    Ok(Deck::new(slides, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn renders_lead_slide_from_parameters() {
        let catalog = SlideCatalog::builtin().unwrap();
        let params = SlideParameterSet::new(
            "lead_slide".to_string(),
            BTreeMap::from([("main_topic".to_string(), "Ownership".to_string())]),
        );
        let deck = render_deck(&catalog, &[params]).unwrap();
        assert_eq!(deck.len(), 1);
        assert!(deck.source().contains("Ownership"));
        assert!(!deck.source().contains("${main_topic}"));
    }

    #[test]
    fn missing_parameter_is_a_render_failure() {
        let catalog = SlideCatalog::builtin().unwrap();
        let params = SlideParameterSet::new("lead_slide".to_string(), BTreeMap::new());
        let err = render_deck(&catalog, &[params]).unwrap_err();
        assert!(err.to_string().contains("lead_slide"));
    }

    #[test]
    fn unknown_template_is_a_render_failure() {
        let catalog = SlideCatalog::builtin().unwrap();
        let params = SlideParameterSet::new("nope".to_string(), BTreeMap::new());
        assert!(render_deck(&catalog, &[params]).is_err());
    }

    #[test]
    fn slides_join_with_catalog_separator() {
        let catalog = SlideCatalog::builtin().unwrap();
        let a = SlideParameterSet::new(
            "lead_slide".to_string(),
            BTreeMap::from([("main_topic".to_string(), "A".to_string())]),
        );
        let b = SlideParameterSet::new(
            "conclusion_slide".to_string(),
            BTreeMap::from([("content".to_string(), "B".to_string())]),
        );
        let deck = render_deck(&catalog, &[a, b]).unwrap();
        assert_eq!(deck.len(), 2);
        assert!(deck.source().contains(catalog.separator()));
    }
}
