//! Issue body generation.
//!
//! Decides whether a description is actionable and renders either a
//! clarification request or a full structured body. Rendering is pure: the
//! repository profile is supplied by the caller.

use crate::classify::IssueRequest;
use crate::context::RepositoryProfile;
use crate::templates::{BuiltinTemplate, TemplateError, TemplateRenderer};
use serde_json::json;

/// Descriptions shorter than this many words may be too vague.
const VAGUE_WORD_LIMIT: usize = 10;

/// Existing features listed in a clarification request.
const CLARIFICATION_FEATURES: usize = 5;

/// Existing features listed as "do not break" in a structured body.
const STRUCTURED_FEATURES: usize = 8;

/// A rendered issue body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub text: String,
    pub needs_clarification: bool,
}

/// Renders issue bodies.
pub struct BodyGenerator {
    renderer: TemplateRenderer,
    hedge_words: Vec<String>,
    agent_label: String,
}

impl BodyGenerator {
    /// Creates a generator.
    ///
    /// `hedge_words` are matched case-insensitively as substrings.
    pub fn new(hedge_words: &[String], agent_label: impl Into<String>) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            hedge_words: hedge_words.iter().map(|w| w.to_lowercase()).collect(),
            agent_label: agent_label.into(),
        }
    }

    /// True when `description` contains a hedge word *and* has fewer than ten
    /// words.
    #[must_use]
    pub fn needs_clarification(&self, description: &str) -> bool {
        let lowered = description.to_lowercase();
        let hedged = self
            .hedge_words
            .iter()
            .any(|word| lowered.contains(word.as_str()));
        hedged && description.split_whitespace().count() < VAGUE_WORD_LIMIT
    }

    /// Renders the body for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a built-in template fails to render.
    pub fn render(
        &self,
        request: &IssueRequest,
        profile: &RepositoryProfile,
    ) -> Result<RenderedBody, TemplateError> {
        let needs_clarification = self.needs_clarification(&request.description);

        let text = if needs_clarification {
            let data = json!({
                "description": request.description,
                "project": profile,
                "features": leading(&profile.existing_features, CLARIFICATION_FEATURES),
                "original_command": request.original_command(),
            });
            self.renderer.render(BuiltinTemplate::Clarification, &data)?
        } else {
            let data = json!({
                "kind_label": request.kind.title_label(),
                "subject": request.title_subject(),
                "description_lower": request.description.to_lowercase(),
                "project": profile,
                "features": leading(&profile.existing_features, STRUCTURED_FEATURES),
                "repository": request.repository.full_name(),
                "agent_label": self.agent_label,
                "original_command": request.original_command(),
            });
            self.renderer.render(BuiltinTemplate::StructuredIssue, &data)?
        };

        Ok(RenderedBody {
            text,
            needs_clarification,
        })
    }
}

fn leading(items: &[String], limit: usize) -> &[String] {
    &items[..items.len().min(limit)]
}
