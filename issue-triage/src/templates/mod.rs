//! Markdown templates rendered with Handlebars.
//!
//! The templates are compiled into the binary from the crate's `templates/`
//! directory.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer, PLACEHOLDER};

/// Templates shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTemplate {
    /// Body asking the operator to clarify a vague request.
    Clarification,
    /// Full structured issue body.
    StructuredIssue,
    /// Comment posted by `/reject`.
    RejectComment,
}

impl BuiltinTemplate {
    pub const ALL: [BuiltinTemplate; 3] = [
        BuiltinTemplate::Clarification,
        BuiltinTemplate::StructuredIssue,
        BuiltinTemplate::RejectComment,
    ];

    /// Name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Clarification => "clarification",
            Self::StructuredIssue => "structured issue",
            Self::RejectComment => "reject comment",
        }
    }

    /// Template source.
    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Clarification => include_str!("../../templates/clarification.md.hbs"),
            Self::StructuredIssue => include_str!("../../templates/structured.md.hbs"),
            Self::RejectComment => include_str!("../../templates/reject-comment.md.hbs"),
        }
    }
}
