//! Template rendering error types.

/// A template could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A variable was missing or the template does not parse.
    #[error("Failed to render {template} template: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}
