//! Template renderer.

use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::Value;

use super::BuiltinTemplate;

/// Text written in place of an empty profile field.
pub const PLACEHOLDER: &str = "_da definire_";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `or_tbd` helper that substitutes [`PLACEHOLDER`] for blank values
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("or_tbd", Box::new(or_tbd_helper));
    hbs
}

/// Writes the parameter, or [`PLACEHOLDER`] when it is blank.
///
/// Usage: `{{or_tbd project.platforms}}`
fn or_tbd_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    out.write(value.unwrap_or(PLACEHOLDER))?;
    Ok(())
}

/// Renders the built-in markdown templates.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders one of the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or the template is invalid.
    pub fn render(
        &self,
        template: BuiltinTemplate,
        data: &Value,
    ) -> Result<String, super::TemplateError> {
        self.render_named(template.name(), template.source(), data)
    }

    /// Renders an arbitrary template string.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or the template is invalid.
    pub fn render_template(
        &self,
        template: &str,
        data: &Value,
    ) -> Result<String, super::TemplateError> {
        self.render_named("inline", template, data)
    }

    fn render_named(
        &self,
        name: &'static str,
        template: &str,
        data: &Value,
    ) -> Result<String, super::TemplateError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|source| super::TemplateError::Render {
                template: name,
                source: Box::new(source),
            })
    }
}
