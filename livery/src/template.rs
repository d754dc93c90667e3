//! Handlebars helpers available to theme templates and views.

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};

use crate::vars::{CSS_TAGS, JS_TAGS};

/// Emits the stylesheet tags of the current render cycle.
///
/// Usage:
///
/// ```handlebars
/// <head>
///   {{ render_css }}
/// </head>
/// ```
///
/// Produces external stylesheets first, then plugin stylesheets and finally
/// the theme's own (versioned) stylesheets.
pub fn render_css(
    _: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    write_markup(ctx, CSS_TAGS, out)
}

/// Emits the script tags of the current render cycle, followed by a single
/// block holding all registered inline scripts.
///
/// Usage:
///
/// ```handlebars
///   {{ render_js }}
/// </body>
/// ```
pub fn render_js(
    _: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    write_markup(ctx, JS_TAGS, out)
}

// Markup is written as-is: it was escaped when the tags were built.
fn write_markup(ctx: &Context, key: &str, out: &mut dyn Output) -> HelperResult {
    if let Some(markup) = ctx.data().get(key).and_then(|v| v.as_str()) {
        out.write(markup)?;
    }
    Ok(())
}
