//! Locating and rendering views and theme templates.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use eyre::{Result, WrapErr};
use handlebars::Handlebars;
use log::debug;
use pulldown_cmark::{Options, Parser};

use crate::fs::view_file_name;
use crate::hash::sha256;
use crate::template::{render_css, render_js};
use crate::{Error, TemplateVars};

/// The view engine used to evaluate body views and theme templates.
pub trait ViewRenderer {
    /// Resolves `view` to an existing file inside `dir`. Views given without
    /// an extension are looked up with `ext` appended.
    ///
    /// Absolute views and views that would escape `dir` never resolve.
    fn locate(&self, view: &str, dir: &Path, ext: &str) -> Option<PathBuf> {
        let view = view.trim();
        if view.is_empty() {
            return None;
        }
        let rel = Path::new(view);
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        let path = dir.join(view_file_name(view, ext));
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Renders the view stored at `path` with the given variables.
    fn render(&mut self, path: &Path, vars: &TemplateVars) -> Result<String>;
}

/// Renders views with [Handlebars](https://handlebarsjs.com/).
///
/// Views with a `.md` extension are rendered as Handlebars first and the
/// result is converted from Markdown to HTML.
pub struct HandlebarsViews {
    hb: Handlebars<'static>,
    // Maps template names -> content hashes.
    template_hashes: HashMap<String, String>,
}

impl Default for HandlebarsViews {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlebarsViews {
    /// Constructor.
    pub fn new() -> Self {
        let mut hb = Handlebars::new();
        hb.register_helper("render_css", Box::new(render_css));
        hb.register_helper("render_js", Box::new(render_js));
        Self {
            hb,
            template_hashes: HashMap::new(),
        }
    }

    /// Compiles the given template under the given name, unless a template
    /// with identical content is already registered under it.
    fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        let template_hash = sha256(template);
        if self.template_hashes.get(name) == Some(&template_hash) {
            debug!(
                "Already have template {} with hash {}, skipping",
                name, template_hash
            );
            return Ok(());
        }
        debug!("Registering template {} with hash {}", name, template_hash);
        self.hb
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateParse(name.to_string(), e))?;
        self.template_hashes.insert(name.to_string(), template_hash);
        Ok(())
    }
}

impl ViewRenderer for HandlebarsViews {
    fn render(&mut self, path: &Path, vars: &TemplateVars) -> Result<String> {
        let name = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", name), e))
            .wrap_err_with(|| Error::FailedToLoadView(path.to_path_buf()))?;
        self.register_template(&name, &content)?;
        let rendered = self
            .hb
            .render(&name, vars)
            .map_err(|e| Error::TemplateRender(name.clone(), e))?;
        if path.extension().and_then(OsStr::to_str) == Some("md") {
            debug!("Converting Markdown view {} to HTML", name);
            Ok(markdown_to_html(&rendered))
        } else {
            Ok(rendered)
        }
    }
}

fn markdown_to_html(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(content, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
