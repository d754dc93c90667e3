//! The per-render-cycle theme context.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use eyre::Result;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::asset::AssetList;
use crate::fs::{modified_secs, view_file_name, with_default_ext};
use crate::vars::{CONTENT, CSS_TAGS, IMAGE_URL, JS_TAGS, PAGE_TITLE, PLUGIN_URL, THEME_URL};
use crate::{
    AssetRefs, AssetSet, ConfigLoader, Error, RouteInfo, TemplateVars, ThemeConfig, ViewRenderer,
};

/// Name under which the configuration is requested from the loader.
const CONFIG_NAME: &str = "themes";

/// Asset type of plugin stylesheets.
const PLUGIN_CSS: &str = "css";
/// Asset type of plugin scripts.
const PLUGIN_JS: &str = "js";

/// Holds the theme configuration, registered assets and template variables
/// of a single render cycle, and renders pages from them.
///
/// A context is meant to be created per request. Registration methods and
/// setters return the context itself so that calls can be chained:
///
/// ```rust,ignore
/// let mut themes = Themes::new(FileConfigLoader::new("config"), HandlebarsViews::new());
/// themes
///     .init(None)?
///     .set_theme("admin")
///     .add_css("style.css, print.css")
///     .add_external_js("https://cdn.example.com/lib.js")
///     .load_plugins("datatables")?;
/// themes.render(Some("dashboard"), TemplateVars::default(), &mut std::io::stdout())?;
/// ```
pub struct Themes {
    loader: Box<dyn ConfigLoader>,
    views: Box<dyn ViewRenderer>,
    route: Option<Box<dyn RouteInfo>>,
    // Title derivation from the route is disabled in headless contexts.
    headless: bool,
    config: Option<ThemeConfig>,
    assets: AssetSet,
    vars: TemplateVars,
    // Explicitly set page title, which takes precedence over everything else.
    page_title: Option<String>,
}

impl Themes {
    /// Constructor. The context is not initialized until [`Themes::init`] is
    /// called or a page is rendered.
    pub fn new<L, V>(loader: L, views: V) -> Self
    where
        L: ConfigLoader + 'static,
        V: ViewRenderer + 'static,
    {
        Self {
            loader: Box::new(loader),
            views: Box::new(views),
            route: None,
            headless: false,
            config: None,
            assets: AssetSet::default(),
            vars: TemplateVars::default(),
            page_title: None,
        }
    }

    /// Use the given route to derive default page titles.
    pub fn with_route<R: RouteInfo + 'static>(mut self, route: R) -> Self {
        self.route = Some(Box::new(route));
        self
    }

    /// Marks this context as non-interactive (e.g. a command line
    /// invocation), which disables page title derivation from the route.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Initializes the context from the given configuration, or from the
    /// configuration loader if none is given.
    ///
    /// Discards all previously registered assets and variables, then applies
    /// the configured theme.
    pub fn init(&mut self, config: Option<ThemeConfig>) -> Result<&mut Self> {
        let config = match config {
            Some(config) => config,
            None => self.loader.load(CONFIG_NAME)?,
        };
        debug!("Initializing themes with theme \"{}\"", config.theme);
        self.assets.clear();
        self.vars.clear();
        self.page_title = None;
        store_theme_urls(&config, &mut self.vars);
        self.config = Some(config);
        Ok(self)
    }

    /// Switches to the given theme and recomputes the theme, image and plugin
    /// base URLs. Passing `None` keeps the current theme.
    pub fn set_theme<'a>(&mut self, theme: impl Into<Option<&'a str>>) -> &mut Self {
        match self.config.as_mut() {
            Some(config) => {
                if let Some(theme) = theme.into() {
                    config.theme = theme.to_string();
                }
                store_theme_urls(config, &mut self.vars);
            }
            None => warn!("Themes not initialized, ignoring theme change"),
        }
        self
    }

    /// Sets the main layout template. Passing `None` is a no-op.
    pub fn set_template<'a>(&mut self, template: impl Into<Option<&'a str>>) -> &mut Self {
        if let Some(template) = template.into() {
            self.update_config("template", |config| config.template = template.to_string());
        }
        self
    }

    /// Sets the header partial. Passing `None` is a no-op.
    pub fn set_header<'a>(&mut self, header: impl Into<Option<&'a str>>) -> &mut Self {
        if let Some(header) = header.into() {
            self.update_config("header", |config| config.header = header.to_string());
        }
        self
    }

    /// Sets the footer partial. Passing `None` is a no-op.
    pub fn set_footer<'a>(&mut self, footer: impl Into<Option<&'a str>>) -> &mut Self {
        if let Some(footer) = footer.into() {
            self.update_config("footer", |config| config.footer = footer.to_string());
        }
        self
    }

    /// Whether to render only the main template, without header and footer.
    /// Passing `None` is a no-op.
    pub fn use_full_template(&mut self, use_full_template: impl Into<Option<bool>>) -> &mut Self {
        if let Some(full) = use_full_template.into() {
            self.update_config("use_full_template", |config| config.use_full_template = full);
        }
        self
    }

    fn update_config<F: FnOnce(&mut ThemeConfig)>(&mut self, field: &str, f: F) {
        match self.config.as_mut() {
            Some(config) => f(config),
            None => warn!("Themes not initialized, ignoring change to {}", field),
        }
    }

    /// Registers stylesheets relative to the theme's CSS directory.
    pub fn add_css<R: AssetRefs>(&mut self, css: R) -> &mut Self {
        self.assets.css.extend(css);
        self
    }

    /// Registers scripts relative to the theme's JS directory.
    pub fn add_js<R: AssetRefs>(&mut self, js: R) -> &mut Self {
        self.assets.js.extend(js);
        self
    }

    /// Registers fully qualified stylesheet URLs.
    pub fn add_external_css<R: AssetRefs>(&mut self, css: R) -> &mut Self {
        self.assets.external_css.extend(css);
        self
    }

    /// Registers fully qualified script URLs.
    pub fn add_external_js<R: AssetRefs>(&mut self, js: R) -> &mut Self {
        self.assets.external_js.extend(js);
        self
    }

    /// Registers an inline script body.
    pub fn add_inline_js(&mut self, script: &str) -> &mut Self {
        self.assets.inline_js.insert(script);
        self
    }

    /// Loads the files of the given plugins from the theme's plugin
    /// directory.
    ///
    /// Fails if a plugin is not in the configured catalog, or if one of its
    /// files does not exist.
    pub fn load_plugins<R: AssetRefs>(&mut self, plugins: R) -> Result<&mut Self> {
        let config = initialized(&mut self.config, self.loader.as_ref(), &mut self.vars)?;
        let plugin_dir = config.plugin_dir();
        let plugin_url = config.base_url.dir(&config.theme_relative(&config.plugin_path));
        for id in plugins.into_refs() {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            let plugin = config
                .plugins
                .get(id)
                .ok_or_else(|| Error::PluginNotRegistered(id.to_string()))?;
            for (asset_type, files) in plugin {
                for file in files {
                    let file = file.trim().trim_start_matches('/');
                    let path = plugin_dir.join(file);
                    let inside = Path::new(file)
                        .components()
                        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
                    if !inside || !path.is_file() {
                        return Err(Error::PluginAssetNotFound(path).into());
                    }
                    self.assets
                        .plugins
                        .entry(asset_type.clone())
                        .or_default()
                        .push(format!("{}{}", plugin_url, file));
                }
            }
            debug!("Loaded plugin {}", id);
        }
        Ok(self)
    }

    /// Sets a variable to be passed into the templates.
    pub fn set_var<K, V>(&mut self, key: K, value: V) -> Result<&mut Self>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        self.vars.set(key, value)?;
        Ok(self)
    }

    /// Sets all of the given variables, overwriting existing ones.
    pub fn set_vars(&mut self, vars: TemplateVars) -> &mut Self {
        self.vars.extend(vars);
        self
    }

    /// Sets the page title. An explicitly set title takes precedence over a
    /// `page_title` variable and over the title derived from the route.
    pub fn set_page_title(&mut self, title: &str) -> &mut Self {
        self.page_title = Some(title.to_string());
        self.vars.insert(PAGE_TITLE, Value::String(title.to_string()));
        self
    }

    /// All variables that will be passed into the templates.
    pub fn data(&self) -> &TemplateVars {
        &self.vars
    }

    /// The active configuration, if the context has been initialized.
    pub fn config(&self) -> Option<&ThemeConfig> {
        self.config.as_ref()
    }

    /// All registered assets.
    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    /// Renders the given body into the active theme's templates and writes
    /// the result to `out`.
    ///
    /// A body that names an existing view in the configured views directory
    /// is rendered as a view; any other body is used verbatim as content.
    pub fn render<W: Write>(
        &mut self,
        body: Option<&str>,
        data: TemplateVars,
        out: &mut W,
    ) -> Result<()> {
        let config = initialized(&mut self.config, self.loader.as_ref(), &mut self.vars)?.clone();
        self.vars.extend(data);

        let theme_dir = config.theme_dir();
        let ext = config.template_extension.as_str();
        let template = self
            .views
            .locate(&config.template, &theme_dir, ext)
            .ok_or_else(|| {
                Error::TemplateNotFound(
                    config.template.clone(),
                    theme_dir.join(view_file_name(&config.template, ext)),
                )
            })?;

        // Asset markup goes in first so that body views can emit it too.
        let css = self.css_markup()?;
        let js = self.js_markup()?;
        self.vars.insert(CSS_TAGS, Value::String(css));
        self.vars.insert(JS_TAGS, Value::String(js));
        let content = self.resolve_content(&config, body)?;
        let page_title = self.resolve_page_title();
        debug!("Rendering page \"{}\" with theme {}", page_title, config.theme);
        self.vars.insert(CONTENT, Value::String(content));
        self.vars.insert(PAGE_TITLE, Value::String(page_title));

        let mut pieces: Vec<PathBuf> = Vec::with_capacity(3);
        if config.use_full_template {
            pieces.push(template);
        } else {
            match self.views.locate(&config.header, &theme_dir, ext) {
                Some(header) => pieces.push(header),
                None => debug!("No header \"{}\" in theme {}", config.header, config.theme),
            }
            pieces.push(template);
            match self.views.locate(&config.footer, &theme_dir, ext) {
                Some(footer) => pieces.push(footer),
                None => debug!("No footer \"{}\" in theme {}", config.footer, config.theme),
            }
        }
        for piece in pieces {
            let rendered = self.views.render(&piece, &self.vars)?;
            write_output(out, &rendered)?;
        }
        Ok(())
    }

    /// Convenience method that renders a page into a string.
    pub fn render_to_string(&mut self, body: Option<&str>, data: TemplateVars) -> Result<String> {
        let mut out = Vec::new();
        self.render(body, data, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn resolve_content(&mut self, config: &ThemeConfig, body: Option<&str>) -> Result<String> {
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => return Ok(String::new()),
        };
        match self
            .views
            .locate(body, &config.views_path, &config.template_extension)
        {
            Some(path) => {
                debug!("Rendering body view {}", path.display());
                self.views.render(&path, &self.vars)
            }
            None => {
                debug!("No view found for body, using it as content");
                Ok(body.to_string())
            }
        }
    }

    fn resolve_page_title(&self) -> String {
        if let Some(title) = &self.page_title {
            return title.clone();
        }
        match self.vars.get(PAGE_TITLE) {
            Some(Value::String(title)) => return title.clone(),
            Some(Value::Null) | None => (),
            Some(other) => return other.to_string(),
        }
        match &self.route {
            Some(route) if !self.headless => route.default_title(),
            _ => String::new(),
        }
    }

    /// Writes the stylesheet tags: external stylesheets, then plugin
    /// stylesheets, then the theme's own stylesheets.
    pub fn render_css<W: Write>(&self, out: &mut W) -> Result<()> {
        write_output(out, &self.css_markup()?)
    }

    /// Writes the script tags: external scripts, then plugin scripts, then
    /// the theme's own scripts, then a single block with all inline scripts.
    pub fn render_js<W: Write>(&self, out: &mut W) -> Result<()> {
        write_output(out, &self.js_markup()?)
    }

    /// The markup written by [`Themes::render_css`].
    pub fn css_markup(&self) -> Result<String> {
        let mut markup = String::new();
        for url in self.assets.external_css.iter() {
            markup.push_str(&link_tag(url));
        }
        for url in self.assets.plugin_assets(PLUGIN_CSS) {
            markup.push_str(&link_tag(url));
        }
        for url in self.local_asset_urls(&self.assets.css, Local::Css)? {
            markup.push_str(&link_tag(&url));
        }
        Ok(markup)
    }

    /// The markup written by [`Themes::render_js`].
    pub fn js_markup(&self) -> Result<String> {
        let mut markup = String::new();
        for url in self.assets.external_js.iter() {
            markup.push_str(&script_tag(url));
        }
        for url in self.assets.plugin_assets(PLUGIN_JS) {
            markup.push_str(&script_tag(url));
        }
        for url in self.local_asset_urls(&self.assets.js, Local::Js)? {
            markup.push_str(&script_tag(&url));
        }
        if !self.assets.inline_js.is_empty() {
            markup.push_str("<script type=\"text/javascript\">\n");
            for script in self.assets.inline_js.iter() {
                markup.push_str(script);
                markup.push('\n');
            }
            markup.push_str("</script>\n");
        }
        Ok(markup)
    }

    // Versioned URLs of the theme's own assets. Assets whose files do not
    // exist are skipped.
    fn local_asset_urls(&self, list: &AssetList, kind: Local) -> Result<Vec<String>> {
        if list.is_empty() {
            return Ok(Vec::new());
        }
        let config = match &self.config {
            Some(config) => config,
            None => {
                warn!("Themes not initialized, skipping {} theme assets", list.len());
                return Ok(Vec::new());
            }
        };
        let (sub, ext) = match kind {
            Local::Css => (config.css_path.as_str(), ".css"),
            Local::Js => (config.js_path.as_str(), ".js"),
        };
        let mut urls = Vec::with_capacity(list.len());
        for asset in list.iter() {
            let rel = format!(
                "{}/{}",
                config.theme_relative(sub),
                with_default_ext(asset.trim_start_matches('/'), ext)
            );
            let path = config.public_path.join(&rel);
            if !path.is_file() {
                warn!("Skipping missing theme asset {}", path.display());
                continue;
            }
            let version = modified_secs(&path)?;
            urls.push(config.base_url.url(&format!("{}?v={}", rel, version)));
        }
        Ok(urls)
    }
}

#[derive(Debug, Clone, Copy)]
enum Local {
    Css,
    Js,
}

// Loads the configuration through the loader if the context has not been
// initialized yet. Registered assets and variables are kept.
fn initialized<'c>(
    config: &'c mut Option<ThemeConfig>,
    loader: &dyn ConfigLoader,
    vars: &mut TemplateVars,
) -> Result<&'c mut ThemeConfig> {
    match config {
        Some(config) => Ok(config),
        None => {
            debug!("Lazily loading theme configuration \"{}\"", CONFIG_NAME);
            let loaded = loader.load(CONFIG_NAME)?;
            store_theme_urls(&loaded, vars);
            Ok(config.insert(loaded))
        }
    }
}

fn store_theme_urls(config: &ThemeConfig, vars: &mut TemplateVars) {
    let base = &config.base_url;
    let urls = [
        (THEME_URL, base.dir(&config.theme_relative(""))),
        (IMAGE_URL, base.dir(&config.theme_relative(&config.image_path))),
        (PLUGIN_URL, base.dir(&config.theme_relative(&config.plugin_path))),
    ];
    for (key, url) in urls {
        vars.insert(key, Value::String(url));
    }
}

fn write_output<W: Write>(out: &mut W, s: &str) -> Result<()> {
    out.write_all(s.as_bytes())
        .map_err(|e| Error::Io("while writing rendered output".to_string(), e))?;
    Ok(())
}

fn link_tag(href: &str) -> String {
    format!(
        "<link href=\"{}\" rel=\"stylesheet\" type=\"text/css\" />\n",
        escape_attr(href)
    )
}

fn script_tag(src: &str) -> String {
    format!(
        "<script src=\"{}\" type=\"text/javascript\"></script>\n",
        escape_attr(src)
    )
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
