use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, WrapErr};
use livery::{ConfigLoader, FileConfigLoader, HandlebarsViews, StaticRoute, TemplateVars, Themes};

#[derive(Parser, Debug)]
#[clap(name = "livery", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Directory containing the theme configuration file. Relative public and
    /// views paths in the configuration are resolved against it.
    #[clap(long, default_value = ".")]
    config_dir: PathBuf,

    /// Name of the configuration file, without extension.
    #[clap(long, default_value = "themes")]
    config_name: String,

    /// Theme to render with, instead of the configured one.
    #[clap(long)]
    theme: Option<String>,

    /// Main layout template to use.
    #[clap(long)]
    template: Option<String>,

    /// Header partial to use.
    #[clap(long)]
    header: Option<String>,

    /// Footer partial to use.
    #[clap(long)]
    footer: Option<String>,

    /// Render only the main template, without header and footer.
    #[clap(long)]
    full_template: bool,

    /// Comma-separated theme stylesheets.
    #[clap(long)]
    css: Option<String>,

    /// Comma-separated theme scripts.
    #[clap(long)]
    js: Option<String>,

    /// Comma-separated external stylesheet URLs.
    #[clap(long)]
    external_css: Option<String>,

    /// Comma-separated external script URLs.
    #[clap(long)]
    external_js: Option<String>,

    /// Comma-separated plugins to load.
    #[clap(long)]
    plugins: Option<String>,

    /// JSON or YAML file with variables for the templates.
    #[clap(long)]
    data: Option<PathBuf>,

    /// Page title.
    #[clap(long)]
    title: Option<String>,

    /// Route (`Controller::action`) from which to derive a default page
    /// title. Without it, rendering is headless.
    #[clap(long)]
    route: Option<StaticRoute>,

    /// Write the page to this file instead of standard output.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// The view to render, or literal content.
    body: Option<String>,
}

fn main() {
    let args = Args::parse();
    simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    })
    .unwrap();

    match render_page(&args) {
        Ok(_) => log::info!("Success!"),
        Err(e) => {
            log::error!("Failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

fn render_page(args: &Args) -> Result<()> {
    let loader = FileConfigLoader::new(&args.config_dir);
    let config = loader.load(&args.config_name)?;
    let mut themes = Themes::new(loader, HandlebarsViews::new());
    themes = match &args.route {
        Some(route) => themes.with_route(route.clone()),
        None => themes.headless(true),
    };
    themes
        .init(Some(config))?
        .set_theme(args.theme.as_deref())
        .set_template(args.template.as_deref())
        .set_header(args.header.as_deref())
        .set_footer(args.footer.as_deref());
    if args.full_template {
        themes.use_full_template(true);
    }
    if let Some(title) = &args.title {
        themes.set_page_title(title);
    }
    if let Some(css) = &args.css {
        themes.add_css(css);
    }
    if let Some(js) = &args.js {
        themes.add_js(js);
    }
    if let Some(css) = &args.external_css {
        themes.add_external_css(css);
    }
    if let Some(js) = &args.external_js {
        themes.add_external_js(js);
    }
    if let Some(plugins) = &args.plugins {
        themes.load_plugins(plugins)?;
    }

    let data = match &args.data {
        Some(path) => load_data(path)?,
        None => TemplateVars::default(),
    };
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create output file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            themes.render(args.body.as_deref(), data, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            themes.render(args.body.as_deref(), data, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn load_data(path: &Path) -> Result<TemplateVars> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read data file {}", path.display()))?;
    let value: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(TemplateVars::try_from(value)?)
}
