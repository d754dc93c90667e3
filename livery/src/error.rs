use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced by Livery.
#[derive(Debug, Error)]
pub enum Error {
    #[error("plugin \"{0}\" is not registered in the theme configuration")]
    PluginNotRegistered(String),
    #[error("plugin asset not found: {0}")]
    PluginAssetNotFound(PathBuf),
    #[error("template \"{0}\" not found at {1}")]
    TemplateNotFound(String, PathBuf),
    #[error("failed to load theme configuration from {0}")]
    FailedToLoadConfig(PathBuf),
    #[error("no configuration named \"{0}\" found in {1}")]
    NoSuchConfig(String, PathBuf),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
    #[error("failed to load view from {0}")]
    FailedToLoadView(PathBuf),
    #[error("template data must be an object")]
    TemplateDataMustBeObject,
    #[error("failed to parse template \"{0}\": {1}")]
    TemplateParse(String, handlebars::TemplateError),
    #[error("failed to render template \"{0}\": {1}")]
    TemplateRender(String, handlebars::RenderError),
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
