//! Theme configuration and the loaders that produce it.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::fs::maybe_canonicalize;
use crate::{BaseUrl, Error};

/// A plugin maps asset types (e.g. `css`, `js`) to the ordered list of files,
/// relative to the theme's plugin directory, that make up the plugin.
pub type Plugin = BTreeMap<String, Vec<String>>;

/// Theme configuration.
///
/// Loaded once when a [`crate::Themes`] context is initialized and mutable
/// afterwards through the context's setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Name of the active theme (a directory under `theme_path`).
    pub theme: String,
    /// Main layout template.
    pub template: String,
    /// Optional header partial, rendered before the main template.
    pub header: String,
    /// Optional footer partial, rendered after the main template.
    pub footer: String,
    /// Render only the main template, without header and footer.
    pub use_full_template: bool,
    /// URL under which `public_path` is served.
    pub base_url: BaseUrl,
    /// Filesystem directory served at `base_url`.
    pub public_path: PathBuf,
    pub theme_path: String,
    pub css_path: String,
    pub js_path: String,
    pub image_path: String,
    pub plugin_path: String,
    /// Directory in which body views are looked up.
    pub views_path: PathBuf,
    /// Extension appended to template, header, footer and body view names
    /// that are given without one.
    pub template_extension: String,
    /// Catalog of plugins that may be loaded at runtime.
    pub plugins: BTreeMap<String, Plugin>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            template: "index".to_string(),
            header: "header".to_string(),
            footer: "footer".to_string(),
            use_full_template: false,
            base_url: BaseUrl::default(),
            public_path: PathBuf::from("public"),
            theme_path: "themes".to_string(),
            css_path: "css".to_string(),
            js_path: "js".to_string(),
            image_path: "img".to_string(),
            plugin_path: "plugins".to_string(),
            views_path: PathBuf::from("views"),
            template_extension: ".html".to_string(),
            plugins: BTreeMap::new(),
        }
    }
}

impl ThemeConfig {
    /// Load configuration from the given JSON or YAML file. The format is
    /// determined from the file's extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .ok_or_else(|| Error::UnsupportedFileType(path.to_path_buf()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        let config = match ext.as_str() {
            "json" => serde_json::from_str::<Self>(&content).map_err(Error::from),
            "yaml" | "yml" => serde_yaml::from_str::<Self>(&content).map_err(Error::from),
            _ => return Err(Error::UnsupportedFileType(path.to_path_buf()).into()),
        }
        .wrap_err_with(|| Error::FailedToLoadConfig(path.to_path_buf()))?;
        debug!("Loaded theme configuration from {}", path.display());
        Ok(config)
    }

    /// Path of the active theme, relative to the public directory and using
    /// forward slashes (so it can be used in URLs).
    pub fn theme_relative(&self, sub: &str) -> String {
        let mut rel = format!("{}/{}", self.theme_path.trim_matches('/'), self.theme);
        let sub = sub.trim_matches('/');
        if !sub.is_empty() {
            rel.push('/');
            rel.push_str(sub);
        }
        rel
    }

    /// Filesystem directory of the active theme.
    pub fn theme_dir(&self) -> PathBuf {
        self.public_path.join(self.theme_relative(""))
    }

    /// Filesystem directory of the active theme's plugins.
    pub fn plugin_dir(&self) -> PathBuf {
        self.public_path.join(self.theme_relative(&self.plugin_path))
    }
}

/// Supplies the initial configuration of a [`crate::Themes`] context when
/// none is passed in explicitly.
pub trait ConfigLoader {
    fn load(&self, name: &str) -> Result<ThemeConfig>;
}

/// An in-memory configuration acts as a loader for itself.
impl ConfigLoader for ThemeConfig {
    fn load(&self, _name: &str) -> Result<ThemeConfig> {
        Ok(self.clone())
    }
}

/// Loads named configurations from `<dir>/<name>.json`, `<dir>/<name>.yaml`
/// or `<dir>/<name>.yml`, whichever is found first.
///
/// Relative `public_path` and `views_path` values are resolved against `dir`.
#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    dir: PathBuf,
}

impl FileConfigLoader {
    const EXTENSIONS: &'static [&'static str] = &["json", "yaml", "yml"];

    /// Constructor.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self, name: &str) -> Result<ThemeConfig> {
        for ext in Self::EXTENSIONS {
            let path = self.dir.join(format!("{}.{}", name, ext));
            debug!("Attempting to load config file: {}", path.display());
            if let Some(path) = maybe_canonicalize(&path)? {
                if path.is_file() {
                    let mut config = ThemeConfig::load_from_file(&path)?;
                    config.public_path = self.dir.join(&config.public_path);
                    config.views_path = self.dir.join(&config.views_path);
                    return Ok(config);
                }
            }
        }
        Err(Error::NoSuchConfig(name.to_string(), self.dir.clone()).into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_yaml_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("themes.yaml"),
            r#"
theme: admin
use_full_template: true
plugins:
  datatables:
    css: [datatables.min.css]
    js: [jquery.min.js, datatables.min.js]
"#,
        )
        .unwrap();
        let config = FileConfigLoader::new(dir.path()).load("themes").unwrap();
        assert_eq!(config.theme, "admin");
        assert!(config.use_full_template);
        assert_eq!(config.template, "index");
        assert_eq!(config.css_path, "css");
        assert_eq!(
            config.plugins["datatables"]["js"],
            vec!["jquery.min.js".to_string(), "datatables.min.js".to_string()]
        );
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("themes.json"),
            r#"{"public_path": "site/public", "views_path": "/srv/views"}"#,
        )
        .unwrap();
        let config = FileConfigLoader::new(dir.path()).load("themes").unwrap();
        assert_eq!(config.public_path, dir.path().join("site/public"));
        assert_eq!(config.views_path, PathBuf::from("/srv/views"));
    }

    #[test]
    fn json_takes_precedence_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("themes.json"), r#"{"theme": "from-json"}"#).unwrap();
        fs::write(dir.path().join("themes.yaml"), "theme: from-yaml\n").unwrap();
        let config = FileConfigLoader::new(dir.path()).load("themes").unwrap();
        assert_eq!(config.theme, "from-json");
    }

    #[test]
    fn missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfigLoader::new(dir.path()).load("themes").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoSuchConfig(name, _)) if name == "themes"
        ));
    }

    #[test]
    fn malformed_config_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("themes.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ThemeConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::FailedToLoadConfig(p)) if p == &path
        ));
    }

    #[test]
    fn theme_paths() {
        let config = ThemeConfig {
            public_path: PathBuf::from("/srv/public"),
            ..ThemeConfig::default()
        };
        assert_eq!(config.theme_relative("css"), "themes/default/css");
        assert_eq!(config.theme_relative(""), "themes/default");
        assert_eq!(config.theme_dir(), PathBuf::from("/srv/public/themes/default"));
        assert_eq!(
            config.plugin_dir(),
            PathBuf::from("/srv/public/themes/default/plugins")
        );
    }
}
