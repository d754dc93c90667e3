//! Livery manages the CSS/JS assets and layout templates of a themed,
//! server-rendered HTML page.
//!
//! Application code registers assets and plugins on a [`Themes`] context,
//! picks a theme and template set, and renders a body view into the theme's
//! header, main template and footer. For a command line interface, see the
//! `livery-cli` crate.

mod asset;
mod config;
mod error;
mod fs;
mod hash;
mod route;
mod template;
mod themes;
mod url;
mod vars;
mod view;

pub use asset::{AssetList, AssetRefs, AssetSet};
pub use config::{ConfigLoader, FileConfigLoader, Plugin, ThemeConfig};
pub use error::Error;
pub use route::{RouteInfo, StaticRoute};
pub use themes::Themes;
pub use url::BaseUrl;
pub use vars::TemplateVars;
pub use view::{HandlebarsViews, ViewRenderer};
