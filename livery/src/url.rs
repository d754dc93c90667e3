//! Base URL handling.

use serde::{Deserialize, Serialize};

/// The absolute URL under which the application's public directory is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Constructor.
    pub fn new<S: AsRef<str>>(base: S) -> Self {
        Self(base.as_ref().to_string())
    }

    /// Builds an absolute URL for the given path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.0.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Like [`BaseUrl::url`], but guarantees that the resulting URL ends in a
    /// slash so that file names can be appended directly.
    pub fn dir(&self, path: &str) -> String {
        let url = self.url(path);
        if url.ends_with('/') {
            url
        } else {
            format!("{}/", url)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::new("http://localhost/")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn joins_with_a_single_slash() {
        let base = BaseUrl::new("https://example.com/");
        assert_eq!(base.url("themes/default"), "https://example.com/themes/default");
        assert_eq!(base.url("/themes/default"), "https://example.com/themes/default");
        assert_eq!(BaseUrl::new("https://example.com").url("a.css"), "https://example.com/a.css");
        assert_eq!(base.url(""), "https://example.com/");
    }

    #[test]
    fn directory_urls_end_in_slash() {
        let base = BaseUrl::new("https://example.com/app");
        assert_eq!(base.dir("themes/default"), "https://example.com/app/themes/default/");
        assert_eq!(base.dir("themes/default/"), "https://example.com/app/themes/default/");
    }
}
