//! Variables passed into theme templates and views.

use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Body content of the page.
pub const CONTENT: &str = "content";
/// Title of the page, typically used inside `<title>` tags.
pub const PAGE_TITLE: &str = "page_title";
/// Base URL of the active theme.
pub const THEME_URL: &str = "theme_url";
/// Base URL of the active theme's images.
pub const IMAGE_URL: &str = "image_url";
/// Base URL of the active theme's plugins.
pub const PLUGIN_URL: &str = "plugin_url";
/// Stylesheet tags for the current render cycle (see the `render_css` helper).
pub const CSS_TAGS: &str = "css_tags";
/// Script tags for the current render cycle (see the `render_js` helper).
pub const JS_TAGS: &str = "js_tags";

/// An open mapping of variable names to values.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct TemplateVars(Map<String, Value>);

impl TemplateVars {
    /// Convenience method for constructing a set of variables.
    pub fn with<K, V>(mut self, key: K, value: V) -> Result<Self>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        let _ = self.set(key, value)?;
        Ok(self)
    }

    /// Returns whether or not a value is associated with the given key.
    pub fn contains_key<K: AsRef<str>>(&self, key: K) -> bool {
        self.0.contains_key(key.as_ref())
    }

    /// Set the value associated with the given key, returning the previous
    /// value if there was one.
    pub fn set<K, V>(&mut self, key: K, value: V) -> Result<Option<Value>>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        let value = serde_json::to_value(value).map_err(Error::from)?;
        Ok(self.insert(key, value))
    }

    /// Insert an already converted value under the given key, returning the
    /// previous value if there was one.
    pub fn insert<K: AsRef<str>>(&mut self, key: K, value: Value) -> Option<Value> {
        self.0.insert(key.as_ref().to_string(), value)
    }

    /// Get a reference to the value associated with the given key.
    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&Value> {
        self.0.get(key.as_ref())
    }

    /// Get the value associated with the given key if it is a string.
    pub fn get_str<K: AsRef<str>>(&self, key: K) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Remove the value associated with the given key, if it exists.
    pub fn remove<K: AsRef<str>>(&mut self, key: K) -> Option<Value> {
        self.0.remove(key.as_ref())
    }

    /// Copies all of the given variables into this set, overwriting existing
    /// values with the same keys.
    pub fn extend(&mut self, other: TemplateVars) {
        self.0.extend(other.0);
    }

    /// An iterator visiting all key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl From<TemplateVars> for Value {
    fn from(vars: TemplateVars) -> Self {
        Value::Object(vars.0)
    }
}

impl From<Map<String, Value>> for TemplateVars {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for TemplateVars {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(Error::TemplateDataMustBeObject),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_and_accessors() {
        let vars = TemplateVars::default()
            .with("title", "Home")
            .unwrap()
            .with("count", 3)
            .unwrap();
        assert_eq!(vars.get_str("title"), Some("Home"));
        assert_eq!(vars.get("count"), Some(&json!(3)));
        assert_eq!(vars.get_str("count"), None);
        assert!(!vars.contains_key(CONTENT));
    }

    #[test]
    fn extend_overwrites() {
        let mut vars = TemplateVars::default().with("a", 1).unwrap();
        vars.extend(TemplateVars::default().with("a", 2).unwrap().with("b", 3).unwrap());
        assert_eq!(Value::from(vars), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn only_objects_convert() {
        let vars = TemplateVars::try_from(json!({"title": "Home"})).unwrap();
        assert_eq!(vars.len(), 1);
        assert!(TemplateVars::try_from(Value::Null).unwrap().is_empty());
        assert!(matches!(
            TemplateVars::try_from(json!([1, 2])),
            Err(Error::TemplateDataMustBeObject)
        ));
    }
}
