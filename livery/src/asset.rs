//! Registry of the CSS/JS assets accumulated during a render cycle.

use std::collections::{BTreeMap, HashSet};

use crate::hash::sha256;

/// Conversion into a list of raw asset references.
///
/// A single string is treated as a comma-separated list of references, while
/// each element of a slice, array or vector is taken as one reference.
pub trait AssetRefs {
    fn into_refs(self) -> Vec<String>;
}

impl AssetRefs for &str {
    fn into_refs(self) -> Vec<String> {
        self.split(',').map(str::to_string).collect()
    }
}

impl AssetRefs for String {
    fn into_refs(self) -> Vec<String> {
        self.as_str().into_refs()
    }
}

impl AssetRefs for &String {
    fn into_refs(self) -> Vec<String> {
        self.as_str().into_refs()
    }
}

impl<S: AsRef<str>> AssetRefs for &[S] {
    fn into_refs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> AssetRefs for [S; N] {
    fn into_refs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> AssetRefs for Vec<S> {
    fn into_refs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

/// An insertion-ordered list of asset references in which every trimmed
/// reference appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetList {
    // Content hashes of the references in `entries`.
    hashes: HashSet<String>,
    entries: Vec<String>,
}

impl AssetList {
    /// Trims and adds the given reference. Returns `false` if the reference is
    /// empty or already present.
    pub fn insert(&mut self, reference: &str) -> bool {
        let reference = reference.trim();
        if reference.is_empty() || !self.hashes.insert(sha256(reference)) {
            return false;
        }
        self.entries.push(reference.to_string());
        true
    }

    /// Adds every one of the given references.
    pub fn extend<R: AssetRefs>(&mut self, refs: R) {
        for reference in refs.into_refs() {
            self.insert(&reference);
        }
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.hashes.contains(&sha256(reference.trim()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
        self.entries.clear();
    }
}

/// All of the assets registered during a single render cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    /// Stylesheets relative to the theme's CSS directory.
    pub css: AssetList,
    /// Scripts relative to the theme's JS directory.
    pub js: AssetList,
    /// Fully qualified stylesheet URLs.
    pub external_css: AssetList,
    /// Fully qualified script URLs.
    pub external_js: AssetList,
    /// Inline script bodies.
    pub inline_js: AssetList,
    /// URLs of loaded plugin files, by asset type. Order is significant and
    /// duplicates are kept.
    pub plugins: BTreeMap<String, Vec<String>>,
}

impl AssetSet {
    /// URLs of loaded plugin files of the given asset type.
    pub fn plugin_assets(&self, asset_type: &str) -> &[String] {
        self.plugins
            .get(asset_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.css.clear();
        self.js.clear();
        self.external_css.clear();
        self.external_js.clear();
        self.inline_js.clear();
        self.plugins.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicates_are_ignored_after_trimming() {
        let mut list = AssetList::default();
        assert!(list.insert("style.css"));
        assert!(!list.insert("  style.css\n"));
        assert!(!list.insert("   "));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["style.css"]);
        assert!(list.contains(" style.css "));
    }

    #[test]
    fn comma_separated_and_list_inputs_are_equivalent() {
        let mut from_str = AssetList::default();
        from_str.extend("a.css, b.css,,");
        let mut from_vec = AssetList::default();
        from_vec.extend(vec!["a.css", "b.css"]);
        let mut from_array = AssetList::default();
        from_array.extend(["a.css", " b.css "]);
        assert_eq!(from_str, from_vec);
        assert_eq!(from_str, from_array);
    }

    #[test]
    fn list_elements_are_not_split() {
        let refs = vec!["https://cdn.example.com/a.css?family=x,y"].into_refs();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut list = AssetList::default();
        list.extend("z.js, a.js, m.js, a.js");
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["z.js", "a.js", "m.js"]);
    }

    #[test]
    fn clearing_resets_everything() {
        let mut assets = AssetSet::default();
        assets.css.insert("a.css");
        assets.inline_js.insert("console.log(1);");
        assets
            .plugins
            .entry("js".to_string())
            .or_default()
            .push("http://localhost/p.js".to_string());
        assets.clear();
        assert_eq!(assets, AssetSet::default());
        assert!(assets.plugin_assets("js").is_empty());
    }
}
