//! File system-related utilities.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use eyre::Result;

use crate::Error;

/// Canonicalize the given path if it exists. If it does not exist, returns
/// `Ok(None)`.
pub fn maybe_canonicalize<P>(path: P) -> Result<Option<PathBuf>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        Ok(Some(path.canonicalize()?))
    } else {
        Ok(None)
    }
}

/// Last modification time of the given file, in whole seconds since the Unix
/// epoch.
///
/// Timestamps that predate the epoch are reported as `0`.
pub fn modified_secs<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| Error::Io(format!("while reading metadata of {}", path.display()), e))?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/// Appends `ext` to `name` unless `name` already ends with it.
pub fn with_default_ext(name: &str, ext: &str) -> String {
    if ext.is_empty() || name.ends_with(ext) {
        name.to_string()
    } else {
        format!("{}{}", name, ext)
    }
}

/// File name of a view or template: `view` itself if it has an extension,
/// otherwise `view` with `ext` appended.
pub fn view_file_name(view: &str, ext: &str) -> String {
    match Path::new(view).extension() {
        Some(_) => view.to_string(),
        None => with_default_ext(view, ext),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_extension_is_appended_once() {
        assert_eq!(with_default_ext("style", ".css"), "style.css");
        assert_eq!(with_default_ext("style.css", ".css"), "style.css");
        assert_eq!(with_default_ext("vendor/app.min", ".js"), "vendor/app.min.js");
        assert_eq!(with_default_ext("index", ""), "index");
    }

    #[test]
    fn view_names_keep_their_extension() {
        assert_eq!(view_file_name("index", ".html"), "index.html");
        assert_eq!(view_file_name("index.php", ".html"), "index.php");
        assert_eq!(view_file_name("blog/post.md", ".html"), "blog/post.md");
    }

    #[test]
    fn missing_files_are_not_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(maybe_canonicalize(dir.path().join("nope")).unwrap().is_none());
        assert!(maybe_canonicalize(dir.path()).unwrap().is_some());
    }

    #[test]
    fn modification_time_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = modified_secs(dir.path().join("missing.css")).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Io(_, _))));
    }
}
