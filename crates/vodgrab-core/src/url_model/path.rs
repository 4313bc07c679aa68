//! File name hints from URL paths.

use url::Url;

/// Last non-empty path segment of `url`, if any.
pub fn filename_from_url_path(url: &Url) -> Option<&str> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Extension of the last path segment (`"ts"` for `/a/0.ts?x=1`).
pub fn extension_from_url_path(url: &Url) -> Option<&str> {
    let name = filename_from_url_path(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
