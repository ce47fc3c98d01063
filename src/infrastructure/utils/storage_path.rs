use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static OBJECT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+(\.[A-Za-z0-9]+)?)+$")
        .expect("object path pattern is valid")
});

/// Builds `{prefix}/{millis}_{slugified-stem}.{ext}` for an uploaded file.
pub fn object_path(prefix: &str, file_name: &str, millis: i64) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slug::slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{prefix}/{millis}_{stem}.{ext}"),
        None => format!("{prefix}/{millis}_{stem}"),
    }
}

/// True for relative object paths without traversal segments.
pub fn is_valid_object_path(path: &str) -> bool {
    OBJECT_PATH.is_match(path)
}

/// Strips the public base URL from a stored reference, yielding the object path.
pub fn path_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    let base = base_url.trim_end_matches('/');
    url.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|path| is_valid_object_path(path))
}
