//! Utility functions and helpers.

pub mod http;

use std::path::PathBuf;

use url::Url;

/// Whether a source location names a network resource.
///
/// Anything with a `scheme://` prefix other than `file://` counts, parseable
/// or not, so malformed URLs are never mistaken for file paths.
pub fn is_remote(location: &str) -> bool {
    match location.trim().split_once("://") {
        Some((scheme, _)) => !scheme.eq_ignore_ascii_case("file"),
        None => false,
    }
}

/// Filesystem path for a local source location.
///
/// Accepts plain paths and `file://` URLs; returns `None` for remote locations.
pub fn local_path(location: &str) -> Option<PathBuf> {
    if is_remote(location) {
        return None;
    }
    match Url::parse(location) {
        Ok(u) if u.scheme() == "file" => u.to_file_path().ok(),
        _ => Some(PathBuf::from(location)),
    }
}

/// Today's date in UTC.
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
