//! Last-component helpers for URLs and filesystem paths.

use std::path::Path;

use url::Url;

/// Percent-decoded last path segment of a URL.
///
/// Returns an empty string when the URL has no path segments or ends with a
/// slash.
pub fn url_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    urlencoding::decode(segment)
        .map_or_else(|_| segment.to_string(), |decoded| decoded.into_owned())
}

/// Final component of a path, lossily converted to UTF-8.
pub fn path_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
