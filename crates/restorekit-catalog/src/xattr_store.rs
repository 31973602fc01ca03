//! Extended-attribute backed [`FileMetadataStore`].
//!
//! On Linux unprivileged attributes must live in the `user.` namespace, so
//! keys are prefixed there. Download provenance comes from the attribute the
//! platform's browsers write: `kMDItemWhereFroms` on macOS, the freedesktop
//! `user.xdg.origin.url` elsewhere.

use std::borrow::Cow;
use std::io;
use std::path::Path;

use tracing::debug;
use url::Url;

use restorekit_core::{FileMetadataStore, MetadataError};

/// Spotlight attribute listing the URLs a file was downloaded from.
pub const WHERE_FROMS_ATTRIBUTE: &str = "com.apple.metadata:kMDItemWhereFroms";

/// Freedesktop attribute holding the URL a file was downloaded from.
pub const XDG_ORIGIN_URL_ATTRIBUTE: &str = "user.xdg.origin.url";

#[cfg(any(target_os = "linux", target_os = "android"))]
const MISSING_ATTRIBUTE: i32 = libc::ENODATA;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const MISSING_ATTRIBUTE: i32 = libc::ENOATTR;

/// Metadata store using the file's extended attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrMetadataStore;

impl XattrMetadataStore {
    pub const fn new() -> Self {
        Self
    }

    /// Whether the platform supports extended attributes at all.
    pub const fn is_supported() -> bool {
        xattr::SUPPORTED_PLATFORM
    }

    fn read_raw(path: &Path, name: &str) -> Option<Vec<u8>> {
        match xattr::get(path, name) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %path.display(), name, error = %e, "Failed to read attribute");
                None
            }
        }
    }
}

/// Platform attribute name for `key`.
fn attribute_name(key: &str) -> Cow<'_, str> {
    if cfg!(any(target_os = "linux", target_os = "android")) && !key.starts_with("user.") {
        Cow::Owned(format!("user.{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

fn is_missing_attribute(err: &io::Error) -> bool {
    err.raw_os_error() == Some(MISSING_ATTRIBUTE)
}

/// Decode a `kMDItemWhereFroms` value: a property list array of strings.
pub fn decode_where_froms(data: &[u8]) -> Vec<Url> {
    let value = match plist::Value::from_reader(io::Cursor::new(data)) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable where-froms");
            return Vec::new();
        }
    };

    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(plist::Value::as_string)
                .filter_map(|s| Url::parse(s).ok())
                .collect()
        })
        .unwrap_or_default()
}

impl FileMetadataStore for XattrMetadataStore {
    fn read_attribute(&self, path: &Path, key: &str) -> Option<Vec<u8>> {
        Self::read_raw(path, &attribute_name(key))
    }

    fn write_attribute(&self, path: &Path, key: &str, value: &[u8]) -> Result<(), MetadataError> {
        xattr::set(path, &*attribute_name(key), value)
            .map_err(|e| MetadataError::io(path, key, &e))
    }

    fn remove_attribute(&self, path: &Path, key: &str) -> Result<(), MetadataError> {
        match xattr::remove(path, &*attribute_name(key)) {
            Ok(()) => Ok(()),
            Err(e) if is_missing_attribute(&e) => Ok(()),
            Err(e) => Err(MetadataError::io(path, key, &e)),
        }
    }

    fn origin_urls(&self, path: &Path) -> Vec<Url> {
        if cfg!(target_os = "macos") {
            return Self::read_raw(path, WHERE_FROMS_ATTRIBUTE)
                .map(|data| decode_where_froms(&data))
                .unwrap_or_default();
        }

        Self::read_raw(path, XDG_ORIGIN_URL_ATTRIBUTE)
            .and_then(|data| String::from_utf8(data).ok())
            .and_then(|s| Url::parse(s.trim()).ok())
            .into_iter()
            .collect()
    }
}
