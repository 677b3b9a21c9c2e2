//! Namespace path utilities.
//!
//! Grid paths are absolute, `/`-separated strings rooted at a zone, for
//! example `/tempZone/home/alice/report.csv`. These helpers never touch the
//! grid itself; they only reason about the text of a path.

use crate::error::{GridError, Result};

/// Separator between namespace path segments.
pub const SEPARATOR: char = '/';

/// Name of the collection holding user home directories inside a zone.
pub const HOME_COLLECTION: &str = "home";

/// Name of the shared home directory readable by everyone in a zone.
pub const PUBLIC_USER: &str = "public";

/// An absolute path split into its parent collection and last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionAndPath {
    /// Parent collection, `/` for top-level entries.
    pub collection_parent: String,
    /// Last path segment, empty for the root.
    pub child_name: String,
}

/// Returns true if the path starts at the namespace root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Strip trailing separators, keeping a lone `/` intact.
fn trim_trailing(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && is_absolute(path) {
        "/"
    } else {
        trimmed
    }
}

/// Break a path into its non-empty segments.
///
/// `/zone/home/alice` yields `["zone", "home", "alice"]`.
pub fn components(path: &str) -> Vec<String> {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a path at its last separator.
pub fn separate(path: &str) -> CollectionAndPath {
    let trimmed = trim_trailing(path);
    if trimmed == "/" {
        return CollectionAndPath {
            collection_parent: "/".to_string(),
            child_name: String::new(),
        };
    }

    match trimmed.rfind(SEPARATOR) {
        Some(0) => CollectionAndPath {
            collection_parent: "/".to_string(),
            child_name: trimmed[1..].to_string(),
        },
        Some(idx) => CollectionAndPath {
            collection_parent: trimmed[..idx].to_string(),
            child_name: trimmed[idx + 1..].to_string(),
        },
        None => CollectionAndPath {
            collection_parent: String::new(),
            child_name: trimmed.to_string(),
        },
    }
}

/// Parent collection of a path. The parent of `/` is `/`.
pub fn collection_parent(path: &str) -> String {
    separate(path).collection_parent
}

/// Last segment of a path.
pub fn child_name(path: &str) -> String {
    separate(path).child_name
}

/// Join a child segment onto a collection path.
pub fn join(parent: &str, child: &str) -> String {
    let child = child.trim_start_matches(SEPARATOR);
    if parent.ends_with(SEPARATOR) {
        format!("{}{}", parent, child)
    } else {
        format!("{}{}{}", parent, SEPARATOR, child)
    }
}

/// Check that a path is absolute and free of `.`/`..` segments.
pub fn validate(path: &str) -> Result<&str> {
    if !is_absolute(path) {
        return Err(GridError::InvalidPath(path.to_string()));
    }
    if path.split(SEPARATOR).any(|s| s == "." || s == "..") {
        return Err(GridError::InvalidPath(path.to_string()));
    }
    if path.contains('\0') {
        return Err(GridError::InvalidPath(path.to_string()));
    }
    Ok(path)
}

/// Home directory of a user: `/<zone>/home/<user>`.
pub fn home_directory(zone: &str, username: &str) -> String {
    format!("/{}/{}/{}", zone, HOME_COLLECTION, username)
}

/// Shared public directory of a zone: `/<zone>/home/public`.
pub fn public_directory(zone: &str) -> String {
    home_directory(zone, PUBLIC_USER)
}

/// URL-encode a path so it can travel as a single query parameter value.
///
/// Separators are encoded too: `/a/b` becomes `%2Fa%2Fb`.
pub fn encode_component(path: &str) -> String {
    urlencoding::encode(path).into_owned()
}

/// Decode a form URL-encoded value. `+` decodes to a space.
///
/// Truncated or non-hex escapes and escapes that do not form valid UTF-8
/// are rejected.
pub fn decode_component(value: &str) -> Result<String> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(GridError::InvalidPath(format!(
                    "malformed escape at byte {} in {}",
                    i, value
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| GridError::InvalidPath(format!("{}: {}", value, e)))
}
