//! Entity tags for static assets.
//!
//! Tags are derived from file content, so an unchanged file keeps its tag
//! across restarts of the same build.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use hyper::header::{HeaderMap, IF_NONE_MATCH};

/// Strong tag for `content`, quoted, e.g. `"1f-9a3c..."`
pub fn etag_for(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Whether the request's `If-None-Match` already names `etag`.
///
/// Comparison is weak, as RFC 9110 requires for this header: a `W/` prefix
/// on the client's tag is ignored.
pub fn is_fresh(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}
