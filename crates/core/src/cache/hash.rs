//! Request-derived cache key generation.

use sha2::{Digest, Sha256};

/// Compute a cache key for an API request.
///
/// The key covers the HTTP method, the full request URL, and the
/// serialized body, so any change to the request produces a new entry.
pub fn request_cache_key(method: &str, url: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
