//! Content hashing for sync operations.
//!
//! SHA256 fingerprints of serialized values. The reconciler itself compares
//! positionally; hashes are only recorded in audit events and shown in
//! status output, where a compact fingerprint beats the full list.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute a SHA256 hash of a serializable value.
///
/// The value is first serialized to JSON, then hashed.
///
/// # Panics
///
/// Panics if the value cannot be serialized to JSON. This should never happen
/// for our data types which are all serializable.
#[must_use]
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Order-sensitive fingerprint of a list of item contents.
#[must_use]
pub fn items_hash(items: &[String]) -> String {
    content_hash(&items)
}

/// First 12 hex characters of a hash, for display.
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
