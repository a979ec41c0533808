//! Canonical SHA-256 digests
//!
//! Used for config hashes, roster fingerprints and state digests. Values are
//! serialized to JSON with object keys sorted recursively, so the digest does
//! not depend on field order or map implementation.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hex-encoded SHA-256 of the canonical JSON form of `value`
///
/// # Example
/// ```rust
/// use triage_simulator_core_rs::core::digest::canonical_digest;
/// use std::collections::HashMap;
///
/// let a = HashMap::from([("beds", 30), ("surgeons", 4)]);
/// let b = HashMap::from([("surgeons", 4), ("beds", 30)]);
/// assert_eq!(canonical_digest(&a).unwrap(), canonical_digest(&b).unwrap());
/// ```
pub fn canonical_digest<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
