//! Canonical hashing for provenance
//!
//! Inputs and outputs are fingerprinted as SHA-256 over a canonical JSON form:
//! object keys sorted at every depth, arrays kept in order, compact separators.
//! Two maps with the same content hash identically regardless of insertion order.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::assumptions::ScenarioAssumptions;
use crate::deal::DealTerms;
use crate::error::{ValuationError, ValuationResult};

/// Recursively sort object keys; arrays keep their element order
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::new();
            for (key, val) in entries {
                sorted.insert(key.clone(), canonicalize(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact canonical serialization of a map
pub fn canonical_string(map: &Map<String, Value>) -> String {
    let canonical = canonicalize(&Value::Object(map.clone()));
    // Display on Value is compact JSON and cannot fail
    canonical.to_string()
}

/// SHA-256 of the canonical form, as 64 lowercase hex characters
pub fn deterministic_hash(map: &Map<String, Value>) -> String {
    let digest = Sha256::digest(canonical_string(map).as_bytes());
    hex::encode(digest)
}

/// Hash any record that serializes to a JSON object
pub fn hash_serializable<T: Serialize>(value: &T) -> ValuationResult<String> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(deterministic_hash(&map)),
        other => Err(ValuationError::NotAnObject(json_kind(&other))),
    }
}

/// Cache and provenance key for the valuation of `terms` under `assumptions`
pub fn valuation_key(terms: &DealTerms, assumptions: &ScenarioAssumptions) -> ValuationResult<String> {
    let mut map = Map::new();
    map.insert("terms".to_string(), serde_json::to_value(terms)?);
    map.insert("assumptions".to_string(), serde_json::to_value(assumptions)?);
    Ok(deterministic_hash(&map))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
