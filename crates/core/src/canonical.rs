//! Canonical JSON serialization for architectures.
//!
//! Metadata maps preserve the diagram's insertion order, which is stable for
//! one document but not a good equality witness across serializations. The
//! canonical form sorts every object key recursively, so two architectures
//! are behaviorally equal exactly when their canonical strings are
//! byte-equal.

use serde_json::{Map, Value};

use crate::architecture::Architecture;

/// Serialize an architecture with every object key sorted.
///
/// # Errors
///
/// Returns the underlying serialization error; the architecture's types are
/// all serializable, so this only fails on pathological float metadata.
pub fn canonical_json(architecture: &Architecture) -> serde_json::Result<String> {
    let value = serde_json::to_value(architecture)?;
    serde_json::to_string(&sort_keys(value))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(key, value)| (key, sort_keys(value)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
