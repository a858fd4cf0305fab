//! Layer merging for config files (RFC 7396 JSON Merge Patch).
//!
//! A later layer patches an earlier one: objects merge key by key, `null`
//! removes a key, anything else replaces.

use serde_json::Value;

/// Apply `patch` on top of `target`.
///
/// ```
/// use serde_json::json;
/// use oja_config::merge::merge_patch;
///
/// let global = json!({"ojs": {"base_url": "https://a", "username": "ed"}});
/// let local = json!({"ojs": {"base_url": "https://b"}});
/// assert_eq!(
///     merge_patch(global, local),
///     json!({"ojs": {"base_url": "https://b", "username": "ed"}})
/// );
/// ```
pub fn merge_patch(target: Value, patch: Value) -> Value {
    let Value::Object(patch_map) = patch else {
        return patch;
    };
    let mut target_map = match target {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    for (key, value) in patch_map {
        if value.is_null() {
            target_map.remove(&key);
        } else {
            let existing = target_map.remove(&key).unwrap_or(Value::Null);
            target_map.insert(key, merge_patch(existing, value));
        }
    }
    Value::Object(target_map)
}

/// Merge several layers in order, lowest precedence first.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Object(serde_json::Map::new()), merge_patch)
}
