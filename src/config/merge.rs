//! Deep merge of configuration tiers.
//!
//! Higher tier values override lower tier values field by field. Arrays are
//! replaced entirely, not concatenated.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use ci_effective_env::config::deep_merge;
///
/// let base = json!({ "output": { "format": "json", "pretty": true } });
/// let overlay = json!({ "output": { "format": "markdown" } });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({ "output": { "format": "markdown", "pretty": true } }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
