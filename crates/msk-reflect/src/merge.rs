//! Deep merge for JSON objects.
//!
//! Objects merge key by key with the overlay winning on conflicts; arrays
//! and scalars are replaced wholesale. Replacing arrays (instead of
//! index-merging them) keeps `required` lists and enum-like arrays
//! predictable under override.

use serde_json::{Map, Value};

/// Merge `overlay` into `base`, mutating `base`. The overlay wins on every
/// conflicting scalar or array; nested objects merge recursively.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge two JSON values. Non-object operands follow the overlay.
pub fn deep_merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(existing), Value::Object(incoming)) => deep_merge(existing, incoming),
        (base, overlay) => *base = overlay.clone(),
    }
}
