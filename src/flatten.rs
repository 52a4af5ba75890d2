//! Flattening of nested configuration objects into the flat key namespace.

use crate::key::{compose_key, to_flat_segment};
use serde_json::{Map, Value as Json};

/// Flatten a nested object into a single-level map of flat keys.
///
/// Each key path through nested objects becomes one uppercase,
/// underscore-delimited key. Leaf values (scalars, arrays, null) are kept
/// verbatim; coercion happens later, when a value is written to or read
/// from the store.
///
/// ```
/// use serde_json::json;
/// use envscope::flatten;
///
/// let obj = json!({"a": {"b": {"c": "sup"}, "b2": "hi"}, "a2": "yah"});
/// let flat = flatten(obj.as_object().unwrap(), None);
/// assert_eq!(flat["A_B_C"], json!("sup"));
/// assert_eq!(flat["A_B2"], json!("hi"));
/// assert_eq!(flat["A2"], json!("yah"));
/// ```
pub fn flatten(obj: &Map<String, Json>, prefix: Option<&str>) -> Map<String, Json> {
    let mut out = Map::new();
    flatten_into(obj, prefix, &mut out);
    out
}

fn flatten_into(obj: &Map<String, Json>, prefix: Option<&str>, out: &mut Map<String, Json>) {
    for (key, value) in obj {
        let new_key = to_flat_segment(&compose_key(prefix, key));
        match value {
            Json::Object(nested) => flatten_into(nested, Some(&new_key), out),
            leaf => {
                // Accidental collisions are undefined behavior; right-most wins.
                out.insert(new_key, leaf.clone());
            }
        }
    }
}
