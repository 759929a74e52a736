//! Object merging with configurable conflict resolution.
//!
//! Element inheritance produces two JSON objects for the same element: the
//! inherited base and the element itself. [`merge_objects`] combines them
//! using a [`MergeStrategy`] to resolve conflicting members.
//!
//! # Example
//!
//! ```
//! use dyncli_core::{MergeStrategy, merge_objects};
//! use serde_json::json;
//!
//! let base = json!({"type": "string", "describe": "base"});
//! let overlay = json!({"describe": "derived", "alias": "d"});
//!
//! let merged = merge_objects(
//!     base.as_object().unwrap(),
//!     overlay.as_object().unwrap(),
//!     MergeStrategy::Union,
//! );
//! assert_eq!(merged["describe"], "derived");
//! assert_eq!(merged["type"], "string");
//! assert_eq!(merged.len(), 3);
//! ```

use serde_json::{Map, Value};

/// Object merge behavior.
///
/// # Examples
///
/// ```
/// use dyncli_core::{MergeStrategy, merge_objects};
/// use serde_json::json;
///
/// let base = json!({"describe": "base"});
/// let overlay = json!({"describe": "overlay"});
/// let (b, o) = (base.as_object().unwrap(), overlay.as_object().unwrap());
///
/// assert_eq!(merge_objects(b, o, MergeStrategy::PreferBase)["describe"], "base");
/// assert_eq!(merge_objects(b, o, MergeStrategy::PreferOverlay)["describe"], "overlay");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Keep base members when both sides define them.
    PreferBase,
    /// Keep overlay members when both sides define them.
    PreferOverlay,
    /// Concatenate arrays and merge nested objects recursively; overlay wins
    /// for scalars.
    Union,
}

/// Merges two JSON objects into a new object.
///
/// Members present on only one side are always kept. Base members come
/// first in the result so inherited entries precede the element's own.
pub fn merge_objects(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
    strategy: MergeStrategy,
) -> Map<String, Value> {
    let mut merged = base.clone();

    for (key, value) in overlay {
        match merged.get_mut(key) {
            Some(existing) => merge_member(existing, value, strategy),
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

fn merge_member(existing: &mut Value, overlay: &Value, strategy: MergeStrategy) {
    match strategy {
        MergeStrategy::PreferBase => {}
        MergeStrategy::PreferOverlay => *existing = overlay.clone(),
        MergeStrategy::Union => match (existing, overlay) {
            (Value::Array(items), Value::Array(more)) => items.extend(more.iter().cloned()),
            (Value::Object(base), Value::Object(more)) => {
                *base = merge_objects(base, more, strategy);
            }
            (slot, value) => *slot = value.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_union_concatenates_arrays() {
        let base = obj(json!({"_children": [{"_": "A"}]}));
        let overlay = obj(json!({"_children": [{"_": "B"}]}));

        let merged = merge_objects(&base, &overlay, MergeStrategy::Union);
        assert_eq!(merged["_children"], json!([{"_": "A"}, {"_": "B"}]));
    }

    #[test]
    fn test_union_merges_nested_objects() {
        let base = obj(json!({"_children": {"a": 1, "b": 2}}));
        let overlay = obj(json!({"_children": {"b": 3, "c": 4}}));

        let merged = merge_objects(&base, &overlay, MergeStrategy::Union);
        assert_eq!(merged["_children"], json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_union_scalar_conflict_prefers_overlay() {
        let base = obj(json!({"type": "string"}));
        let overlay = obj(json!({"type": "number"}));

        let merged = merge_objects(&base, &overlay, MergeStrategy::Union);
        assert_eq!(merged["type"], "number");
    }

    #[test]
    fn test_prefer_base_keeps_base_arrays() {
        let base = obj(json!({"items": [1]}));
        let overlay = obj(json!({"items": [2], "extra": true}));

        let merged = merge_objects(&base, &overlay, MergeStrategy::PreferBase);
        assert_eq!(merged["items"], json!([1]));
        assert_eq!(merged["extra"], true);
    }
}
