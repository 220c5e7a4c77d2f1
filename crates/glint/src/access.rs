//! Path-based read and write access over JSON values.
//!
//! These are the pure functions behind deep member access: strict walks that
//! report missing intermediates, plus a lenient `get_at` for callers that
//! treat absence as `Null`.
//!
//! An intermediate segment that is missing, or that resolves to something
//! other than an object or array, is an error. A missing **final** segment is
//! not: reads report `None` and writes create the slot.

use crate::error::{GlintError, GlintResult};
use crate::path::{Path, Seg};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Read the value at `path`, strictly.
///
/// Returns `Ok(None)` when only the final segment is absent from its
/// container. Missing or non-container intermediates are `PathNotFound`,
/// reported with the prefix that failed to resolve.
///
/// # Examples
///
/// ```
/// use glint::{path, read};
/// use serde_json::json;
///
/// let doc = json!({"user": {"name": "ada"}});
/// assert_eq!(read(&doc, &path!("user", "name")).unwrap(), Some(&json!("ada")));
/// assert_eq!(read(&doc, &path!("user", "age")).unwrap(), None);
/// assert!(read(&doc, &path!("missing", "name")).is_err());
/// ```
pub fn read<'a>(root: &'a Value, path: &Path) -> GlintResult<Option<&'a Value>> {
    let segs = path.segments();
    let mut current = root;
    for (pos, seg) in segs.iter().enumerate() {
        match descend(current, seg) {
            Some(next) => current = next,
            None => {
                if pos + 1 == segs.len() && is_container(current) {
                    return Ok(None);
                }
                return Err(GlintError::path_not_found(prefix(segs, pos)));
            }
        }
    }
    Ok(Some(current))
}

/// Write `value` at `path`, strictly.
///
/// Intermediates follow the same rule as [`read`]. The final segment is
/// assigned: object keys are created as needed, and an array index equal to
/// the current length appends one element. Larger indexes are
/// `IndexOutOfBounds`.
pub fn write(root: &mut Value, path: &Path, value: Value) -> GlintResult<()> {
    if path.is_empty() {
        *root = value;
        return Ok(());
    }

    let segs = path.segments();
    let last_pos = segs.len() - 1;
    let mut current = root;
    for (pos, seg) in segs[..last_pos].iter().enumerate() {
        current = descend_mut(current, seg)
            .ok_or_else(|| GlintError::path_not_found(prefix(segs, pos)))?;
    }
    assign(current, &segs[last_pos], value, path)
}

/// Build a minimal partial structure carrying one deep replacement.
///
/// The result maps the top-level key of `path` to a copy of that subtree with
/// only the addressed leaf replaced. Siblings inside the subtree are
/// preserved; every other top-level key is absent. Missing intermediates
/// error like [`read`].
///
/// # Examples
///
/// ```
/// use glint::{build_patch, path};
/// use serde_json::json;
///
/// let doc = json!({"profile": {"name": "ada", "age": 36}, "count": 1});
/// let patch = build_patch(&doc, &path!("profile", "age"), json!(37)).unwrap();
/// assert_eq!(patch, json!({"profile": {"name": "ada", "age": 37}}));
/// ```
pub fn build_patch(root: &Value, path: &Path, value: Value) -> GlintResult<Value> {
    let Some(first) = path.first() else {
        return Ok(value);
    };

    let top_key = match first {
        Seg::Key(k) => k.clone(),
        Seg::Index(i) => i.to_string(),
    };
    let subtree = get_at(root, &Path::from_segments(vec![first.clone()]))
        .cloned()
        .unwrap_or(Value::Null);

    let mut patch = Value::Object(Map::new());
    if let Value::Object(map) = &mut patch {
        map.insert(top_key, subtree);
    }
    write(&mut patch, path, value)?;
    Ok(patch)
}

/// Lenient read: walk `path` and return the value, or `None` on any miss.
pub fn get_at<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = root;
    for seg in path.segments() {
        current = descend(current, seg)?;
    }
    Some(current)
}

/// Lenient mutable walk, used for in-place container edits.
pub(crate) fn get_at_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut current = root;
    for seg in path.segments() {
        current = descend_mut(current, seg)?;
    }
    Some(current)
}

/// Returns true for the two container kinds.
#[inline]
pub(crate) fn is_container(v: &Value) -> bool {
    v.is_object() || v.is_array()
}

fn prefix(segs: &[Seg], pos: usize) -> Path {
    Path::from_segments(segs[..=pos].to_vec())
}

/// Resolve one segment against a container.
///
/// Indexes fall back to string keys on objects, and all-digit keys index into
/// arrays, so a path parsed from dotted text works against either container.
fn descend<'a>(current: &'a Value, seg: &Seg) -> Option<&'a Value> {
    match (current, seg) {
        (Value::Object(map), Seg::Key(k)) => map.get(k),
        (Value::Object(map), Seg::Index(i)) => map.get(i.to_string().as_str()),
        (Value::Array(arr), Seg::Index(i)) => arr.get(*i),
        (Value::Array(arr), Seg::Key(k)) => {
            let i = k.parse::<usize>().ok()?;
            arr.get(i)
        }
        _ => None,
    }
}

fn descend_mut<'a>(current: &'a mut Value, seg: &Seg) -> Option<&'a mut Value> {
    match (current, seg) {
        (Value::Object(map), Seg::Key(k)) => map.get_mut(k),
        (Value::Object(map), Seg::Index(i)) => map.get_mut(i.to_string().as_str()),
        (Value::Array(arr), Seg::Index(i)) => arr.get_mut(*i),
        (Value::Array(arr), Seg::Key(k)) => {
            let i = k.parse::<usize>().ok()?;
            arr.get_mut(i)
        }
        _ => None,
    }
}

fn assign(parent: &mut Value, seg: &Seg, value: Value, full_path: &Path) -> GlintResult<()> {
    match (parent, seg) {
        (Value::Object(map), Seg::Key(k)) => {
            map.insert(k.clone(), value);
            Ok(())
        }
        (Value::Object(map), Seg::Index(i)) => {
            map.insert(i.to_string(), value);
            Ok(())
        }
        (Value::Array(arr), Seg::Index(i)) => set_array_slot(arr, *i, value, full_path),
        (Value::Array(arr), Seg::Key(k)) => match k.parse::<usize>() {
            Ok(i) => set_array_slot(arr, i, value, full_path),
            Err(_) => Err(GlintError::type_mismatch(full_path.clone(), "object", "array")),
        },
        _ => Err(GlintError::path_not_found(
            full_path.parent().unwrap_or_default(),
        )),
    }
}

fn set_array_slot(
    arr: &mut Vec<Value>,
    index: usize,
    value: Value,
    full_path: &Path,
) -> GlintResult<()> {
    match index.cmp(&arr.len()) {
        Ordering::Less => {
            arr[index] = value;
            Ok(())
        }
        Ordering::Equal => {
            arr.push(value);
            Ok(())
        }
        Ordering::Greater => Err(GlintError::index_out_of_bounds(
            full_path.clone(),
            index,
            arr.len(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    #[test]
    fn test_read_nested() {
        let doc = json!({"a": {"b": {"c": 42}}});
        assert_eq!(read(&doc, &path!("a", "b", "c")).unwrap(), Some(&json!(42)));
        assert_eq!(read(&doc, &path!()).unwrap(), Some(&doc));
    }

    #[test]
    fn test_read_missing_final_is_none() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(read(&doc, &path!("a", "x")).unwrap(), None);
        assert_eq!(read(&doc, &path!("x")).unwrap(), None);
    }

    #[test]
    fn test_read_missing_intermediate_errors() {
        let doc = json!({"a": {"b": 1}});
        let err = read(&doc, &path!("x", "y")).unwrap_err();
        assert!(matches!(err, GlintError::PathNotFound { path } if path.to_string() == "x"));
    }

    #[test]
    fn test_read_scalar_intermediate_errors() {
        let doc = json!({"a": 5});
        // The final segment's parent is a scalar; that path is not readable.
        assert!(read(&doc, &path!("a", "b")).is_err());
        assert!(read(&doc, &path!("a", "b", "c")).is_err());
    }

    #[test]
    fn test_read_array_positions() {
        let doc = json!({"items": [10, 20, 30]});
        assert_eq!(
            read(&doc, &path!("items", 1)).unwrap(),
            Some(&json!(20))
        );
        // Out-of-range final index reads as absent.
        assert_eq!(read(&doc, &path!("items", 9)).unwrap(), None);
    }

    #[test]
    fn test_write_replaces_and_creates() {
        let mut doc = json!({"a": {"b": 1}});
        write(&mut doc, &path!("a", "b"), json!(2)).unwrap();
        write(&mut doc, &path!("a", "new"), json!("leaf")).unwrap();
        assert_eq!(doc, json!({"a": {"b": 2, "new": "leaf"}}));
    }

    #[test]
    fn test_write_root() {
        let mut doc = json!({"a": 1});
        write(&mut doc, &path!(), json!({"b": 2})).unwrap();
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn test_write_array_append_at_len() {
        let mut doc = json!({"items": [1, 2]});
        write(&mut doc, &path!("items", 2), json!(3)).unwrap();
        assert_eq!(doc["items"], json!([1, 2, 3]));

        let err = write(&mut doc, &path!("items", 9), json!(9)).unwrap_err();
        assert!(matches!(
            err,
            GlintError::IndexOutOfBounds { index: 9, len: 3, .. }
        ));
    }

    #[test]
    fn test_write_missing_intermediate_errors() {
        let mut doc = json!({});
        assert!(write(&mut doc, &path!("a", "b"), json!(1)).is_err());
        // The document is untouched on failure.
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_build_patch_preserves_siblings() {
        let doc = json!({"profile": {"name": "ada", "age": 36}, "count": 1});
        let patch = build_patch(&doc, &path!("profile", "age"), json!(37)).unwrap();
        assert_eq!(patch, json!({"profile": {"name": "ada", "age": 37}}));
    }

    #[test]
    fn test_build_patch_top_level() {
        let doc = json!({"count": 1, "other": true});
        let patch = build_patch(&doc, &path!("count"), json!(5)).unwrap();
        assert_eq!(patch, json!({"count": 5}));
    }

    #[test]
    fn test_build_patch_missing_intermediate_errors() {
        let doc = json!({"a": {}});
        assert!(build_patch(&doc, &path!("a", "b", "c"), json!(1)).is_err());
    }

    #[test]
    fn test_get_at_lenient() {
        let doc = json!({"a": {"b": [1, 2]}});
        assert_eq!(get_at(&doc, &path!("a", "b", 1)), Some(&json!(2)));
        assert_eq!(get_at(&doc, &path!("a", "missing", "x")), None);
        assert_eq!(get_at(&doc, &path!("a", "b", 7)), None);
    }

    #[test]
    fn test_digit_key_indexes_array() {
        let doc = json!({"items": ["a", "b"]});
        assert_eq!(
            read(&doc, &path!("items", "1")).unwrap(),
            Some(&json!("b"))
        );
    }
}
