//! Deep mutation proxies over JSON values.
//!
//! A [`ValueProxy`] is a cheaply clonable handle over an object or array that
//! supports nested reads and writes. It comes in two modes:
//!
//! - **local**: the proxy owns its value and mutates it in place. Child
//!   proxies for unmodified container keys are cached, so reading the same
//!   key twice yields the identical node.
//! - **remote**: the proxy never mutates. Every write is forwarded to a
//!   setter callback as `(dotted_path, new_value)`, where the path is
//!   relative to the wrap root (the empty path addresses the root itself).
//!   Reads resolve against the snapshot the proxy was built from, and child
//!   nodes are rebuilt fresh on every read.
//!
//! Array operations apply one underlying mutation and emit exactly one
//! notification carrying the full new array, however many elements they
//! touch.

use crate::access::{self, is_container};
use crate::error::{GlintError, GlintResult, value_type_name};
use crate::path::{Path, Seg};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Callback receiving remote-mode writes: `(dotted_path, new_value)`.
pub type ProxySetter = Rc<dyn Fn(&str, Value)>;

/// Callback observing local-mode writes: `(slot_path, whole_new_root)`.
///
/// Must not write back through the proxy that invoked it.
pub(crate) type NotifyFn = Rc<dyn Fn(&Path, &Value)>;

/// Options for [`ValueProxy::merge`].
#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    /// Keys to hide, per source, indexed like the source list.
    pub ignore_keys: Vec<Vec<String>>,
}

#[derive(Clone)]
enum Source {
    Local {
        cell: Rc<RefCell<Value>>,
        notify: NotifyFn,
    },
    Remote {
        snapshot: Rc<Value>,
        setter: ProxySetter,
    },
}

#[derive(Clone)]
struct Part {
    source: Source,
    /// Root-level keys this source does not expose. Empty below the root.
    ignored: Rc<HashSet<String>>,
}

impl Part {
    fn value_at(&self, path: &Path) -> Option<Value> {
        match &self.source {
            Source::Local { cell, .. } => access::get_at(&cell.borrow(), path).cloned(),
            Source::Remote { snapshot, .. } => access::get_at(snapshot, path).cloned(),
        }
    }
}

struct Node {
    /// Source list in declaration order; later sources shadow earlier keys.
    /// Always non-empty, and exactly one entry below the wrap root.
    parts: Vec<Part>,
    /// Location of this node relative to the wrap root.
    path: Path,
    /// Child cache, used in local mode only.
    kids: RefCell<HashMap<String, ValueProxy>>,
}

/// A live view over an object or array supporting deep reads and writes.
#[derive(Clone)]
pub struct ValueProxy {
    node: Rc<Node>,
}

impl fmt::Debug for ValueProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProxy")
            .field("path", &self.node.path)
            .field("sources", &self.node.parts.len())
            .finish()
    }
}

impl ValueProxy {
    /// Wrap a value in local mode. The proxy owns the value.
    ///
    /// Fails with `InvalidProxyTarget` unless the value is an object or
    /// array.
    ///
    /// # Examples
    ///
    /// ```
    /// use glint::ValueProxy;
    /// use serde_json::json;
    ///
    /// let proxy = ValueProxy::wrap(json!({"count": 1})).unwrap();
    /// proxy.set("count", json!(2)).unwrap();
    /// assert_eq!(proxy.get("count"), json!(2));
    /// ```
    pub fn wrap(value: Value) -> GlintResult<Self> {
        Self::wrap_observed(value, Rc::new(|_, _| {}))
    }

    /// Wrap a value in local mode with a write observer.
    pub(crate) fn wrap_observed(value: Value, notify: NotifyFn) -> GlintResult<Self> {
        if !is_container(&value) {
            return Err(GlintError::invalid_proxy_target(format!(
                "cannot wrap a {}",
                value_type_name(&value)
            )));
        }
        Ok(Self::from_parts(vec![Part {
            source: Source::Local {
                cell: Rc::new(RefCell::new(value)),
                notify,
            },
            ignored: Rc::new(HashSet::new()),
        }]))
    }

    /// Wrap a value in remote mode.
    ///
    /// Reads resolve against `value` as it was passed in; the proxy never
    /// mutates it. Every write calls `setter(dotted_path, new_value)` with
    /// the path of the written slot relative to the wrap root. The empty
    /// path addresses the wrap root itself (whole-array operations on a
    /// wrapped array, for example).
    pub fn wrap_with_setter(value: Value, setter: ProxySetter) -> GlintResult<Self> {
        if !is_container(&value) {
            return Err(GlintError::invalid_proxy_target(format!(
                "cannot wrap a {}",
                value_type_name(&value)
            )));
        }
        Ok(Self::from_parts(vec![Part {
            source: Source::Remote {
                snapshot: Rc::new(value),
                setter,
            },
            ignored: Rc::new(HashSet::new()),
        }]))
    }

    /// View several source objects as one proxy.
    ///
    /// Later sources shadow earlier keys. `options.ignore_keys[i]` hides the
    /// named root-level keys of source `i`. Writes land in the source that
    /// currently provides the key, or in the last source for new keys.
    ///
    /// An array may only be wrapped alone; mixing an array with any peer, or
    /// passing a non-container source, fails `InvalidProxyTarget`.
    pub fn merge(values: Vec<Value>, options: MergeOptions) -> GlintResult<Self> {
        if values.is_empty() {
            return Err(GlintError::invalid_proxy_target(
                "merge requires at least one source",
            ));
        }
        if let Some(bad) = values.iter().find(|v| !is_container(v)) {
            return Err(GlintError::invalid_proxy_target(format!(
                "cannot merge a {}",
                value_type_name(bad)
            )));
        }
        if values.len() > 1 && values.iter().any(Value::is_array) {
            return Err(GlintError::invalid_proxy_target(
                "an array can only be wrapped alone",
            ));
        }

        let noop: NotifyFn = Rc::new(|_, _| {});
        let parts = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Part {
                source: Source::Local {
                    cell: Rc::new(RefCell::new(value)),
                    notify: noop.clone(),
                },
                ignored: Rc::new(
                    options
                        .ignore_keys
                        .get(i)
                        .map(|keys| keys.iter().cloned().collect())
                        .unwrap_or_default(),
                ),
            })
            .collect();
        Ok(Self::from_parts(parts))
    }

    fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            node: Rc::new(Node {
                parts,
                path: Path::root(),
                kids: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Whether two handles point at the same proxy node.
    #[inline]
    pub fn ptr_eq(&self, other: &ValueProxy) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Snapshot the value under `key`, or `Null` when absent.
    pub fn get(&self, key: &str) -> Value {
        self.winning(key).map(|(_, v)| v).unwrap_or(Value::Null)
    }

    /// Get a child proxy for a container-valued key.
    ///
    /// Returns `None` for scalar or absent keys. In local mode the child is
    /// cached: reading the same unchanged key twice returns the identical
    /// node. Remote children are rebuilt fresh on every call.
    pub fn child(&self, key: &str) -> Option<ValueProxy> {
        if self.is_local() {
            if let Some(existing) = self.node.kids.borrow().get(key) {
                return Some(existing.clone());
            }
        }

        let (part, value) = self.winning(key)?;
        if !is_container(&value) {
            return None;
        }

        let child = ValueProxy {
            node: Rc::new(Node {
                parts: vec![Part {
                    source: part.source.clone(),
                    ignored: Rc::new(HashSet::new()),
                }],
                path: self.child_path(key),
                kids: RefCell::new(HashMap::new()),
            }),
        };
        if self.is_local() {
            self.node
                .kids
                .borrow_mut()
                .insert(key.to_owned(), child.clone());
        }
        Some(child)
    }

    /// Write `value` under `key`.
    ///
    /// Local mode applies the write in place and invalidates the cached
    /// child for that key. Remote mode forwards the value to the setter
    /// untouched.
    pub fn set(&self, key: &str, value: Value) -> GlintResult<()> {
        let slot = self.child_path(key);
        let Some(part) = self.write_part(key) else {
            return Err(GlintError::invalid_proxy_target("proxy has no sources"));
        };
        match &part.source {
            Source::Local { cell, notify } => {
                {
                    let mut root = cell.borrow_mut();
                    access::write(&mut root, &slot, value)?;
                }
                self.node.kids.borrow_mut().remove(key);
                let snapshot = cell.borrow().clone();
                (notify)(&slot, &snapshot);
                Ok(())
            }
            Source::Remote { setter, .. } => {
                (setter)(&slot.to_string(), value);
                Ok(())
            }
        }
    }

    /// The visible keys: merged object keys, or stringified array indexes.
    pub fn keys(&self) -> Vec<String> {
        match self.resolve() {
            Some(Value::Array(arr)) => (0..arr.len()).map(|i| i.to_string()).collect(),
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Element count for arrays, visible key count for objects.
    pub fn len(&self) -> usize {
        match self.resolve() {
            Some(Value::Array(arr)) => arr.len(),
            Some(Value::Object(map)) => map.len(),
            _ => 0,
        }
    }

    /// Whether the proxy currently has no visible entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the wrapped value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.resolve(), Some(Value::Array(_)))
    }

    /// Plain snapshot of the whole wrapped tree.
    ///
    /// Merged proxies flatten into a single object with shadowing applied.
    pub fn to_value(&self) -> Value {
        self.resolve().unwrap_or(Value::Null)
    }

    /// Append `items` to the wrapped array. Returns the new length.
    pub fn push(&self, items: Vec<Value>) -> GlintResult<usize> {
        self.mutate_array(|arr| {
            arr.extend(items);
            arr.len()
        })
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> GlintResult<Option<Value>> {
        self.mutate_array(|arr| arr.pop())
    }

    /// Remove and return the first element.
    pub fn shift(&self) -> GlintResult<Option<Value>> {
        self.mutate_array(|arr| {
            if arr.is_empty() {
                None
            } else {
                Some(arr.remove(0))
            }
        })
    }

    /// Prepend `items`, preserving their order. Returns the new length.
    pub fn unshift(&self, items: Vec<Value>) -> GlintResult<usize> {
        self.mutate_array(|arr| {
            for (i, item) in items.into_iter().enumerate() {
                arr.insert(i, item);
            }
            arr.len()
        })
    }

    /// Reverse the wrapped array in place.
    pub fn reverse(&self) -> GlintResult<()> {
        self.mutate_array(|arr| arr.reverse())
    }

    /// Sort the wrapped array by the total JSON order:
    /// null < bool < number < string < array < object.
    pub fn sort(&self) -> GlintResult<()> {
        self.mutate_array(|arr| arr.sort_by(json_cmp))
    }

    /// Sort the wrapped array with a caller-supplied comparator.
    pub fn sort_by(&self, cmp: impl Fn(&Value, &Value) -> Ordering) -> GlintResult<()> {
        self.mutate_array(|arr| arr.sort_by(|a, b| cmp(a, b)))
    }

    /// Remove `delete_count` elements at `start`, inserting `items` there.
    /// Returns the removed elements. Out-of-range bounds are clamped.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: Vec<Value>,
    ) -> GlintResult<Vec<Value>> {
        self.mutate_array(|arr| {
            let start = start.min(arr.len());
            let end = start + delete_count.min(arr.len() - start);
            arr.splice(start..end, items).collect()
        })
    }

    /// Overwrite every element of the wrapped array with `value`.
    pub fn fill(&self, value: Value) -> GlintResult<()> {
        self.mutate_array(|arr| {
            for slot in arr.iter_mut() {
                *slot = value.clone();
            }
        })
    }

    /// Apply one array mutation and emit one notification.
    ///
    /// Arrays are single-source by construction, so the first part is the
    /// only part.
    fn mutate_array<T>(&self, op: impl FnOnce(&mut Vec<Value>) -> T) -> GlintResult<T> {
        let Some(part) = self.node.parts.first() else {
            return Err(GlintError::invalid_proxy_target("proxy has no sources"));
        };
        let path = &self.node.path;
        match &part.source {
            Source::Local { cell, notify } => {
                let result;
                {
                    let mut root = cell.borrow_mut();
                    let Some(target) = access::get_at_mut(&mut root, path) else {
                        return Err(GlintError::path_not_found(path.clone()));
                    };
                    let Value::Array(arr) = target else {
                        return Err(GlintError::type_mismatch(
                            path.clone(),
                            "array",
                            value_type_name(target),
                        ));
                    };
                    result = op(arr);
                }
                self.node.kids.borrow_mut().clear();
                let snapshot = cell.borrow().clone();
                (notify)(path, &snapshot);
                Ok(result)
            }
            Source::Remote { snapshot, setter } => {
                let Some(current) = access::get_at(snapshot, path) else {
                    return Err(GlintError::path_not_found(path.clone()));
                };
                let Value::Array(existing) = current else {
                    return Err(GlintError::type_mismatch(
                        path.clone(),
                        "array",
                        value_type_name(current),
                    ));
                };
                let mut arr = existing.clone();
                let result = op(&mut arr);
                (setter)(&path.to_string(), Value::Array(arr));
                Ok(result)
            }
        }
    }

    fn is_local(&self) -> bool {
        matches!(
            self.node.parts.first().map(|p| &p.source),
            Some(Source::Local { .. })
        )
    }

    fn child_path(&self, key: &str) -> Path {
        self.node.path.clone().seg(Seg::parse(key))
    }

    /// Find the part that currently provides `key`, scanning shadow-first.
    fn winning(&self, key: &str) -> Option<(&Part, Value)> {
        let child_path = self.child_path(key);
        let at_root = self.node.path.is_empty();
        for part in self.node.parts.iter().rev() {
            if at_root && part.ignored.contains(key) {
                continue;
            }
            if let Some(v) = part.value_at(&child_path) {
                return Some((part, v));
            }
        }
        None
    }

    /// The part a write to `key` lands in: the providing part, or the last
    /// source for new keys.
    fn write_part(&self, key: &str) -> Option<&Part> {
        let child_path = self.child_path(key);
        let at_root = self.node.path.is_empty();
        self.node
            .parts
            .iter()
            .rev()
            .find(|part| {
                !(at_root && part.ignored.contains(key)) && part.value_at(&child_path).is_some()
            })
            .or_else(|| self.node.parts.last())
    }

    /// Resolve this node's current value, flattening merged roots.
    fn resolve(&self) -> Option<Value> {
        if self.node.parts.len() == 1 {
            return self.node.parts[0].value_at(&self.node.path);
        }

        // Multi-part nodes exist only at the wrap root and merge objects.
        let mut out = Map::new();
        let mut any = false;
        for part in &self.node.parts {
            if let Some(Value::Object(map)) = part.value_at(&self.node.path) {
                any = true;
                for (k, v) in map {
                    if part.ignored.contains(&k) {
                        continue;
                    }
                    out.insert(k, v);
                }
            }
        }
        any.then_some(Value::Object(out))
    }
}

fn json_type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array <
/// object, with same-kind values compared structurally.
fn json_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (ea, eb) in x.iter().zip(y.iter()) {
                let ord = json_cmp(ea, eb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((ka, va), (kb, vb)) in x.iter().zip(y.iter()) {
                let ord = ka.cmp(kb).then_with(|| json_cmp(va, vb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => json_type_rank(a).cmp(&json_type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_wrap_rejects_scalars() {
        assert!(ValueProxy::wrap(json!(5)).is_err());
        assert!(ValueProxy::wrap(json!("text")).is_err());
        assert!(ValueProxy::wrap(json!(null)).is_err());
        assert!(ValueProxy::wrap(json!({})).is_ok());
        assert!(ValueProxy::wrap(json!([])).is_ok());
    }

    #[test]
    fn test_local_read_write() {
        let proxy = ValueProxy::wrap(json!({"a": 1, "nested": {"b": 2}})).unwrap();
        assert_eq!(proxy.get("a"), json!(1));
        assert_eq!(proxy.get("missing"), Value::Null);

        proxy.set("a", json!(10)).unwrap();
        assert_eq!(proxy.get("a"), json!(10));

        let nested = proxy.child("nested").unwrap();
        nested.set("b", json!(20)).unwrap();
        assert_eq!(proxy.to_value(), json!({"a": 10, "nested": {"b": 20}}));
    }

    #[test]
    fn test_child_identity_stable_until_replaced() {
        let proxy = ValueProxy::wrap(json!({"nested": {"b": 2}})).unwrap();
        let first = proxy.child("nested").unwrap();
        let second = proxy.child("nested").unwrap();
        assert!(first.ptr_eq(&second));

        // Deep writes keep the node alive.
        first.set("b", json!(3)).unwrap();
        assert!(proxy.child("nested").unwrap().ptr_eq(&first));

        // Wholesale replacement produces a fresh node on next read.
        proxy.set("nested", json!({"b": 4})).unwrap();
        let fresh = proxy.child("nested").unwrap();
        assert!(!fresh.ptr_eq(&first));
        assert_eq!(fresh.get("b"), json!(4));
    }

    #[test]
    fn test_remote_writes_report_dotted_paths() {
        let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let proxy = ValueProxy::wrap_with_setter(
            json!({"profile": {"name": "ada"}}),
            Rc::new(move |path, value| sink.borrow_mut().push((path.to_owned(), value))),
        )
        .unwrap();

        proxy.set("top", json!(1)).unwrap();
        proxy.child("profile").unwrap().set("name", json!("grace")).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0], ("top".to_owned(), json!(1)));
        assert_eq!(seen[1], ("profile.name".to_owned(), json!("grace")));
        // The snapshot is frozen; the write did not change local reads.
        assert_eq!(proxy.child("profile").unwrap().get("name"), json!("ada"));
    }

    #[test]
    fn test_remote_children_not_cached() {
        let proxy = ValueProxy::wrap_with_setter(
            json!({"nested": {"b": 1}}),
            Rc::new(|_, _| {}),
        )
        .unwrap();
        let first = proxy.child("nested").unwrap();
        let second = proxy.child("nested").unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_merge_shadowing_and_ignores() {
        let proxy = ValueProxy::merge(
            vec![
                json!({"a": 1, "b": 1, "hidden": true}),
                json!({"b": 2, "c": 3}),
            ],
            MergeOptions {
                ignore_keys: vec![vec!["hidden".to_owned()], vec![]],
            },
        )
        .unwrap();

        assert_eq!(proxy.get("a"), json!(1));
        assert_eq!(proxy.get("b"), json!(2));
        assert_eq!(proxy.get("c"), json!(3));
        assert_eq!(proxy.get("hidden"), Value::Null);
        assert_eq!(proxy.to_value(), json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn test_merge_writes_land_in_providing_source() {
        let proxy = ValueProxy::merge(
            vec![json!({"a": 1}), json!({"b": 2})],
            MergeOptions::default(),
        )
        .unwrap();

        proxy.set("a", json!(10)).unwrap();
        proxy.set("new", json!(true)).unwrap();
        assert_eq!(proxy.get("a"), json!(10));
        // New keys land in the last source and are visible through the view.
        assert_eq!(proxy.get("new"), json!(true));
    }

    #[test]
    fn test_merge_rejects_arrays_with_peers() {
        let err = ValueProxy::merge(
            vec![json!({"a": 1}), json!([1, 2])],
            MergeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GlintError::InvalidProxyTarget { .. }));

        assert!(ValueProxy::merge(vec![json!([1, 2])], MergeOptions::default()).is_ok());
        assert!(ValueProxy::merge(vec![json!(7)], MergeOptions::default()).is_err());
        assert!(ValueProxy::merge(vec![], MergeOptions::default()).is_err());
    }

    #[test]
    fn test_array_ops() {
        let proxy = ValueProxy::wrap(json!([3, 1, 2])).unwrap();
        assert!(proxy.is_array());
        assert_eq!(proxy.len(), 3);

        assert_eq!(proxy.push(vec![json!(4), json!(5)]).unwrap(), 5);
        assert_eq!(proxy.pop().unwrap(), Some(json!(5)));
        assert_eq!(proxy.shift().unwrap(), Some(json!(3)));
        assert_eq!(proxy.unshift(vec![json!(0), json!(9)]).unwrap(), 5);
        assert_eq!(proxy.to_value(), json!([0, 9, 1, 2, 4]));

        proxy.sort().unwrap();
        assert_eq!(proxy.to_value(), json!([0, 1, 2, 4, 9]));
        proxy.reverse().unwrap();
        assert_eq!(proxy.to_value(), json!([9, 4, 2, 1, 0]));

        let removed = proxy.splice(1, 2, vec![json!("x")]).unwrap();
        assert_eq!(removed, vec![json!(4), json!(2)]);
        assert_eq!(proxy.to_value(), json!([9, "x", 1, 0]));

        proxy.fill(json!(7)).unwrap();
        assert_eq!(proxy.to_value(), json!([7, 7, 7, 7]));
    }

    #[test]
    fn test_array_ops_require_array() {
        let proxy = ValueProxy::wrap(json!({"a": 1})).unwrap();
        let err = proxy.push(vec![json!(1)]).unwrap_err();
        assert!(matches!(
            err,
            GlintError::TypeMismatch {
                expected: "array",
                found: "object",
                ..
            }
        ));
    }

    #[test]
    fn test_bulk_push_notifies_once() {
        let count = Rc::new(Cell::new(0usize));
        let seen = count.clone();
        let proxy = ValueProxy::wrap_observed(
            json!([1]),
            Rc::new(move |_, _| seen.set(seen.get() + 1)),
        )
        .unwrap();

        proxy.push(vec![json!(2), json!(3), json!(4)]).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(proxy.to_value(), json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_sort_total_order_across_kinds() {
        let proxy =
            ValueProxy::wrap(json!([{"k": 1}, "b", 2, null, [1], true, "a", 1])).unwrap();
        proxy.sort().unwrap();
        assert_eq!(
            proxy.to_value(),
            json!([null, true, 1, 2, "a", "b", [1], {"k": 1}])
        );
    }

    #[test]
    fn test_sort_by_comparator() {
        let proxy = ValueProxy::wrap(json!([1, 3, 2])).unwrap();
        proxy.sort_by(|a, b| json_cmp(b, a)).unwrap();
        assert_eq!(proxy.to_value(), json!([3, 2, 1]));
    }

    #[test]
    fn test_remote_array_op_sends_whole_array() {
        let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let proxy = ValueProxy::wrap_with_setter(
            json!({"items": [1, 2]}),
            Rc::new(move |path, value| sink.borrow_mut().push((path.to_owned(), value))),
        )
        .unwrap();

        proxy.child("items").unwrap().push(vec![json!(3)]).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("items".to_owned(), json!([1, 2, 3])));
    }

    #[test]
    fn test_numeric_keys_address_array_slots() {
        let proxy = ValueProxy::wrap(json!({"items": ["a", "b"]})).unwrap();
        let items = proxy.child("items").unwrap();
        assert_eq!(items.get("1"), json!("b"));
        items.set("1", json!("z")).unwrap();
        assert_eq!(proxy.to_value(), json!({"items": ["a", "z"]}));
    }
}
