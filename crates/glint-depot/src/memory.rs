//! Reactive in-memory depot.
//!
//! `MemoryDepot` keeps the whole state tree in one document cell and pairs
//! it with a version signal. Every `read_state` touches the signal, so a
//! read performed inside a derived value or effect subscribes the reader to
//! the tree; a commit bumps the version only when it actually changed
//! something, which is what lets commit echoes from outbound sync effects
//! settle instead of looping.

use crate::error::DepotError;
use crate::module::{ActionFn, DerivationFn, ModuleDef, MutationFn, split_type};
use crate::{CommitPayload, Depot, DepotResult};
use serde_json::{Map, Value};
use spark_signals::{Signal, signal};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

struct RegisteredModule {
    namespaced: bool,
    mutations: HashMap<String, MutationFn>,
    getters: HashMap<String, DerivationFn>,
    actions: HashMap<String, ActionFn>,
}

/// Single-threaded reactive reference implementation of [`Depot`].
pub struct MemoryDepot {
    root: RefCell<Value>,
    modules: RefCell<HashMap<Vec<String>, RegisteredModule>>,
    version: Signal<u64>,
    tick: Cell<u64>,
}

impl MemoryDepot {
    /// Create an empty depot.
    pub fn new() -> Self {
        Self {
            root: RefCell::new(Value::Object(Map::new())),
            modules: RefCell::new(HashMap::new()),
            version: signal(0),
            tick: Cell::new(0),
        }
    }

    /// Untracked clone of the whole state tree.
    pub fn snapshot(&self) -> Value {
        self.root.borrow().clone()
    }

    /// Untracked read of the bump counter. Increments once per effective
    /// change to the tree.
    pub fn version(&self) -> u64 {
        self.tick.get()
    }

    /// Paths of all registered modules, unordered.
    pub fn module_paths(&self) -> Vec<Vec<String>> {
        self.modules.borrow().keys().cloned().collect()
    }

    fn bump(&self) {
        let next = self.tick.get() + 1;
        self.tick.set(next);
        self.version.set(next);
    }

    fn resolve_slot<T: Clone>(
        &self,
        type_path: &str,
        pick: impl Fn(&RegisteredModule, &str) -> Option<T>,
        missing_slot: impl Fn(&str) -> DepotError,
    ) -> DepotResult<(Vec<String>, T)> {
        let (segments, name) = split_type(type_path);
        let modules = self.modules.borrow();
        if let Some(module) = modules.get(&segments) {
            return match pick(module, &name) {
                Some(slot) => Ok((segments, slot)),
                None => Err(missing_slot(type_path)),
            };
        }
        if segments.is_empty() {
            for (path, module) in modules.iter() {
                if module.namespaced {
                    continue;
                }
                if let Some(slot) = pick(module, &name) {
                    return Ok((path.clone(), slot));
                }
            }
            return Err(missing_slot(type_path));
        }
        Err(DepotError::module_not_found(&segments))
    }
}

impl Default for MemoryDepot {
    fn default() -> Self {
        Self::new()
    }
}

impl Depot for MemoryDepot {
    fn has_module(&self, segments: &[String]) -> bool {
        self.modules.borrow().contains_key(segments)
    }

    fn register_module(&self, segments: &[String], module: ModuleDef) -> DepotResult<()> {
        let key = segments.to_vec();
        if self.modules.borrow().contains_key(&key) {
            return Err(DepotError::duplicate_module(segments));
        }
        {
            let mut root = self.root.borrow_mut();
            insert_subtree(&mut root, segments, module.state.clone());
        }
        self.modules.borrow_mut().insert(
            key,
            RegisteredModule {
                namespaced: module.namespaced,
                mutations: module.mutations,
                getters: module.getters,
                actions: module.actions,
            },
        );
        self.bump();
        debug!(path = %segments.join("/"), "registered module");
        Ok(())
    }

    fn unregister_module(&self, segments: &[String]) -> DepotResult<()> {
        if self.modules.borrow_mut().remove(segments).is_none() {
            return Err(DepotError::module_not_found(segments));
        }
        {
            let mut root = self.root.borrow_mut();
            remove_subtree(&mut root, segments);
        }
        self.bump();
        debug!(path = %segments.join("/"), "unregistered module");
        Ok(())
    }

    /// Run a mutation. Mutation bodies must not re-enter the depot; the
    /// document cell is borrowed for the duration of the call.
    fn commit(&self, type_path: &str, payload: CommitPayload) -> DepotResult<()> {
        let (segments, mutation) = self.resolve_slot(
            type_path,
            |m, name| m.mutations.get(name).cloned(),
            |n| DepotError::unknown_mutation(n),
        )?;
        let (changed, result) = {
            let mut root = self.root.borrow_mut();
            let slot = subtree_mut(&mut root, &segments)?;
            let before = slot.clone();
            let result = mutation(slot, &payload);
            (*slot != before, result)
        };
        if changed {
            self.bump();
        }
        trace!(mutation = type_path, changed, "commit");
        result
    }

    fn dispatch(&self, type_path: &str, args: Vec<Value>) -> DepotResult<Value> {
        let (_, action) = self.resolve_slot(
            type_path,
            |m, name| m.actions.get(name).cloned(),
            |n| DepotError::unknown_action(n),
        )?;
        trace!(action = type_path, "dispatch");
        Ok(action(args))
    }

    fn read_getter(&self, type_path: &str) -> DepotResult<Value> {
        let (_, getter) = self.resolve_slot(
            type_path,
            |m, name| m.getters.get(name).cloned(),
            |n| DepotError::unknown_derivation(n),
        )?;
        Ok(getter())
    }

    fn read_state(&self, path: &str) -> Value {
        let _ = self.version.get();
        let root = self.root.borrow();
        walk_dotted(&root, path).cloned().unwrap_or(Value::Null)
    }
}

/// Lenient dotted walk: objects by key, arrays by numeric segment,
/// everything else stops the walk.
fn walk_dotted<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn subtree_mut<'a>(root: &'a mut Value, segments: &[String]) -> DepotResult<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map
                .get_mut(segment)
                .ok_or_else(|| DepotError::module_not_found(segments))?,
            _ => return Err(DepotError::module_not_found(segments)),
        };
    }
    Ok(current)
}

fn insert_subtree(root: &mut Value, segments: &[String], state: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = state;
        return;
    };
    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            warn!(segment = %segment, "replacing non-object parent during registration");
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else { return };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.clone(), state);
    }
}

fn remove_subtree(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        match current {
            Value::Object(map) => match map.get_mut(segment) {
                Some(next) => current = next,
                None => return,
            },
            _ => return,
        }
    }
    if let Value::Object(map) = current {
        map.remove(last);
    }
}
