//! Module descriptions and commit payloads.
//!
//! A [`ModuleDef`] is the record a producer hands to
//! [`Depot::register_module`](crate::Depot::register_module): an initial
//! state subtree plus named mutations, derivations, and actions. Function
//! slots are plain `Rc` closures so a registration can capture live handles
//! from the producing side.

use crate::DepotResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A mutation body: applies a payload to the module's state subtree.
pub type MutationFn = Rc<dyn Fn(&mut Value, &CommitPayload) -> DepotResult<()>>;

/// A derivation body: computes a read-only value on demand.
pub type DerivationFn = Rc<dyn Fn() -> Value>;

/// An action body: an invocable taking positional JSON arguments.
pub type ActionFn = Rc<dyn Fn(Vec<Value>) -> Value>;

/// Payload for [`Depot::commit`](crate::Depot::commit).
///
/// `key` optionally addresses a dotted sub-path below the mutation's target
/// field; when absent the whole field is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitPayload {
    /// Dotted sub-path below the mutation target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// The value to write.
    pub value: Value,
}

impl CommitPayload {
    /// Payload replacing the whole target field.
    #[inline]
    pub fn whole(value: impl Into<Value>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    /// Payload patching a dotted sub-path below the target field.
    #[inline]
    pub fn at(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// A registerable module: initial state plus named function slots.
#[derive(Clone)]
pub struct ModuleDef {
    pub(crate) namespaced: bool,
    pub(crate) state: Value,
    pub(crate) mutations: HashMap<String, MutationFn>,
    pub(crate) getters: HashMap<String, DerivationFn>,
    pub(crate) actions: HashMap<String, ActionFn>,
}

impl ModuleDef {
    /// Create a namespaced module with the given initial state subtree.
    pub fn new(state: impl Into<Value>) -> Self {
        Self {
            namespaced: true,
            state: state.into(),
            mutations: HashMap::new(),
            getters: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    /// Toggle namespacing. Non-namespaced modules resolve their mutation and
    /// action names globally, without the path prefix.
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    /// Add a named mutation.
    pub fn with_mutation(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Value, &CommitPayload) -> DepotResult<()> + 'static,
    ) -> Self {
        self.mutations.insert(name.into(), Rc::new(f));
        self
    }

    /// Add a named derivation.
    pub fn with_getter(mut self, name: impl Into<String>, f: impl Fn() -> Value + 'static) -> Self {
        self.getters.insert(name.into(), Rc::new(f));
        self
    }

    /// Add a named action.
    pub fn with_action(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Vec<Value>) -> Value + 'static,
    ) -> Self {
        self.actions.insert(name.into(), Rc::new(f));
        self
    }

    /// The initial state subtree.
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Whether mutation/action names resolve under the module path.
    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    /// Names of the registered mutations, unordered.
    pub fn mutation_names(&self) -> Vec<&str> {
        self.mutations.keys().map(String::as_str).collect()
    }

    /// Names of the registered derivations, unordered.
    pub fn getter_names(&self) -> Vec<&str> {
        self.getters.keys().map(String::as_str).collect()
    }

    /// Names of the registered actions, unordered.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDef")
            .field("namespaced", &self.namespaced)
            .field("state", &self.state)
            .field("mutations", &self.mutation_names())
            .field("getters", &self.getter_names())
            .field("actions", &self.action_names())
            .finish()
    }
}

/// Split a `/`-delimited commit or dispatch type into module segments and
/// the trailing slot name. A bare name yields empty segments.
pub fn split_type(type_path: &str) -> (Vec<String>, String) {
    let mut segments: Vec<String> = type_path.split('/').map(str::to_string).collect();
    let name = segments.pop().unwrap_or_default();
    (segments, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commit_payload_constructors() {
        let whole = CommitPayload::whole(json!(5));
        assert_eq!(whole.key, None);
        assert_eq!(whole.value, json!(5));

        let keyed = CommitPayload::at("b0.b1", json!("x"));
        assert_eq!(keyed.key.as_deref(), Some("b0.b1"));
    }

    #[test]
    fn test_commit_payload_serde() {
        let whole = CommitPayload::whole(json!(5));
        let s = serde_json::to_string(&whole).unwrap();
        assert_eq!(s, r#"{"value":5}"#);

        let back: CommitPayload = serde_json::from_str(r#"{"key":"a.b","value":1}"#).unwrap();
        assert_eq!(back, CommitPayload::at("a.b", json!(1)));
    }

    #[test]
    fn test_module_def_builder() {
        let module = ModuleDef::new(json!({"state": {"n": 1}}))
            .with_mutation("set_state_n", |state, payload| {
                state["state"]["n"] = payload.value.clone();
                Ok(())
            })
            .with_getter("double", || json!(2))
            .with_action("bump", |_args| Value::Null);

        assert!(module.is_namespaced());
        assert_eq!(module.mutation_names(), vec!["set_state_n"]);
        assert_eq!(module.getter_names(), vec!["double"]);
        assert_eq!(module.action_names(), vec!["bump"]);
    }

    #[test]
    fn test_split_type() {
        assert_eq!(
            split_type("a/b/set_state_x"),
            (vec!["a".to_string(), "b".to_string()], "set_state_x".to_string())
        );
        assert_eq!(split_type("bare"), (vec![], "bare".to_string()));
    }
}
