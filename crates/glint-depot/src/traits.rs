//! The depot capability contract.

use crate::{CommitPayload, DepotResult, ModuleDef};
use serde_json::Value;

/// A path-addressed, module-based keyed store.
///
/// Producers register named modules (state plus mutations, derivations and
/// actions) under `/`-delimited path segments; consumers commit mutations,
/// dispatch actions, and read nested state by dotted path. Implementations
/// are expected to be single-threaded and reactive: `read_state` performed
/// inside a tracking context must re-run the reader when a later commit
/// changes the tree.
pub trait Depot {
    /// Whether a module is registered at exactly these path segments.
    fn has_module(&self, segments: &[String]) -> bool;

    /// Register a module under the given path segments.
    ///
    /// Fails with `DuplicateModule` if one is already registered there.
    fn register_module(&self, segments: &[String], module: ModuleDef) -> DepotResult<()>;

    /// Remove a module and its state subtree.
    fn unregister_module(&self, segments: &[String]) -> DepotResult<()>;

    /// Run a named mutation against its module's state subtree.
    ///
    /// `type_path` is `/`-delimited: module segments followed by the mutation
    /// name, e.g. `"s/set_state_value"`. Bare names resolve against
    /// non-namespaced modules.
    fn commit(&self, type_path: &str, payload: CommitPayload) -> DepotResult<()>;

    /// Invoke a named action with positional arguments.
    fn dispatch(&self, type_path: &str, args: Vec<Value>) -> DepotResult<Value>;

    /// Evaluate a named derivation.
    fn read_getter(&self, type_path: &str) -> DepotResult<Value>;

    /// Read nested state by dotted path from the tree root.
    ///
    /// Lenient: an absent or untraversable path reads as `Null`.
    fn read_state(&self, path: &str) -> Value;

    /// Read nested state, substituting `default` for `Null`.
    fn read_state_or(&self, path: &str, default: Value) -> Value {
        let value = self.read_state(path);
        if value.is_null() { default } else { value }
    }

    /// Commit a whole-field payload.
    fn commit_whole(&self, type_path: &str, value: Value) -> DepotResult<()> {
        self.commit(type_path, CommitPayload::whole(value))
    }

    /// Commit a keyed payload addressing a dotted sub-path.
    fn commit_at(&self, type_path: &str, key: impl Into<String>, value: Value) -> DepotResult<()>
    where
        Self: Sized,
    {
        self.commit(type_path, CommitPayload::at(key, value))
    }
}
