//! Path-addressed, module-based keyed store.
//!
//! `glint-depot` is the external-store side of the `glint` workspace: a
//! container that holds one JSON state tree, organized into registered
//! modules, addressed by `/`-delimited module paths and dotted state paths.
//!
//! # Core Concepts
//!
//! - **Depot**: the capability trait. Register and unregister modules,
//!   commit mutations, dispatch actions, read state by dotted path.
//! - **ModuleDef**: what a producer registers: an initial state subtree plus
//!   named mutations, derivations, and actions
//! - **CommitPayload**: `{key?, value}`. Replaces a whole field, or patches
//!   a dotted sub-path below it when `key` is set.
//! - **MemoryDepot**: the reactive in-memory reference implementation
//!
//! # Quick Start
//!
//! ```
//! use glint_depot::{CommitPayload, Depot, MemoryDepot, ModuleDef};
//! use serde_json::json;
//!
//! let depot = MemoryDepot::new();
//! let module = ModuleDef::new(json!({"state": {"count": 0}}))
//!     .with_mutation("set_state_count", |state, payload| {
//!         state["state"]["count"] = payload.value.clone();
//!         Ok(())
//!     });
//!
//! let path = vec!["counter".to_string()];
//! depot.register_module(&path, module).unwrap();
//! depot.commit("counter/set_state_count", CommitPayload::whole(json!(5))).unwrap();
//!
//! assert_eq!(depot.read_state("counter.state.count"), json!(5));
//! ```
//!
//! # Reactivity
//!
//! `MemoryDepot` pairs the state tree with a version signal from
//! `spark-signals`: `read_state` inside a derived value or effect subscribes
//! the reader, and commits bump the version only when they changed the tree.
//! Consumers drive deferred reactions with `spark_signals::flush_sync`.

mod error;
mod memory;
mod module;
mod traits;

pub use error::{DepotError, DepotResult};
pub use memory::MemoryDepot;
pub use module::{ActionFn, CommitPayload, DerivationFn, ModuleDef, MutationFn, split_type};
pub use traits::Depot;

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
