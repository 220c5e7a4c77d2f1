//! Reactive store synthesis over JSON values.
//!
//! `glint` turns a plain declaration of members into a live observable
//! store: plain values become reactive state, zero-argument functions
//! become memoized getters, get/set pairs become writable computeds, and
//! the rest become receiver-bound actions. Stores can optionally bridge
//! into an external keyed store (a [`Depot`](glint_depot::Depot)), which
//! then becomes the single source of truth while local writes and derived
//! values are synchronized outward.
//!
//! # Core Concepts
//!
//! - **StoreDef**: A builder-style declaration of members, optionally
//!   extending a parent declaration
//! - **Store**: The synthesized singleton instance with classified,
//!   reactive members
//! - **StoreRegistry**: Explicit per-application registry handing out
//!   [`UseStore`] accessors and owning the sync configuration
//! - **ValueProxy**: Deep mutation proxy reporting dotted-path writes into
//!   nested containers
//! - **Path**: Dotted-path addressing into JSON trees (`"users.0.name"`)
//!
//! # Quick Start
//!
//! ```
//! use glint::{StoreDef, StoreOptions, StoreRegistry};
//! use serde_json::json;
//!
//! let registry = StoreRegistry::new();
//! let counter = registry.define(
//!     StoreDef::new()
//!         .state("value", json!(1))
//!         .getter("doubled", |store| json!(store.i64("value") * 2))
//!         .action("add", |store, args| {
//!             let by = args.first().and_then(|v| v.as_i64()).unwrap_or(1);
//!             let next = store.i64("value") + by;
//!             store.set("value", json!(next));
//!             json!(next)
//!         }),
//!     StoreOptions::default(),
//! );
//!
//! let store = counter.store();
//! assert_eq!(store.get("doubled"), json!(2));
//! store.call("add", vec![json!(4)]).unwrap();
//! assert_eq!(store.get("value"), json!(5));
//! assert_eq!(store.get("doubled"), json!(10));
//! ```
//!
//! # Bridging into an external store
//!
//! ```
//! use glint::{StoreDef, StoreOptions, StoreRegistry, SyncOptions};
//! use glint_depot::{Depot, MemoryDepot};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let registry = StoreRegistry::new();
//! let depot: Rc<MemoryDepot> = Rc::new(MemoryDepot::new());
//! registry.enable_sync(depot.clone(), SyncOptions::default());
//!
//! let counter = registry.define(
//!     StoreDef::new().state("value", json!(123)),
//!     StoreOptions::named("s"),
//! );
//! let store = counter.store();
//!
//! // The depot now holds the module; writes commit into it.
//! assert_eq!(depot.read_state("s.state.value"), json!(123));
//! store.set("value", json!(9));
//! assert_eq!(depot.read_state("s.state.value"), json!(9));
//! ```
//!
//! # Reactivity
//!
//! The reactive runtime is single-threaded and cooperative: reads track
//! dependencies synchronously, while effects (including the bridge's
//! outbound synchronization) run deferred. Call [`flush`] to run pending
//! effects; several synchronous mutations in one tick coalesce into at
//! most one run per effect.

mod access;
mod binding;
mod bridge;
mod error;
mod member;
mod path;
mod proxy;
mod registry;
mod store;
mod sync;

pub use access::{build_patch, get_at, read, write};
pub use error::{value_type_name, GlintError, GlintResult};
pub use member::{
    Declaration, MemberDescriptor, MemberGetter, MemberKind, MemberSetter, RawAction, StoreDef,
};
pub use path::{Path, Seg};
pub use proxy::{MergeOptions, ProxySetter, ValueProxy};
pub use registry::{
    IdSpec, MethodMap, ReaderMap, RefEntry, RefMap, StoreOptions, StoreRegistry, UseStore,
};
pub use store::{MemberSets, Store};
pub use sync::SyncOptions;

// Re-export serde_json::Value for convenience
pub use serde_json::Value;

/// Run every pending effect now.
///
/// Wraps the runtime's synchronous flush so embedders drive ticks without
/// depending on the reactive runtime directly.
pub fn flush() {
    spark_signals::flush_sync();
}
