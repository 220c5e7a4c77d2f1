//! The store registry and its accessor surface.
//!
//! A [`StoreRegistry`] is an explicit object owned by the embedding
//! application, holding every defined store by id along with the global
//! sync configuration. [`StoreRegistry::define`] synthesizes the live
//! instance once and hands back a [`UseStore`] accessor; the accessor is
//! the singleton gateway, and also the place the flattened extraction maps
//! ([`RefMap`], [`ReaderMap`], [`MethodMap`]) hang off.
//!
//! Stores live as long as the registry. There is no implicit teardown;
//! defining a fresh declaration at an existing id replaces the entry, and
//! the bridge's re-registration merge keeps the committed external state.

use crate::bridge;
use crate::error::{GlintError, GlintResult};
use crate::member::{Declaration, MemberKind, StoreDef};
use crate::store::Store;
use crate::sync::SyncOptions;
use glint_depot::Depot;
use serde_json::Value;
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// How a store id is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IdSpec {
    /// Next value of the registry counter, rendered as a string.
    #[default]
    Generated,
    /// Caller-chosen id. `/` separators nest the bridged module.
    Named(String),
    /// Generated id, and the store never bridges.
    Unbridged,
}

/// Options accepted by [`StoreRegistry::define`].
#[derive(Clone, Debug, Default)]
pub struct StoreOptions {
    /// Id selection, generated by default.
    pub id: IdSpec,
}

impl StoreOptions {
    /// Define under an explicit id.
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: IdSpec::Named(id.into()),
        }
    }

    /// Define a store that stays local even while sync is enabled.
    pub fn unbridged() -> Self {
        Self {
            id: IdSpec::Unbridged,
        }
    }
}

struct RegistryInner {
    stores: RefCell<HashMap<String, Store>>,
    next_id: Cell<u64>,
    depot: RefCell<Option<Rc<dyn Depot>>>,
}

impl RegistryInner {
    fn active_depot(&self) -> Option<Rc<dyn Depot>> {
        self.depot.borrow().clone()
    }
}

/// Registry of synthesized stores, cheaply clonable.
///
/// # Examples
///
/// ```
/// use glint::{StoreDef, StoreOptions, StoreRegistry, Value};
/// use serde_json::json;
///
/// let registry = StoreRegistry::new();
/// let todos = registry.define(
///     StoreDef::new()
///         .state("items", json!(["milk"]))
///         .action("add", |store, args| match store.proxy("items") {
///             Some(items) => json!(items.push(args).unwrap_or(0)),
///             None => Value::Null,
///         }),
///     StoreOptions::named("todos"),
/// );
///
/// let store = todos.store();
/// store.call("add", vec![json!("eggs")]).unwrap();
/// assert_eq!(store.get("items"), json!(["milk", "eggs"]));
/// ```
#[derive(Clone)]
pub struct StoreRegistry {
    inner: Rc<RegistryInner>,
}

impl StoreRegistry {
    /// Create an empty registry. Generated ids start at `"1"`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                stores: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
                depot: RefCell::new(None),
            }),
        }
    }

    /// Classify and synthesize a store, returning its accessor.
    ///
    /// The instance is created here, once; the accessor keeps returning it.
    /// Defining at an id that is already taken replaces the registry entry
    /// while earlier accessors keep their own instance. If sync is enabled
    /// and the store is eligible it bridges immediately.
    pub fn define(&self, declaration: impl Into<Declaration>, options: StoreOptions) -> UseStore {
        let (id, bridge_disabled) = match options.id {
            IdSpec::Generated => (self.allocate_id(), false),
            IdSpec::Named(id) => (id, false),
            IdSpec::Unbridged => (self.allocate_id(), true),
        };
        let def = declaration.into().into_def();
        let store = Store::synthesize(id.clone(), bridge_disabled, &def);

        if let Some(old) = self
            .inner
            .stores
            .borrow_mut()
            .insert(id.clone(), store.clone())
        {
            // The depot module stays; the fresh registration merges over it.
            old.set_link(None);
            debug!(store = %id, "replaced store definition");
        }

        if let Some(depot) = self.inner.active_depot() {
            bridge::ensure_registered(&store, &depot);
        }

        UseStore {
            inner: Rc::new(UseStoreInner {
                store,
                def,
                registry: self.inner.clone(),
                refs: OnceCell::new(),
                computed: OnceCell::new(),
            }),
        }
    }

    /// The current instance registered under `id`.
    ///
    /// Counts as an accessor call: an eligible unbridged store bridges
    /// before it is returned.
    pub fn instance(&self, id: &str) -> Option<Store> {
        let store = self.inner.stores.borrow().get(id).cloned()?;
        if let Some(depot) = self.inner.active_depot() {
            bridge::ensure_registered(&store, &depot);
        }
        Some(store)
    }

    /// Reference map for an instance held by this registry.
    ///
    /// Fails `MissingRegistryEntry` for anything this registry did not
    /// produce or no longer holds, including instances displaced by a
    /// redefinition.
    pub fn store_to_refs(&self, store: &Store) -> GlintResult<RefMap> {
        let registered = {
            let stores = self.inner.stores.borrow();
            stores.values().any(|candidate| candidate.ptr_eq(store))
        };
        if !registered {
            return Err(GlintError::missing_registry_entry(store.id()));
        }
        Ok(RefMap::build(store))
    }

    /// Reference map for the instance registered under `id`.
    pub fn refs_for_id(&self, id: &str) -> GlintResult<RefMap> {
        let store = self
            .inner
            .stores
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| GlintError::missing_registry_entry(id))?;
        Ok(RefMap::build(&store))
    }

    /// Turn on bridging into `depot`.
    ///
    /// Already-defined eligible stores bridge lazily, at their next
    /// accessor call.
    pub fn enable_sync(&self, depot: Rc<dyn Depot>, options: SyncOptions) {
        if options.disable_in_release && !cfg!(debug_assertions) {
            debug!("sync suppressed for release build");
            return;
        }
        *self.inner.depot.borrow_mut() = Some(depot);
        debug!("sync enabled");
    }

    /// Turn bridging off and detach every linked store.
    ///
    /// Each store pulls its mirrored state back into its local cells, so
    /// reads keep answering with the committed values. Depot modules stay
    /// registered for a later re-enable.
    pub fn disable_sync(&self) {
        *self.inner.depot.borrow_mut() = None;
        let stores: Vec<Store> = self.inner.stores.borrow().values().cloned().collect();
        for store in stores {
            bridge::unlink(&store);
        }
        debug!("sync disabled");
    }

    /// Whether a depot is currently configured.
    pub fn sync_enabled(&self) -> bool {
        self.inner.depot.borrow().is_some()
    }

    /// Drop every store, restart the id counter, clear sync configuration.
    pub fn reset(&self) {
        self.inner.stores.borrow_mut().clear();
        self.inner.next_id.set(1);
        *self.inner.depot.borrow_mut() = None;
    }

    fn allocate_id(&self) -> String {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        id.to_string()
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<String> = self.inner.stores.borrow().keys().cloned().collect();
        ids.sort();
        f.debug_struct("StoreRegistry")
            .field("stores", &ids)
            .field("sync_enabled", &self.sync_enabled())
            .finish()
    }
}

struct UseStoreInner {
    store: Store,
    def: StoreDef,
    registry: Rc<RegistryInner>,
    refs: OnceCell<Rc<RefMap>>,
    computed: OnceCell<Rc<ReaderMap>>,
}

/// Accessor for one defined store.
///
/// Every call to [`UseStore::store`] returns the same instance. The
/// extraction maps group members for external binding: [`UseStore::refs`]
/// per-member read/write entries, [`UseStore::map_computed`] zero-arg
/// readers, [`UseStore::map_methods`] bound invocations.
#[derive(Clone)]
pub struct UseStore {
    inner: Rc<UseStoreInner>,
}

impl UseStore {
    /// The singleton instance, bridging it first when eligible.
    pub fn store(&self) -> Store {
        if let Some(depot) = self.inner.registry.active_depot() {
            bridge::ensure_registered(&self.inner.store, &depot);
        }
        self.inner.store.clone()
    }

    /// The store's id.
    pub fn id(&self) -> &str {
        self.inner.store.id()
    }

    /// The declaration this store was synthesized from, for `extending`.
    pub fn definition(&self) -> &StoreDef {
        &self.inner.def
    }

    /// Flattened reference map over every member, built once and cached.
    pub fn refs(&self) -> Rc<RefMap> {
        self.inner
            .refs
            .get_or_init(|| Rc::new(RefMap::build(&self.store())))
            .clone()
    }

    /// State and getter keys as zero-arg readers, built once and cached.
    pub fn map_computed(&self) -> Rc<ReaderMap> {
        self.inner
            .computed
            .get_or_init(|| Rc::new(ReaderMap::build(&self.store())))
            .clone()
    }

    /// Action keys as bound invocations, rebuilt and re-bound per call.
    pub fn map_methods(&self) -> MethodMap {
        MethodMap::build(&self.store())
    }
}

impl fmt::Debug for UseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseStore").field("id", &self.id()).finish()
    }
}

/// One member's entry in a [`RefMap`]: a thin delegate to the live store.
pub struct RefEntry {
    store: Store,
    name: String,
    kind: MemberKind,
}

impl RefEntry {
    /// The member's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's classified kind.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Current value; actions read as `Null`.
    pub fn get(&self) -> Value {
        match self.kind {
            MemberKind::Action => Value::Null,
            _ => self.store.get(&self.name),
        }
    }

    /// Write through to the store. Non-writable members log and ignore.
    pub fn set(&self, value: Value) {
        self.store.set(&self.name, value);
    }

    /// Invoke an action member.
    pub fn call(&self, args: Vec<Value>) -> GlintResult<Value> {
        self.store.call(&self.name, args)
    }

    /// Whether [`RefEntry::set`] will take effect.
    pub fn is_writable(&self) -> bool {
        matches!(self.kind, MemberKind::State | MemberKind::Computed)
    }
}

impl fmt::Debug for RefEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Flattened per-member reference map, in declaration order.
pub struct RefMap {
    order: Vec<String>,
    entries: HashMap<String, RefEntry>,
}

impl RefMap {
    pub(crate) fn build(store: &Store) -> RefMap {
        let mut order = Vec::new();
        let mut entries = HashMap::new();
        for descriptor in store.descriptors() {
            order.push(descriptor.name.clone());
            entries.insert(
                descriptor.name.clone(),
                RefEntry {
                    store: store.clone(),
                    name: descriptor.name.clone(),
                    kind: descriptor.kind,
                },
            );
        }
        RefMap { order, entries }
    }

    /// Entry for one member.
    pub fn get(&self, name: &str) -> Option<&RefEntry> {
        self.entries.get(name)
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RefEntry)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|e| (name.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for RefMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefMap").field("names", &self.order).finish()
    }
}

/// State and getter keys mapped to zero-arg readers.
pub struct ReaderMap {
    order: Vec<String>,
    entries: HashMap<String, Rc<dyn Fn() -> Value>>,
}

impl ReaderMap {
    pub(crate) fn build(store: &Store) -> ReaderMap {
        let sets = store.member_sets();
        let mut order = Vec::new();
        let mut entries: HashMap<String, Rc<dyn Fn() -> Value>> = HashMap::new();
        for name in sets.state_keys.iter().chain(sets.getter_keys.iter()) {
            let store = store.clone();
            let key = name.clone();
            order.push(name.clone());
            entries.insert(name.clone(), Rc::new(move || store.get(&key)));
        }
        ReaderMap { order, entries }
    }

    /// Read one member now.
    pub fn read(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|reader| reader())
    }

    /// The reader itself, for handing to a binding layer.
    pub fn reader(&self, name: &str) -> Option<Rc<dyn Fn() -> Value>> {
        self.entries.get(name).cloned()
    }

    /// Covered member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for ReaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderMap").field("names", &self.order).finish()
    }
}

/// Action keys mapped to bound invocations.
pub struct MethodMap {
    order: Vec<String>,
    entries: HashMap<String, Rc<dyn Fn(Vec<Value>) -> Value>>,
}

impl MethodMap {
    pub(crate) fn build(store: &Store) -> MethodMap {
        let mut order = Vec::new();
        let mut entries: HashMap<String, Rc<dyn Fn(Vec<Value>) -> Value>> = HashMap::new();
        for name in &store.member_sets().action_keys {
            let store = store.clone();
            let key = name.clone();
            order.push(name.clone());
            entries.insert(
                name.clone(),
                Rc::new(move |args| store.call(&key, args).unwrap_or(Value::Null)),
            );
        }
        MethodMap { order, entries }
    }

    /// Invoke one action now.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Option<Value> {
        self.entries.get(name).map(|method| method(args))
    }

    /// The bound invocation itself.
    pub fn method(&self, name: &str) -> Option<Rc<dyn Fn(Vec<Value>) -> Value>> {
        self.entries.get(name).cloned()
    }

    /// Covered action names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for MethodMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMap").field("names", &self.order).finish()
    }
}
