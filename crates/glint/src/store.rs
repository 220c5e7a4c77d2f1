//! The synthesized store instance.
//!
//! A [`Store`] is the live object produced from a [`StoreDef`]: every
//! classified member gets a reactive binding, and the instance carries the
//! side-table of member groups plus the optional mirror link to an external
//! store. Handles are cheap clones of one shared instance.

use crate::binding::Binding;
use crate::error::{GlintError, GlintResult};
use crate::member::{MemberDescriptor, MemberKind, StoreDef};
use crate::proxy::ValueProxy;
use glint_depot::{CommitPayload, Depot, DepotError};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::warn;

/// Member names grouped by behavior.
///
/// Computed members appear in both `getter_keys` and `writable_getters`.
#[derive(Clone, Debug, Default)]
pub struct MemberSets {
    /// State member names, in descriptor order.
    pub state_keys: Vec<String>,
    /// Getter and computed member names, in descriptor order.
    pub getter_keys: Vec<String>,
    /// Action member names, in descriptor order.
    pub action_keys: Vec<String>,
    /// The subset of `getter_keys` with a declared setter.
    pub writable_getters: Vec<String>,
}

/// Connection from a store to its module in the external store.
#[derive(Clone)]
pub(crate) struct MirrorLink {
    depot: Rc<dyn Depot>,
    segs: Vec<String>,
    dotted: String,
    slash: String,
}

impl MirrorLink {
    pub(crate) fn new(depot: Rc<dyn Depot>, id: &str) -> Self {
        let segs: Vec<String> = id.split('/').map(str::to_owned).collect();
        let dotted = segs.join(".");
        let slash = segs.join("/");
        Self {
            depot,
            segs,
            dotted,
            slash,
        }
    }

    pub(crate) fn segs(&self) -> &[String] {
        &self.segs
    }

    /// Dotted path to the module's state subtree.
    pub(crate) fn state_root_path(&self) -> String {
        format!("{}.state", self.dotted)
    }

    pub(crate) fn read_state_key(&self, key: &str) -> Value {
        self.depot
            .read_state(&format!("{}.state.{}", self.dotted, key))
    }

    pub(crate) fn read_getter_key(&self, key: &str) -> Value {
        self.depot
            .read_state(&format!("{}.getters.{}", self.dotted, key))
    }

    pub(crate) fn commit_state_whole(&self, key: &str, value: Value) {
        self.commit(
            &format!("{}/set_state_{}", self.slash, key),
            CommitPayload::whole(value),
        );
    }

    pub(crate) fn commit_state_at(&self, key: &str, sub_path: &str, value: Value) {
        self.commit(
            &format!("{}/set_state_{}", self.slash, key),
            CommitPayload::at(sub_path, value),
        );
    }

    pub(crate) fn commit_getter(&self, key: &str, value: Value) {
        self.commit(
            &format!("{}/set_getters_{}", self.slash, key),
            CommitPayload::whole(value),
        );
    }

    pub(crate) fn dispatch(&self, name: &str, args: Vec<Value>) -> Result<Value, DepotError> {
        self.depot
            .dispatch(&format!("{}/{}", self.slash, name), args)
    }

    /// Fire-and-forget commit; failures are logged, never propagated.
    fn commit(&self, mutation: &str, payload: CommitPayload) {
        if let Err(err) = self.depot.commit(mutation, payload) {
            warn!(mutation = %mutation, error = %err, "mirror commit failed");
        }
    }
}

pub(crate) struct StoreInner {
    id: String,
    bridge_disabled: bool,
    descriptors: Vec<MemberDescriptor>,
    bindings: RefCell<HashMap<String, Binding>>,
    sets: MemberSets,
    link: RefCell<Option<MirrorLink>>,
    /// Bumped on every link change; mirror effects from earlier links
    /// compare against it and go quiet.
    link_epoch: Cell<u64>,
    /// Stop functions for the current link's outbound effects.
    mirror_stops: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// A live store instance.
///
/// # Examples
///
/// ```
/// use glint::{StoreDef, StoreOptions, StoreRegistry};
/// use serde_json::json;
///
/// let registry = StoreRegistry::new();
/// let counter = registry.define(
///     StoreDef::new()
///         .state("count", json!(0))
///         .getter("doubled", |store| json!(store.i64("count") * 2)),
///     StoreOptions::default(),
/// );
///
/// let store = counter.store();
/// store.set("count", json!(3));
/// assert_eq!(store.get("doubled"), json!(6));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// Build the live instance for a definition.
    pub(crate) fn synthesize(id: impl Into<String>, bridge_disabled: bool, def: &StoreDef) -> Store {
        let descriptors = def.classify();
        let mut sets = MemberSets::default();
        for d in &descriptors {
            match d.kind {
                MemberKind::State => sets.state_keys.push(d.name.clone()),
                MemberKind::Getter => sets.getter_keys.push(d.name.clone()),
                MemberKind::Computed => {
                    sets.getter_keys.push(d.name.clone());
                    sets.writable_getters.push(d.name.clone());
                }
                MemberKind::Action => sets.action_keys.push(d.name.clone()),
            }
        }

        let store = Store {
            inner: Rc::new(StoreInner {
                id: id.into(),
                bridge_disabled,
                descriptors,
                bindings: RefCell::new(HashMap::new()),
                sets,
                link: RefCell::new(None),
                link_epoch: Cell::new(0),
                mirror_stops: RefCell::new(Vec::new()),
            }),
        };

        let mut bindings = HashMap::new();
        for descriptor in &store.inner.descriptors {
            bindings.insert(descriptor.name.clone(), Binding::build(descriptor, &store));
        }
        *store.inner.bindings.borrow_mut() = bindings;
        store
    }

    /// The store's id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Read a member's current value. Absent members and actions read as
    /// `Null`.
    pub fn get(&self, name: &str) -> Value {
        let bindings = self.inner.bindings.borrow();
        match bindings.get(name) {
            Some(binding) => binding.read(self),
            None => Value::Null,
        }
    }

    /// Write a member. Writes to getters, actions, and unknown names are
    /// logged and ignored.
    pub fn set(&self, name: &str, value: Value) {
        let bindings = self.inner.bindings.borrow();
        match bindings.get(name) {
            Some(binding) if binding.is_writable() => binding.write(self, value),
            Some(binding) => {
                warn!(member = %name, kind = ?binding.kind, "ignored write to non-writable member");
            }
            None => warn!(member = %name, "ignored write to unknown member"),
        }
    }

    /// Read a member deserialized into `T`.
    pub fn typed<T: serde::de::DeserializeOwned>(&self, name: &str) -> GlintResult<T> {
        Ok(serde_json::from_value(self.get(name))?)
    }

    /// Read a member as an integer, defaulting to 0.
    pub fn i64(&self, name: &str) -> i64 {
        self.get(name).as_i64().unwrap_or(0)
    }

    /// Deep mutation proxy over a container-valued member.
    ///
    /// `None` for actions, scalars, and unknown names. For unlinked state
    /// members the proxy is referentially stable until the member is
    /// reassigned; linked and derived members get a fresh proxy per call.
    pub fn proxy(&self, name: &str) -> Option<ValueProxy> {
        let bindings = self.inner.bindings.borrow();
        bindings.get(name).and_then(|binding| binding.proxy(self))
    }

    /// Invoke an action member.
    ///
    /// While linked the invocation dispatches through the external store,
    /// falling back to the local body if the dispatch fails. Non-action
    /// members error `NotInvocable`.
    pub fn call(&self, name: &str, args: Vec<Value>) -> GlintResult<Value> {
        match self.kind_of(name) {
            Some(MemberKind::Action) => {}
            _ => return Err(GlintError::not_invocable(name)),
        }
        if let Some(link) = self.link() {
            match link.dispatch(name, args.clone()) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(member = %name, error = %err, "bridge dispatch failed, invoking locally");
                }
            }
        }
        Ok(self.invoke_local(name, args))
    }

    /// The classified kind of a member.
    pub fn kind_of(&self, name: &str) -> Option<MemberKind> {
        let bindings = self.inner.bindings.borrow();
        bindings.get(name).map(|binding| binding.kind)
    }

    /// Member names grouped by behavior.
    pub fn member_sets(&self) -> &MemberSets {
        &self.inner.sets
    }

    /// Every member descriptor, own declarations first.
    pub fn descriptors(&self) -> &[MemberDescriptor] {
        &self.inner.descriptors
    }

    /// Whether two handles refer to the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the store is currently mirrored into an external store.
    pub fn is_bridged(&self) -> bool {
        self.inner.link.borrow().is_some()
    }

    pub(crate) fn bridge_disabled(&self) -> bool {
        self.inner.bridge_disabled
    }

    pub(crate) fn downgrade(&self) -> Weak<StoreInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_weak(weak: &Weak<StoreInner>) -> Option<Store> {
        weak.upgrade().map(|inner| Store { inner })
    }

    pub(crate) fn link(&self) -> Option<MirrorLink> {
        self.inner.link.borrow().clone()
    }

    pub(crate) fn set_link(&self, link: Option<MirrorLink>) {
        self.inner.link_epoch.set(self.inner.link_epoch.get() + 1);
        let stops: Vec<_> = self.inner.mirror_stops.borrow_mut().drain(..).collect();
        for stop in stops {
            stop();
        }
        *self.inner.link.borrow_mut() = link;
    }

    pub(crate) fn link_epoch(&self) -> u64 {
        self.inner.link_epoch.get()
    }

    /// Keep the stop functions of the link's outbound effects until the
    /// next link change.
    pub(crate) fn retain_mirror_stops(&self, stops: Vec<Box<dyn FnOnce()>>) {
        self.inner.mirror_stops.borrow_mut().extend(stops);
    }

    /// A member's local primitive value, ignoring any link.
    pub(crate) fn local_value(&self, name: &str) -> Value {
        let bindings = self.inner.bindings.borrow();
        match bindings.get(name) {
            Some(binding) => binding.local_value(),
            None => Value::Null,
        }
    }

    /// Overwrite a state member's local cell without committing outward.
    pub(crate) fn reseed_state(&self, name: &str, value: Value) {
        let bindings = self.inner.bindings.borrow();
        if let Some(binding) = bindings.get(name) {
            binding.reseed(value);
        }
    }

    /// Run an action body directly, bypassing bridge dispatch.
    pub(crate) fn invoke_local(&self, name: &str, args: Vec<Value>) -> Value {
        let invoke = {
            let bindings = self.inner.bindings.borrow();
            bindings.get(name).and_then(|binding| binding.invoke_handle())
        };
        match invoke {
            Some(invoke) => invoke(args),
            None => Value::Null,
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field(
                "members",
                &self
                    .inner
                    .descriptors
                    .iter()
                    .map(|d| d.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("bridged", &self.is_bridged())
            .finish()
    }
}
