//! Live reactive bindings behind store members.
//!
//! One [`Binding`] backs each classified member. The same binding serves
//! both consistency models: while the store is unlinked it reads and writes
//! its own local primitives, and once a mirror link exists reads indirect
//! through the external store and writes commit outward. Which path runs is
//! decided per call from the store's current link, never baked in at
//! synthesis time.

use crate::access::is_container;
use crate::member::{Accessor, MemberDescriptor, MemberGetter, MemberKind, MemberSetter};
use crate::proxy::ValueProxy;
use crate::store::{MirrorLink, Store};
use serde_json::Value;
use spark_signals::{Derived, Signal, derived, signal};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

pub(crate) struct Binding {
    pub(crate) kind: MemberKind,
    name: String,
    /// Local cell for state members.
    cell: Option<Signal<Value>>,
    /// Memoized local evaluation for getter and computed members.
    inner: Option<Derived<Value>>,
    /// Declared setter for computed members.
    setter: Option<Rc<MemberSetter>>,
    /// Receiver-bound body for action members.
    invoke: Option<Rc<dyn Fn(Vec<Value>) -> Value>>,
    /// Cached deep proxy, used for unlinked state members only.
    wrap: RefCell<Option<ValueProxy>>,
}

impl Binding {
    /// Install the live primitive for one descriptor.
    ///
    /// Derived and action bodies close over a weak handle to the store, so
    /// a binding never keeps its own store alive. A dead store reads as
    /// `Null`.
    pub(crate) fn build(descriptor: &MemberDescriptor, store: &Store) -> Binding {
        let name = descriptor.name.clone();
        match &descriptor.accessor {
            Accessor::Value(value) => Binding {
                kind: MemberKind::State,
                name,
                // Seeded with a copy, never the declared value itself.
                cell: Some(signal(value.clone())),
                inner: None,
                setter: None,
                invoke: None,
                wrap: RefCell::new(None),
            },
            Accessor::Get(get) => Self::derived_binding(MemberKind::Getter, name, get, None, store),
            Accessor::GetSet(get, set) => {
                Self::derived_binding(MemberKind::Computed, name, get, Some(set.clone()), store)
            }
            Accessor::Invoke(act) => {
                let weak = store.downgrade();
                let act = act.clone();
                Binding {
                    kind: MemberKind::Action,
                    name,
                    cell: None,
                    inner: None,
                    setter: None,
                    invoke: Some(Rc::new(move |args| match Store::from_weak(&weak) {
                        Some(store) => act(&store, args),
                        None => Value::Null,
                    })),
                    wrap: RefCell::new(None),
                }
            }
        }
    }

    fn derived_binding(
        kind: MemberKind,
        name: String,
        get: &Rc<MemberGetter>,
        setter: Option<Rc<MemberSetter>>,
        store: &Store,
    ) -> Binding {
        let weak = store.downgrade();
        let get = get.clone();
        let inner = derived(move || match Store::from_weak(&weak) {
            Some(store) => get(&store),
            None => Value::Null,
        });
        Binding {
            kind,
            name,
            cell: None,
            inner: Some(inner),
            setter,
            invoke: None,
            wrap: RefCell::new(None),
        }
    }

    /// Current value, honoring the store's link.
    ///
    /// Linked state reads come from the external store. Linked getter and
    /// computed reads prefer the mirrored value and fall back to the local
    /// evaluation until the mirror has been primed by its first effect run.
    /// Actions read as `Null`.
    pub(crate) fn read(&self, store: &Store) -> Value {
        match self.kind {
            MemberKind::State => {
                if let Some(link) = store.link() {
                    // Touch the local cell as well. Writes keep it in step,
                    // so tracking it keeps derived members fresh across an
                    // unlink.
                    if let Some(cell) = &self.cell {
                        let _ = cell.get();
                    }
                    return link.read_state_key(&self.name);
                }
                match &self.cell {
                    Some(cell) => cell.get(),
                    None => Value::Null,
                }
            }
            MemberKind::Getter | MemberKind::Computed => {
                if let Some(link) = store.link() {
                    let mirrored = link.read_getter_key(&self.name);
                    if !mirrored.is_null() {
                        return mirrored;
                    }
                }
                self.local_value()
            }
            MemberKind::Action => Value::Null,
        }
    }

    /// The local primitive's value, ignoring any link.
    ///
    /// Outbound mirror effects read through this so they track local
    /// dependencies instead of their own mirrored output.
    pub(crate) fn local_value(&self) -> Value {
        if let Some(inner) = &self.inner {
            return inner.get();
        }
        if let Some(cell) = &self.cell {
            return cell.get();
        }
        Value::Null
    }

    pub(crate) fn is_writable(&self) -> bool {
        matches!(self.kind, MemberKind::State | MemberKind::Computed)
    }

    /// Replace the member's value.
    ///
    /// State writes commit the whole value outward when linked and always
    /// refresh the local cell. Computed writes run the declared setter,
    /// whatever that setter touches.
    pub(crate) fn write(&self, store: &Store, value: Value) {
        match self.kind {
            MemberKind::State => {
                self.wrap.borrow_mut().take();
                if let Some(link) = store.link() {
                    link.commit_state_whole(&self.name, value.clone());
                }
                if let Some(cell) = &self.cell {
                    cell.set(value);
                }
            }
            MemberKind::Computed => {
                if let Some(setter) = &self.setter {
                    setter(store, value);
                }
            }
            // Guarded by the caller.
            MemberKind::Getter | MemberKind::Action => {}
        }
    }

    /// Overwrite the local cell without committing. Used when the external
    /// store is the fresher copy (registration merge, unlink).
    pub(crate) fn reseed(&self, value: Value) {
        if let Some(cell) = &self.cell {
            self.wrap.borrow_mut().take();
            cell.set(value);
        }
    }

    /// Deep mutation proxy over the member's current value.
    ///
    /// `None` for actions and for members whose value is not a container.
    /// Unlinked state proxies are cached until the member is reassigned;
    /// everything else is built fresh per call.
    pub(crate) fn proxy(&self, store: &Store) -> Option<ValueProxy> {
        match self.kind {
            MemberKind::State => {
                if let Some(link) = store.link() {
                    return self.remote_state_proxy(&link);
                }
                if let Some(existing) = self.wrap.borrow().as_ref() {
                    return Some(existing.clone());
                }
                let cell = self.cell.clone()?;
                let value = cell.get();
                if !is_container(&value) {
                    return None;
                }
                let writeback = cell.clone();
                let built = ValueProxy::wrap_observed(
                    value,
                    Rc::new(move |_slot, root| {
                        writeback.set(root.clone());
                    }),
                )
                .ok()?;
                *self.wrap.borrow_mut() = Some(built.clone());
                Some(built)
            }
            MemberKind::Getter => {
                let value = self.read(store);
                if !is_container(&value) {
                    return None;
                }
                let name = self.name.clone();
                ValueProxy::wrap_observed(
                    value,
                    Rc::new(move |_slot, _root| {
                        warn!(member = %name, "discarded write through read-only getter proxy");
                    }),
                )
                .ok()
            }
            MemberKind::Computed => {
                let value = self.read(store);
                if !is_container(&value) {
                    return None;
                }
                let setter = self.setter.clone()?;
                let weak = store.downgrade();
                // Deep writes hand the whole patched value to the declared
                // setter, so state behind the computed actually updates.
                ValueProxy::wrap_observed(
                    value,
                    Rc::new(move |_slot, root| {
                        if let Some(store) = Store::from_weak(&weak) {
                            setter(&store, root.clone());
                        }
                    }),
                )
                .ok()
            }
            MemberKind::Action => None,
        }
    }

    fn remote_state_proxy(&self, link: &MirrorLink) -> Option<ValueProxy> {
        let value = link.read_state_key(&self.name);
        if !is_container(&value) {
            return None;
        }
        let link = link.clone();
        let key = self.name.clone();
        ValueProxy::wrap_with_setter(
            value,
            Rc::new(move |path, slot| {
                if path.is_empty() {
                    link.commit_state_whole(&key, slot);
                } else {
                    link.commit_state_at(&key, path, slot);
                }
            }),
        )
        .ok()
    }

    pub(crate) fn invoke_handle(&self) -> Option<Rc<dyn Fn(Vec<Value>) -> Value>> {
        self.invoke.clone()
    }
}
