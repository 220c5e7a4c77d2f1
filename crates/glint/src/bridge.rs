//! Registration of stores as external store modules.
//!
//! Bridging turns a store into a module of a [`Depot`]: its state subtree
//! and per-member mutations are registered under the store's id, getters
//! become named derivations, actions become dispatchable, and outbound
//! effects keep the module current when local primitives change. Once the
//! link is up the external tree is the source of truth; reads indirect
//! through it and writes commit into it.

use crate::access;
use crate::path::Path;
use crate::store::{MirrorLink, Store};
use glint_depot::{CommitPayload, Depot, DepotError, DepotResult, ModuleDef};
use serde_json::{Map, Value};
use spark_signals::effect;
use std::rc::Rc;
use tracing::{debug, warn};

/// Register `store` as a module of `depot` and link it.
///
/// No-op when the store opted out of bridging or is already linked. When a
/// module already exists under the store's id, its committed state wins
/// over the local values key by key before the module is replaced.
pub(crate) fn ensure_registered(store: &Store, depot: &Rc<dyn Depot>) {
    if store.bridge_disabled() || store.is_bridged() {
        return;
    }

    let link = MirrorLink::new(depot.clone(), store.id());

    let prior = if depot.has_module(link.segs()) {
        let prior = depot.read_state(&link.state_root_path());
        if let Err(err) = depot.unregister_module(link.segs()) {
            warn!(store = %store.id(), error = %err, "failed to unregister stale module");
        }
        prior
    } else {
        Value::Null
    };

    let mut state = Map::new();
    for key in &store.member_sets().state_keys {
        let value = match prior.get(key.as_str()) {
            Some(committed) => {
                // The module's committed history outlives the declaration.
                store.reseed_state(key, committed.clone());
                committed.clone()
            }
            None => store.local_value(key),
        };
        state.insert(key.clone(), value);
    }

    let mut module_state = Map::new();
    module_state.insert("state".to_owned(), Value::Object(state));
    module_state.insert("getters".to_owned(), Value::Object(Map::new()));

    let mut module = ModuleDef::new(Value::Object(module_state));
    for key in &store.member_sets().state_keys {
        module = module.with_mutation(format!("set_state_{key}"), field_mutation("state", key));
    }
    for key in &store.member_sets().getter_keys {
        module = module.with_mutation(format!("set_getters_{key}"), field_mutation("getters", key));
        let weak = store.downgrade();
        let body_key = key.clone();
        module = module.with_getter(key.clone(), move || match Store::from_weak(&weak) {
            Some(store) => store.local_value(&body_key),
            None => Value::Null,
        });
    }
    for name in &store.member_sets().action_keys {
        let weak = store.downgrade();
        let body_name = name.clone();
        module = module.with_action(name.clone(), move |args| match Store::from_weak(&weak) {
            Some(store) => store.invoke_local(&body_name, args),
            None => Value::Null,
        });
    }

    if let Err(err) = depot.register_module(link.segs(), module) {
        warn!(store = %store.id(), error = %err, "module registration failed, store stays unbridged");
        return;
    }

    store.set_link(Some(link.clone()));
    install_effects(store, &link);
    debug!(store = %store.id(), "store bridged");
}

/// Detach a store from the external store.
///
/// The mirrored state is pulled back into the local cells first, so reads
/// keep answering with the committed history. The module itself stays
/// registered; a later re-link picks its state back up.
pub(crate) fn unlink(store: &Store) {
    let Some(link) = store.link() else {
        return;
    };
    for key in &store.member_sets().state_keys {
        store.reseed_state(key, link.read_state_key(key));
    }
    store.set_link(None);
    debug!(store = %store.id(), "store unbridged");
}

/// Mutation writing one member's field, whole or at a dotted sub-path.
fn field_mutation(
    field: &'static str,
    key: &str,
) -> impl Fn(&mut Value, &CommitPayload) -> DepotResult<()> + 'static {
    let name = format!("set_{field}_{key}");
    let base = Path::root().key(field).key(key);
    move |state, payload| {
        let target = match &payload.key {
            Some(sub) => base.join(&Path::parse(sub)),
            None => base.clone(),
        };
        access::write(state, &target, payload.value.clone())
            .map_err(|err| DepotError::mutation_failed(&name, err))
    }
}

/// Outbound sync: one effect per state and getter member.
///
/// Each effect reads the member's local primitive, which subscribes it to
/// every dependency down the tree, and commits the fresh value into the
/// module. Commit echoes settle on the depot's own change guard. Effects
/// from a torn-down link see a newer epoch and go quiet.
fn install_effects(store: &Store, link: &MirrorLink) {
    let epoch = store.link_epoch();
    let mut stops: Vec<Box<dyn FnOnce()>> = Vec::new();

    for key in store.member_sets().state_keys.clone() {
        let weak = store.downgrade();
        let link = link.clone();
        let stop = effect(move || {
            let Some(store) = Store::from_weak(&weak) else {
                return;
            };
            if store.link_epoch() != epoch {
                return;
            }
            let value = store.local_value(&key);
            link.commit_state_whole(&key, value);
        });
        stops.push(Box::new(stop));
    }

    for key in store.member_sets().getter_keys.clone() {
        let weak = store.downgrade();
        let link = link.clone();
        let stop = effect(move || {
            let Some(store) = Store::from_weak(&weak) else {
                return;
            };
            if store.link_epoch() != epoch {
                return;
            }
            let value = store.local_value(&key);
            link.commit_getter(&key, value);
        });
        stops.push(Box::new(stop));
    }

    store.retain_mirror_stops(stops);
}
