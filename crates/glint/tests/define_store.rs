//! Tests for store definition, classification, and the accessor surface.

use glint::{Declaration, GlintError, MemberKind, StoreDef, StoreOptions, StoreRegistry, Value};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// Test declarations
// ============================================================================

fn counter_def() -> StoreDef {
    StoreDef::new()
        .state("value", json!(1))
        .state("profile", json!({"name": "ada", "tags": ["x"]}))
        .getter("doubled", |store| json!(store.i64("value") * 2))
        .computed(
            "next",
            |store| json!(store.i64("value") + 1),
            |store, v| {
                let n = v.as_i64().unwrap_or(0);
                store.set("value", json!(n - 1));
            },
        )
        .action("add", |store, args| {
            let by = args.first().and_then(Value::as_i64).unwrap_or(1);
            let next = store.i64("value") + by;
            store.set("value", json!(next));
            json!(next)
        })
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_member_kinds() {
    let registry = StoreRegistry::new();
    let store = registry.define(counter_def(), StoreOptions::default()).store();

    assert_eq!(store.kind_of("value"), Some(MemberKind::State));
    assert_eq!(store.kind_of("profile"), Some(MemberKind::State));
    assert_eq!(store.kind_of("doubled"), Some(MemberKind::Getter));
    assert_eq!(store.kind_of("next"), Some(MemberKind::Computed));
    assert_eq!(store.kind_of("add"), Some(MemberKind::Action));
    assert_eq!(store.kind_of("missing"), None);

    let sets = store.member_sets();
    assert_eq!(sets.state_keys, vec!["value", "profile"]);
    assert_eq!(sets.getter_keys, vec!["doubled", "next"]);
    assert_eq!(sets.writable_getters, vec!["next"]);
    assert_eq!(sets.action_keys, vec!["add"]);
}

#[test]
fn test_classification_is_stable_across_operations() {
    let registry = StoreRegistry::new();
    let store = registry.define(counter_def(), StoreOptions::default()).store();

    let kinds: Vec<_> = ["value", "doubled", "next", "add"]
        .iter()
        .map(|name| store.kind_of(name))
        .collect();

    store.set("value", json!(10));
    store.set("next", json!(5));
    store.call("add", vec![json!(2)]).unwrap();
    let _ = store.proxy("profile");

    for (name, before) in ["value", "doubled", "next", "add"].iter().zip(kinds) {
        assert_eq!(store.kind_of(name), before);
    }
}

#[test]
fn test_override_takes_most_derived_and_skips_base() {
    let base_runs = Rc::new(Cell::new(0usize));
    let seen = base_runs.clone();
    let base = StoreDef::new()
        .state("value", json!(1))
        .getter("label", move |_store| {
            seen.set(seen.get() + 1);
            json!("base")
        });

    let derived = StoreDef::extending(&base)
        .getter("label", |_store| json!("derived"))
        .state("extra", json!(true));

    let registry = StoreRegistry::new();
    let store = registry.define(derived, StoreOptions::default()).store();

    assert_eq!(store.get("label"), json!("derived"));
    assert_eq!(store.get("label"), json!("derived"));
    assert_eq!(base_runs.get(), 0);

    // Inherited members that were not overridden still resolve.
    assert_eq!(store.get("value"), json!(1));
    assert_eq!(store.kind_of("extra"), Some(MemberKind::State));
}

#[test]
fn test_extending_through_definition_accessor() {
    let registry = StoreRegistry::new();
    let base = registry.define(counter_def(), StoreOptions::default());

    let extended = registry.define(
        StoreDef::extending(base.definition()).getter("tripled", |store| {
            json!(store.i64("value") * 3)
        }),
        StoreOptions::default(),
    );
    let store = extended.store();

    assert_eq!(store.get("tripled"), json!(3));
    assert_eq!(store.get("doubled"), json!(2));
    store.set("value", json!(4));
    assert_eq!(store.get("tripled"), json!(12));
}

// ============================================================================
// Declaration shapes
// ============================================================================

#[test]
fn test_value_declaration_is_all_state() {
    let registry = StoreRegistry::new();
    let declaration = Declaration::from_value(json!({"a": 1, "b": [2, 3]})).unwrap();
    let store = registry.define(declaration, StoreOptions::default()).store();

    assert_eq!(store.kind_of("a"), Some(MemberKind::State));
    assert_eq!(store.kind_of("b"), Some(MemberKind::State));
    store.set("a", json!(9));
    assert_eq!(store.get("a"), json!(9));
}

#[test]
fn test_non_object_value_declaration_is_rejected() {
    let err = Declaration::from_value(json!(5)).unwrap_err();
    assert!(matches!(
        err,
        GlintError::UnsupportedDeclarationShape { .. }
    ));
    assert!(Declaration::from_value(json!("text")).is_err());
    assert!(Declaration::from_value(json!([1, 2])).is_err());
    assert!(Declaration::from_value(json!(null)).is_err());
}

#[test]
fn test_factory_declaration_runs_once_at_definition() {
    let built = Rc::new(Cell::new(0usize));
    let seen = built.clone();
    let declaration = Declaration::factory(move || {
        seen.set(seen.get() + 1);
        StoreDef::new().state("n", json!(7))
    });
    assert_eq!(built.get(), 0);

    let registry = StoreRegistry::new();
    let accessor = registry.define(declaration, StoreOptions::default());
    assert_eq!(built.get(), 1);

    accessor.store();
    accessor.store();
    assert_eq!(built.get(), 1);
    assert_eq!(accessor.store().get("n"), json!(7));
}

// ============================================================================
// Memoization and identity
// ============================================================================

#[test]
fn test_getter_memoized_until_dependency_changes() {
    let runs = Rc::new(Cell::new(0usize));
    let seen = runs.clone();
    let registry = StoreRegistry::new();
    let store = registry
        .define(
            StoreDef::new()
                .state("value", json!(1))
                .getter("doubled", move |store| {
                    seen.set(seen.get() + 1);
                    json!(store.i64("value") * 2)
                }),
            StoreOptions::default(),
        )
        .store();

    assert_eq!(store.get("doubled"), json!(2));
    assert_eq!(store.get("doubled"), json!(2));
    assert_eq!(store.get("doubled"), json!(2));
    assert_eq!(runs.get(), 1);

    store.set("value", json!(3));
    glint::flush();
    assert_eq!(store.get("doubled"), json!(6));
    assert_eq!(store.get("doubled"), json!(6));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_accessor_returns_reference_equal_instances() {
    let registry = StoreRegistry::new();
    let counter = registry.define(counter_def(), StoreOptions::default());
    assert!(counter.store().ptr_eq(&counter.store()));
}

// ============================================================================
// Deep proxies on an unbridged store
// ============================================================================

#[test]
fn test_proxy_reference_stable_until_reassignment() {
    let registry = StoreRegistry::new();
    let store = registry.define(counter_def(), StoreOptions::default()).store();

    let first = store.proxy("profile").unwrap();
    let second = store.proxy("profile").unwrap();
    assert!(first.ptr_eq(&second));

    store.set("profile", json!({"name": "grace", "tags": []}));
    let third = store.proxy("profile").unwrap();
    assert!(!third.ptr_eq(&first));
}

#[test]
fn test_proxy_deep_write_feeds_getters() {
    let registry = StoreRegistry::new();
    let store = registry
        .define(
            StoreDef::new()
                .state("profile", json!({"name": "ada", "tags": ["x"]}))
                .getter("greeting", |store| {
                    let name = store.get("profile")["name"].clone();
                    json!(format!("hi {}", name.as_str().unwrap_or("?")))
                }),
            StoreOptions::default(),
        )
        .store();

    assert_eq!(store.get("greeting"), json!("hi ada"));

    let profile = store.proxy("profile").unwrap();
    profile.set("name", json!("grace")).unwrap();
    glint::flush();
    assert_eq!(store.get("greeting"), json!("hi grace"));

    let tags = profile.child("tags").unwrap();
    tags.push(vec![json!("y")]).unwrap();
    assert_eq!(store.get("profile")["tags"], json!(["x", "y"]));
}

// ============================================================================
// Computed members
// ============================================================================

#[test]
fn test_computed_reads_and_writes_roundtrip() {
    let registry = StoreRegistry::new();
    let store = registry.define(counter_def(), StoreOptions::default()).store();

    assert_eq!(store.get("next"), json!(2));
    store.set("next", json!(400));
    assert_eq!(store.get("value"), json!(399));
    assert_eq!(store.get("next"), json!(400));
}

// ============================================================================
// Extraction maps
// ============================================================================

#[test]
fn test_refs_expose_every_member_as_entries() {
    let registry = StoreRegistry::new();
    let counter = registry.define(counter_def(), StoreOptions::default());
    let refs = counter.refs();

    assert_eq!(
        refs.names().collect::<Vec<_>>(),
        vec!["value", "profile", "doubled", "next", "add"]
    );

    let value = refs.get("value").unwrap();
    value.set(json!(10));
    assert_eq!(value.get(), json!(10));
    assert_eq!(refs.get("doubled").unwrap().get(), json!(20));

    let next = refs.get("next").unwrap();
    assert!(next.is_writable());
    next.set(json!(5));
    assert_eq!(counter.store().get("value"), json!(4));

    let add = refs.get("add").unwrap();
    assert_eq!(add.get(), Value::Null);
    assert_eq!(add.call(vec![json!(6)]).unwrap(), json!(10));

    let kinds: Vec<_> = refs.iter().map(|(name, entry)| (name, entry.kind())).collect();
    assert_eq!(kinds.len(), refs.len());
    assert_eq!(kinds[0], ("value", MemberKind::State));

    // Same cached map on every call.
    assert!(Rc::ptr_eq(&refs, &counter.refs()));
}

#[test]
fn test_grouped_extraction_maps() {
    let registry = StoreRegistry::new();
    let counter = registry.define(counter_def(), StoreOptions::default());

    let computed = counter.map_computed();
    assert_eq!(
        computed.names().collect::<Vec<_>>(),
        vec!["value", "profile", "doubled", "next"]
    );
    assert_eq!(computed.read("doubled"), Some(json!(2)));
    assert_eq!(computed.read("add"), None);

    let methods = counter.map_methods();
    assert_eq!(methods.names().collect::<Vec<_>>(), vec!["add"]);
    assert_eq!(methods.invoke("add", vec![json!(2)]), Some(json!(3)));

    // Methods are re-bound per call and see the fresh state.
    let methods_again = counter.map_methods();
    assert_eq!(methods_again.invoke("add", vec![json!(1)]), Some(json!(4)));

    let bound = methods_again.method("add").unwrap();
    assert_eq!(bound(vec![json!(5)]), json!(9));
}

#[test]
fn test_store_to_refs_rejects_foreign_and_displaced_instances() {
    let registry = StoreRegistry::new();
    let first = registry.define(counter_def(), StoreOptions::named("s"));
    let first_store = first.store();
    assert!(registry.store_to_refs(&first_store).is_ok());

    // Redefining displaces the old instance from the registry.
    registry.define(counter_def(), StoreOptions::named("s"));
    let err = registry.store_to_refs(&first_store).unwrap_err();
    assert!(matches!(err, GlintError::MissingRegistryEntry { .. }));

    // A store from a different registry is never accepted.
    let other = StoreRegistry::new();
    let foreign = other.define(counter_def(), StoreOptions::named("t")).store();
    assert!(registry.store_to_refs(&foreign).is_err());
    assert!(other.store_to_refs(&foreign).is_ok());

    assert!(registry.refs_for_id("s").is_ok());
    assert!(registry.refs_for_id("gone").is_err());
}
