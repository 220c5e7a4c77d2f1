//! Store declarations and member classification.
//!
//! A [`StoreDef`] declares the members of a store: plain state values,
//! derived getters, writable computed members, and actions. Definitions can
//! extend a parent definition; classification walks the chain most-derived
//! first, so an own member always wins over an inherited one of the same
//! name.

use crate::error::{GlintError, GlintResult, value_type_name};
use crate::store::Store;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Read body of a getter or computed member.
pub type MemberGetter = dyn Fn(&Store) -> Value;

/// Write body of a computed member.
pub type MemberSetter = dyn Fn(&Store, Value);

/// Body of an action member.
pub type RawAction = dyn Fn(&Store, Vec<Value>) -> Value;

/// How a member behaves once the store is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Plain data, readable and writable.
    State,
    /// Derived read-only value.
    Getter,
    /// Derived value with a declared setter.
    Computed,
    /// Invocable method.
    Action,
}

#[derive(Clone)]
pub(crate) enum Accessor {
    Value(Value),
    Get(Rc<MemberGetter>),
    GetSet(Rc<MemberGetter>, Rc<MemberSetter>),
    Invoke(Rc<RawAction>),
}

impl Accessor {
    fn kind(&self) -> MemberKind {
        match self {
            Accessor::Value(_) => MemberKind::State,
            Accessor::Get(_) => MemberKind::Getter,
            Accessor::GetSet(_, _) => MemberKind::Computed,
            Accessor::Invoke(_) => MemberKind::Action,
        }
    }
}

/// One classified member of a store.
#[derive(Clone)]
pub struct MemberDescriptor {
    /// Member name.
    pub name: String,
    /// Classified behavior.
    pub kind: MemberKind,
    pub(crate) accessor: Accessor,
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A store definition: named members, optionally extending a parent.
///
/// # Examples
///
/// ```
/// use glint::StoreDef;
/// use serde_json::json;
///
/// let base = StoreDef::new()
///     .state("count", json!(0))
///     .getter("doubled", |store| json!(store.i64("count") * 2));
///
/// let derived = StoreDef::extending(&base)
///     .state("count", json!(10));
/// ```
#[derive(Clone, Default)]
pub struct StoreDef {
    parent: Option<Rc<StoreDef>>,
    members: Vec<(String, Accessor)>,
}

impl StoreDef {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition that inherits every member of `parent`.
    pub fn extending(parent: &StoreDef) -> Self {
        Self {
            parent: Some(Rc::new(parent.clone())),
            members: Vec::new(),
        }
    }

    /// Declare a state member holding `value`.
    pub fn state(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((name.into(), Accessor::Value(value.into())));
        self
    }

    /// Declare a read-only getter.
    pub fn getter(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&Store) -> Value + 'static,
    ) -> Self {
        self.members.push((name.into(), Accessor::Get(Rc::new(get))));
        self
    }

    /// Declare a writable computed member.
    pub fn computed(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&Store) -> Value + 'static,
        set: impl Fn(&Store, Value) + 'static,
    ) -> Self {
        self.members
            .push((name.into(), Accessor::GetSet(Rc::new(get), Rc::new(set))));
        self
    }

    /// Declare an action.
    pub fn action(
        mut self,
        name: impl Into<String>,
        act: impl Fn(&Store, Vec<Value>) -> Value + 'static,
    ) -> Self {
        self.members
            .push((name.into(), Accessor::Invoke(Rc::new(act))));
        self
    }

    /// The parent definition, if this one extends another.
    pub fn parent(&self) -> Option<&StoreDef> {
        self.parent.as_deref()
    }

    /// Names declared directly on this definition, in declaration order.
    pub fn own_member_names(&self) -> Vec<String> {
        self.members.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Classify every member, walking own members before inherited ones.
    ///
    /// The first definition seen for a name wins, so overrides shadow the
    /// parent chain regardless of the kinds involved. Descriptor order is
    /// own declaration order followed by not-overridden inherited members.
    pub(crate) fn classify(&self) -> Vec<MemberDescriptor> {
        let mut seen: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(def) = current {
            for (name, accessor) in &def.members {
                if seen.iter().any(|s| s == name) {
                    continue;
                }
                seen.push(name);
                let kind = accessor.kind();
                debug!(member = %name, kind = ?kind, "classified member");
                out.push(MemberDescriptor {
                    name: name.clone(),
                    kind,
                    accessor: accessor.clone(),
                });
            }
            current = def.parent.as_deref();
        }
        out
    }
}

impl fmt::Debug for StoreDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDef")
            .field("members", &self.own_member_names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// What a caller hands to [`StoreRegistry::define`]: a ready definition, a
/// factory that builds one on demand, or plain data.
///
/// [`StoreRegistry::define`]: crate::StoreRegistry::define
pub enum Declaration {
    /// A definition built up front.
    Members(StoreDef),
    /// A definition built lazily, once, at synthesis time.
    Factory(Box<dyn FnOnce() -> StoreDef>),
}

impl Declaration {
    /// Wrap a definition factory.
    pub fn factory(f: impl FnOnce() -> StoreDef + 'static) -> Self {
        Declaration::Factory(Box::new(f))
    }

    /// Build a declaration from plain data: every key of an object becomes a
    /// state member. Anything but an object is rejected.
    pub fn from_value(value: Value) -> GlintResult<Self> {
        match value {
            Value::Object(map) => {
                let mut def = StoreDef::new();
                for (name, value) in map {
                    def = def.state(name, value);
                }
                Ok(Declaration::Members(def))
            }
            other => Err(GlintError::unsupported_declaration_shape(value_type_name(
                &other,
            ))),
        }
    }

    pub(crate) fn into_def(self) -> StoreDef {
        match self {
            Declaration::Members(def) => def,
            Declaration::Factory(build) => build(),
        }
    }
}

impl From<StoreDef> for Declaration {
    fn from(def: StoreDef) -> Self {
        Declaration::Members(def)
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Members(def) => f.debug_tuple("Members").field(def).finish(),
            Declaration::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}
