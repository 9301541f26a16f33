use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;

use crate::{Result, Symbol, Value};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// A lexical environment: bindings plus an optional parent.
///
/// Scopes belong to the host. Captures only read them and keep
/// references to them; a captured quote keeps its scope alive for as long
/// as the quote lives.
pub struct Scope {
    id: u64,
    label: Symbol,
    parent: Option<ScopeRef>,
    bindings: RwLock<HashMap<Symbol, Value>>,
}

/// Shared handle to a [`Scope`]. Equality is identity.
#[derive(Clone)]
pub struct ScopeRef(Arc<Scope>);

impl ScopeRef {
    fn create(label: &str, parent: Option<ScopeRef>) -> Self {
        Self(Arc::new(Scope {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            label: Symbol::new(label),
            parent,
            bindings: RwLock::new(HashMap::new()),
        }))
    }

    /// A fresh root scope labelled `global`.
    pub fn global() -> Self {
        Self::create("global", None)
    }

    pub fn root(label: &str) -> Self {
        Self::create(label, None)
    }

    /// A new scope whose lookups fall back to `self`.
    pub fn child(&self, label: &str) -> Self {
        Self::create(label, Some(self.clone()))
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn label(&self) -> &Symbol {
        &self.0.label
    }

    #[inline]
    pub fn parent(&self) -> Option<&ScopeRef> {
        self.0.parent.as_ref()
    }

    /// `self`, then each parent outwards.
    pub fn ancestors(&self) -> impl Iterator<Item = &ScopeRef> {
        std::iter::successors(Some(self), |scope| scope.parent())
    }

    /// Binds `name` in this scope, returning the previous local binding.
    pub fn define(&self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.bindings.write().insert(Symbol::new(name), value.into())
    }

    /// Binds a host function under `name`.
    pub fn define_builtin(
        &self,
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) {
        self.define(name, Value::builtin(name, func));
    }

    pub fn get_local(&self, name: &Symbol) -> Option<Value> {
        self.0.bindings.read().get(name).cloned()
    }

    #[inline]
    pub fn binds_locally(&self, name: &Symbol) -> bool {
        self.0.bindings.read().contains_key(name)
    }

    /// Looks `name` up through the parent chain.
    pub fn lookup(&self, name: &Symbol) -> Option<Value> {
        self.ancestors().find_map(|scope| scope.get_local(name))
    }

    /// The nearest scope in the chain that binds `name`.
    pub fn holder(&self, name: &Symbol) -> Option<&ScopeRef> {
        self.ancestors().find(|scope| scope.binds_locally(name))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ScopeRef {}

// Bindings are not printed: they may hold quotes that point back here.
impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<scope#{} {}>", self.0.id, self.0.label)
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
