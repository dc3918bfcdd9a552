//! Binding registry — stores one binding per derived key.
//!
//! Bindings are created at registration and never removed; resolution
//! mutates them in place (field assignment, resolution marker, the
//! capability-satisfaction cache). Iteration order over bindings is
//! unspecified and must not be relied upon.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use rabt_support::rendering::shorten_type_name;

use crate::error::{RabtError, Result};
use crate::inject::TypeSpec;
use crate::key::BindingKey;
use crate::matcher::CapabilityId;

/// Resolution marker per binding.
///
/// `Resolving` is set before a binding's fields are walked; re-entry
/// while in that state is a cyclic edge and short-circuits, so cycles
/// terminate and the edge is satisfied with the in-progress instance.
/// Failure demotes the marker back to `Unresolved`, keeping retries
/// possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolveState {
    Unresolved,
    Resolving,
    Resolved,
}

/// A registered value plus its derived identity, type table, resolution
/// marker, and capability-satisfaction cache.
pub(crate) struct Binding {
    key: BindingKey,
    name: String,
    handle: Rc<dyn Any>,
    spec: TypeSpec,
    state: Cell<ResolveState>,
    satisfied: RefCell<HashMap<CapabilityId, bool>>,
}

impl Binding {
    pub(crate) fn new(key: BindingKey, name: String, handle: Rc<dyn Any>, spec: TypeSpec) -> Self {
        Self {
            key,
            name,
            handle,
            spec,
            state: Cell::new(ResolveState::Unresolved),
            satisfied: RefCell::new(HashMap::new()),
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &BindingKey {
        &self.key
    }

    /// The disambiguating name; empty for unnamed bindings.
    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// The type-erased shared handle to the registered value.
    #[inline]
    pub(crate) fn handle(&self) -> &Rc<dyn Any> {
        &self.handle
    }

    #[inline]
    pub(crate) fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    #[inline]
    pub(crate) fn state(&self) -> ResolveState {
        self.state.get()
    }

    #[inline]
    pub(crate) fn set_state(&self, state: ResolveState) {
        self.state.set(state);
    }

    /// Short display name used for error breadcrumbs.
    pub(crate) fn short_name(&self) -> String {
        shorten_type_name(self.spec.type_name())
    }

    pub(crate) fn declares_capability(&self, id: CapabilityId) -> bool {
        self.spec.capability(id).is_some()
    }

    pub(crate) fn satisfaction_cached(&self, id: CapabilityId) -> bool {
        self.satisfied.borrow().get(&id).copied().unwrap_or(false)
    }

    pub(crate) fn cache_satisfaction(&self, id: CapabilityId) {
        self.satisfied.borrow_mut().insert(id, true);
    }

    /// Casts this binding's handle to a declared capability handle.
    pub(crate) fn cast_capability(&self, id: CapabilityId) -> Option<Box<dyn Any>> {
        self.spec.capability(id)?.cast(&self.handle)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key.to_string())
            .field("state", &self.state.get())
            .finish()
    }
}

/// Maps binding keys to bindings, enforcing key uniqueness.
#[derive(Default)]
pub(crate) struct Registry {
    bindings: HashMap<BindingKey, Rc<Binding>>,
}

impl Registry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Inserts a binding.
    ///
    /// # Errors
    /// Returns [`RabtError::DuplicateRegistration`] when the derived key
    /// already exists.
    pub(crate) fn insert(&mut self, binding: Binding) -> Result<()> {
        let key = binding.key().clone();

        if self.bindings.contains_key(&key) {
            return Err(RabtError::DuplicateRegistration {
                key: key.to_string(),
            });
        }

        debug!(key = %key, "registered dependency");
        self.bindings.insert(key, Rc::new(binding));
        Ok(())
    }

    /// Looks up a binding by exact key.
    pub(crate) fn get(&self, key: &BindingKey) -> Option<&Rc<Binding>> {
        self.bindings.get(key)
    }

    /// Iterates over all bindings, in unspecified order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rc<Binding>> {
        self.bindings.values()
    }

    /// Returns the number of registered bindings.
    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}
