//! Capability-satisfaction matching.
//!
//! A capability is an object-safe trait a registered concrete type may
//! satisfy. Each binding declares its capability set at registration
//! (with an unsizing cast per capability), so matching is a
//! set-membership test instead of runtime type introspection.
//!
//! When an injection point targets a capability, the matcher scans all
//! bindings in unspecified order: name mismatches are skipped outright,
//! positive satisfaction checks are cached per (binding, capability),
//! and the first satisfying binding wins. Ambiguity among several
//! satisfying bindings is not detected.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use tracing::trace;

use crate::inject::Shared;
use crate::registry::{Binding, Registry};

/// Identifies a capability (a `dyn Trait` type) across the container.
///
/// # Examples
/// ```
/// use rabt_container::matcher::CapabilityId;
///
/// trait Worker { fn work(&self) -> String; }
///
/// let id = CapabilityId::of::<dyn Worker>();
/// assert!(id.name().contains("Worker"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// Creates the identifier for capability `C`.
    #[inline]
    pub fn of<C: ?Sized + Any>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    /// Returns the human-readable capability name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Identity is the TypeId; the stored name is display metadata.
impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One capability a concrete type declares, together with the cast that
/// turns the type-erased shared handle into a capability handle.
pub struct CapabilitySpec {
    id: CapabilityId,
    caster: Box<dyn Fn(&Rc<dyn Any>) -> Option<Box<dyn Any>>>,
}

impl CapabilitySpec {
    /// Declares that concrete type `T` satisfies capability `C`.
    ///
    /// The `coerce` function is the unsizing step and is always the
    /// identity closure `|value| value`; it exists so the compiler
    /// performs the `Shared<T>` → `Shared<C>` coercion where both types
    /// are known.
    ///
    /// # Examples
    /// ```
    /// use rabt_container::inject::Shared;
    /// use rabt_container::matcher::CapabilitySpec;
    ///
    /// trait Worker { fn work(&self) -> String; }
    /// struct Builder { work: String }
    /// impl Worker for Builder {
    ///     fn work(&self) -> String { self.work.clone() }
    /// }
    ///
    /// let spec = CapabilitySpec::of::<Builder, dyn Worker>(|value| value);
    /// assert!(spec.id().name().contains("Worker"));
    /// ```
    pub fn of<T: Any, C: ?Sized + Any>(coerce: fn(Shared<T>) -> Shared<C>) -> Self {
        Self {
            id: CapabilityId::of::<C>(),
            caster: Box::new(move |handle| {
                let concrete = handle.clone().downcast::<RefCell<T>>().ok()?;
                Some(Box::new(coerce(concrete)) as Box<dyn Any>)
            }),
        }
    }

    /// Returns the capability this spec declares.
    #[inline]
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// Casts a binding's erased handle into this capability's handle.
    ///
    /// Returns `None` when the handle does not hold the declaring
    /// concrete type; callers convert that into a typed error.
    pub(crate) fn cast(&self, handle: &Rc<dyn Any>) -> Option<Box<dyn Any>> {
        (self.caster)(handle)
    }
}

impl fmt::Debug for CapabilitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySpec").field("id", &self.id).finish()
    }
}

/// Scans the registry for the first binding satisfying `id`.
///
/// Bindings whose name differs from a required non-empty `name` are
/// skipped without a satisfaction check. Iteration order is unspecified.
pub(crate) fn find_by_capability(
    registry: &Registry,
    id: CapabilityId,
    name: &str,
) -> Option<Rc<Binding>> {
    for binding in registry.iter() {
        if !name.is_empty() && binding.name() != name {
            // Skip other checks if a name is required and it does not match.
            continue;
        }

        if satisfies(binding, id) {
            trace!(binding = %binding.key(), capability = %id, "capability matched");
            return Some(binding.clone());
        }
    }

    None
}

/// Checks whether a binding's concrete type satisfies a capability,
/// consulting the per-binding cache first and caching positives.
pub(crate) fn satisfies(binding: &Binding, id: CapabilityId) -> bool {
    if binding.satisfaction_cached(id) {
        trace!(binding = %binding.key(), capability = %id, "satisfaction cache hit");
        return true;
    }

    if binding.declares_capability(id) {
        binding.cache_satisfaction(id);
        return true;
    }

    false
}
