//! Injection-point tables.
//!
//! Annotation-driven wiring is expressed as an explicit, per-type
//! table: every registrable type implements [`Injectable`] and returns
//! a [`TypeSpec`] describing its structural kind, its injection points
//! ([`FieldSpec`], in declaration order), and the capability set it
//! satisfies. Each field carries its raw annotation string, so callers
//! inspecting error text see the exact configuration fragment.
//!
//! Tables are normally generated with the [`injectable!`](crate::injectable)
//! macro; building a [`TypeSpec`] by hand stays possible for unusual
//! shapes (fields that cannot be assigned from outside their module,
//! by-value declarations, and the like).

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::key::ValueKind;
use crate::matcher::{CapabilityId, CapabilitySpec};

/// Shared handle to a registered value: `Rc<RefCell<T>>`.
///
/// This is the container's rendition of a pointer-like singleton —
/// shared ownership with in-place mutation, single-threaded by
/// construction.
pub type Shared<T: ?Sized> = Rc<RefCell<T>>;

/// A type the container can register and wire.
///
/// Implementations are normally generated by
/// [`injectable!`](crate::injectable).
pub trait Injectable: Any {
    /// Builds the injection-point table for this type.
    ///
    /// Called once per registration; the resulting table lives for the
    /// container's lifetime.
    fn type_spec() -> TypeSpec
    where
        Self: Sized;
}

/// What an injection point requires.
#[derive(Debug)]
pub enum FieldTarget {
    /// A shared handle to a concrete type, located by exact key lookup.
    Shared {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// A capability handle, located by the satisfaction matcher.
    Capability { id: CapabilityId },
    /// A plain by-value type; rejected at resolution time.
    Value { type_name: &'static str },
}

/// The value handed to a field setter after the dependency resolved.
pub(crate) enum ResolvedValue {
    Shared(Rc<dyn Any>),
    Capability(Box<dyn Any>),
}

type Setter = Box<dyn Fn(&Rc<dyn Any>, &ResolvedValue) -> bool>;

/// One field of a registrable type.
///
/// A field without an annotation is listed (if at all) for completeness
/// only and is never touched by resolution. A field with an annotation
/// but no setter is a declared injection point that cannot be assigned
/// from outside its declaring module.
pub struct FieldSpec {
    name: &'static str,
    tag: Option<&'static str>,
    target: Option<FieldTarget>,
    setter: Option<Setter>,
}

impl FieldSpec {
    /// An injection point holding a shared handle to concrete type `T`,
    /// declared on owner type `O` as an `Option<Shared<T>>` field.
    pub fn shared<O: Any, T: Any>(
        name: &'static str,
        tag: &'static str,
        access: fn(&mut O) -> &mut Option<Shared<T>>,
    ) -> Self {
        let setter: Setter = Box::new(move |owner, value| {
            let Some(cell) = owner.downcast_ref::<RefCell<O>>() else {
                return false;
            };
            let ResolvedValue::Shared(handle) = value else {
                return false;
            };
            let Ok(dependency) = handle.clone().downcast::<RefCell<T>>() else {
                return false;
            };
            *access(&mut cell.borrow_mut()) = Some(dependency);
            true
        });

        Self {
            name,
            tag: Some(tag),
            target: Some(FieldTarget::Shared {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
            }),
            setter: Some(setter),
        }
    }

    /// An injection point holding a capability handle, declared on owner
    /// type `O` as an `Option<Shared<C>>` field.
    pub fn capability<O: Any, C: ?Sized + Any>(
        name: &'static str,
        tag: &'static str,
        access: fn(&mut O) -> &mut Option<Shared<C>>,
    ) -> Self {
        let setter: Setter = Box::new(move |owner, value| {
            let Some(cell) = owner.downcast_ref::<RefCell<O>>() else {
                return false;
            };
            let ResolvedValue::Capability(boxed) = value else {
                return false;
            };
            let Some(dependency) = boxed.downcast_ref::<Shared<C>>() else {
                return false;
            };
            *access(&mut cell.borrow_mut()) = Some(dependency.clone());
            true
        });

        Self {
            name,
            tag: Some(tag),
            target: Some(FieldTarget::Capability {
                id: CapabilityId::of::<C>(),
            }),
            setter: Some(setter),
        }
    }

    /// A field without an annotation; never touched by resolution.
    pub fn untagged(name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            target: None,
            setter: None,
        }
    }

    /// A tagged field of type `T` that cannot be assigned from outside
    /// its declaring module. Resolution fails on it with an
    /// unexported-field error.
    pub fn unsettable<T: Any>(name: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            tag: Some(tag),
            target: Some(FieldTarget::Shared {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
            }),
            setter: None,
        }
    }

    /// A tagged field declared with a plain by-value type. Resolution
    /// fails on it with an invalid-value-kind error.
    pub fn by_value<T: Any>(name: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            tag: Some(tag),
            target: Some(FieldTarget::Value {
                type_name: type_name::<T>(),
            }),
            setter: None,
        }
    }

    /// The field identifier, as quoted in error messages.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The raw annotation content, `None` when the field carries none.
    #[inline]
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// The declared target, when the field is an injection point.
    #[inline]
    pub fn target(&self) -> Option<&FieldTarget> {
        self.target.as_ref()
    }

    /// Whether the field can be assigned externally.
    #[inline]
    pub(crate) fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    /// Assigns a resolved value into this field of `owner`.
    ///
    /// Returns `false` on any mismatch between the table and the actual
    /// handles; callers convert that into a typed error instead of
    /// letting a downcast panic escape.
    pub(crate) fn assign(&self, owner: &Rc<dyn Any>, value: &ResolvedValue) -> bool {
        match &self.setter {
            Some(setter) => setter(owner, value),
            None => false,
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("target", &self.target)
            .field("settable", &self.is_settable())
            .finish()
    }
}

/// The injection-point table of a registrable type.
///
/// Built once per registration, stored on the binding for the
/// container's lifetime.
pub struct TypeSpec {
    type_id: TypeId,
    type_name: &'static str,
    kind: ValueKind,
    fields: Vec<FieldSpec>,
    capabilities: Vec<CapabilitySpec>,
}

impl TypeSpec {
    /// Creates the table for concrete type `T`, registered as a shared
    /// handle, with no injection points and no capabilities.
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind: ValueKind::Shared,
            fields: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Overrides the declared structural kind.
    ///
    /// The registry rejects non-reference kinds; this exists for tables
    /// describing values the container must refuse.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Appends a field. Declaration order is resolution order.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a capability this type satisfies.
    pub fn provides(mut self, capability: CapabilitySpec) -> Self {
        self.capabilities.push(capability);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The field table, in declaration order.
    pub(crate) fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The declared capability spec for `id`, if any.
    pub(crate) fn capability(&self, id: CapabilityId) -> Option<&CapabilitySpec> {
        self.capabilities.iter().find(|c| c.id() == id)
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Generates an [`Injectable`] implementation from a field listing.
///
/// Three clauses are understood inside the braces:
/// - `inject <field>: <Type> = "<annotation>";` — a shared-handle
///   injection point; the field must be declared `Option<Shared<Type>>`.
/// - `inject <field>: dyn <Trait> = "<annotation>";` — a capability
///   injection point; the field must be declared
///   `Option<Shared<dyn Trait>>`.
/// - `provides dyn <Trait>;` — declares that this type satisfies the
///   capability.
/// - `skip <field>;` — lists a field that is not an injection point.
///
/// # Examples
/// ```
/// use rabt_container::prelude::*;
///
/// trait Worker { fn work(&self) -> String; }
///
/// struct Builder { work: String }
/// impl Worker for Builder {
///     fn work(&self) -> String { self.work.clone() }
/// }
///
/// #[derive(Default)]
/// struct Leaf { value: i32 }
///
/// #[derive(Default)]
/// struct Holder {
///     leaf: Option<Shared<Leaf>>,
///     worker: Option<Shared<dyn Worker>>,
/// }
///
/// injectable!(Leaf);
/// injectable! {
///     Builder {
///         provides dyn Worker;
///     }
/// }
/// injectable! {
///     Holder {
///         inject leaf: Leaf = "";
///         inject worker: dyn Worker = "";
///     }
/// }
/// ```
#[macro_export]
macro_rules! injectable {
    ($ty:ty) => {
        impl $crate::inject::Injectable for $ty {
            fn type_spec() -> $crate::inject::TypeSpec {
                $crate::inject::TypeSpec::of::<$ty>()
            }
        }
    };
    ($ty:ty { $($body:tt)* }) => {
        impl $crate::inject::Injectable for $ty {
            fn type_spec() -> $crate::inject::TypeSpec {
                $crate::__injectable_body!($crate::inject::TypeSpec::of::<$ty>(), $ty, $($body)*)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __injectable_body {
    ($spec:expr, $ty:ty,) => { $spec };
    ($spec:expr, $ty:ty, provides dyn $cap:path ; $($rest:tt)*) => {
        $crate::__injectable_body!(
            $spec.provides($crate::matcher::CapabilitySpec::of::<$ty, dyn $cap>(|value| value)),
            $ty, $($rest)*
        )
    };
    ($spec:expr, $ty:ty, inject $field:ident : dyn $cap:path = $tag:literal ; $($rest:tt)*) => {
        $crate::__injectable_body!(
            $spec.field($crate::inject::FieldSpec::capability::<$ty, dyn $cap>(
                stringify!($field),
                $tag,
                |owner| &mut owner.$field,
            )),
            $ty, $($rest)*
        )
    };
    ($spec:expr, $ty:ty, inject $field:ident : $dep:ty = $tag:literal ; $($rest:tt)*) => {
        $crate::__injectable_body!(
            $spec.field($crate::inject::FieldSpec::shared::<$ty, $dep>(
                stringify!($field),
                $tag,
                |owner| &mut owner.$field,
            )),
            $ty, $($rest)*
        )
    };
    ($spec:expr, $ty:ty, skip $field:ident ; $($rest:tt)*) => {
        $crate::__injectable_body!(
            $spec.field($crate::inject::FieldSpec::untagged(stringify!($field))),
            $ty, $($rest)*
        )
    };
}
