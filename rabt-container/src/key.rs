//! Binding identification keys.
//!
//! [`BindingKey`] uniquely identifies a binding within the container.
//! It combines a [`TypeId`] with the structural kind of the registered
//! value and an optional name for named bindings.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Structural kind of a registered value or injection target.
///
/// The container only wires reference-like values: shared handles to
/// concrete types and capability (trait object) handles. `Value` exists
/// so that hand-rolled type tables declaring a by-value dependency are
/// rejected with a typed error instead of being silently accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A shared handle to a concrete type (`Shared<T>`).
    Shared,
    /// A capability handle (`Shared<dyn Trait>`).
    Capability,
    /// A plain by-value type; never accepted by the registry.
    Value,
}

impl ValueKind {
    /// Returns `true` for the kinds the container can wire.
    #[inline]
    pub fn is_reference(self) -> bool {
        !matches!(self, ValueKind::Value)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Shared => write!(f, "shared"),
            ValueKind::Capability => write!(f, "capability"),
            ValueKind::Value => write!(f, "value"),
        }
    }
}

/// Uniquely identifies a binding in the container.
///
/// Identity is the combination of the Rust type ([`TypeId`]), the
/// structural kind, and an optional name: two registrations of the same
/// type differing only by name are distinct and both legal.
///
/// The [`Display`](fmt::Display) form is the textual derived key
/// (`<type>-<kind>[-<name>]`) quoted by duplicate-registration errors.
///
/// # Examples
/// ```
/// use rabt_container::key::{BindingKey, ValueKind};
///
/// let unnamed = BindingKey::of::<String>();
/// let named = BindingKey::named::<String>("primary");
/// assert_ne!(unnamed, named);
/// assert_eq!(named.name(), Some("primary"));
/// assert_eq!(named.kind(), ValueKind::Shared);
/// ```
#[derive(Debug, Clone)]
pub struct BindingKey {
    type_id: TypeId,
    type_name: &'static str,
    kind: ValueKind,
    name: String,
}

impl BindingKey {
    /// Creates a key from its raw ingredients.
    pub fn new(
        type_id: TypeId,
        type_name: &'static str,
        kind: ValueKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            kind,
            name: name.into(),
        }
    }

    /// Creates an unnamed shared-handle key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named::<T>("")
    }

    /// Creates a named shared-handle key for type `T`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            ValueKind::Shared,
            name,
        )
    }

    /// Returns the [`TypeId`] component of this key.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name, used in error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the structural kind component of this key.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the disambiguating name, if one was given.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

// Two keys are equal when TypeId, kind, and name all match. The stored
// type name is display metadata and stays out of identity.
impl PartialEq for BindingKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.kind == other.kind && self.name == other.name
    }
}

impl Eq for BindingKey {}

impl Hash for BindingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.kind.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.type_name, self.kind)?;
        if !self.name.is_empty() {
            write!(f, "-{}", self.name)?;
        }
        Ok(())
    }
}
