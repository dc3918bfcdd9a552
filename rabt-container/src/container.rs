//! # The Container — heart of Rabt
//!
//! The dependency injection container that wires registered singleton
//! values into the annotated fields of every consumer registered with
//! it.
//!
//! # Architecture
//! ```text
//! Container::new()  ──register(deps)──>  Registry of Bindings
//!                                             │
//!                                  resolve / resolve_all
//!                                             │
//!                                             ▼
//!                                 resolve_core (recursive,
//!                                 cycle-safe field wiring)
//! ```
//!
//! # Examples
//! ```rust
//! use rabt_container::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Config {
//!     url: String,
//! }
//!
//! #[derive(Default)]
//! struct Database {
//!     config: Option<Shared<Config>>,
//! }
//!
//! injectable!(Config);
//! injectable! {
//!     Database {
//!         inject config: Config = "";
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut container = Container::new();
//! container.register([
//!     Dependency::new(Rc::new(RefCell::new(Config {
//!         url: "postgres://localhost".into(),
//!     }))),
//!     Dependency::new(Rc::new(RefCell::new(Database::default()))),
//! ])?;
//!
//! let database = container.resolve::<Database>()?;
//! let database = database.borrow();
//! let config = database.config.as_ref().expect("wired");
//! assert_eq!(config.borrow().url, "postgres://localhost");
//! # Ok(())
//! # }
//! ```

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::annotation;
use crate::error::{RabtError, Result};
use crate::inject::{FieldSpec, FieldTarget, Injectable, ResolvedValue, Shared, TypeSpec};
use crate::key::{BindingKey, ValueKind};
use crate::matcher;
use crate::registry::{Binding, Registry, ResolveState};

// ============================================================
// Dependency
// ============================================================

/// A caller-supplied registration request: a shared handle plus an
/// optional disambiguating name.
///
/// The container takes shared ownership of the handle for its lifetime;
/// the caller keeps its own handle and observes fields filled in place.
pub struct Dependency {
    name: String,
    handle: Rc<dyn Any>,
    spec: TypeSpec,
}

impl Dependency {
    /// An unnamed dependency.
    pub fn new<T: Injectable>(value: Shared<T>) -> Self {
        Self::named("", value)
    }

    /// A dependency disambiguated by name.
    ///
    /// Two registrations of the same type differing only by name are
    /// distinct and both legal.
    pub fn named<T: Injectable>(name: impl Into<String>, value: Shared<T>) -> Self {
        let handle: Rc<dyn Any> = value;
        Self {
            name: name.into(),
            handle,
            spec: T::type_spec(),
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &self.spec.type_name())
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================
// Container
// ============================================================

/// Single-threaded dependency injection container.
///
/// A plain value with no implicit global instance: each call site
/// constructs and owns its own container, and independent containers
/// never interfere. The `Rc`/`RefCell` internals make it `!Send`, so
/// concurrent use is ruled out by construction rather than by
/// documentation.
#[derive(Default)]
pub struct Container {
    registry: Registry,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Adds the provided dependencies to the container.
    ///
    /// # Errors
    /// - [`RabtError::InvalidValueKind`] when a dependency's declared
    ///   kind is not reference-like.
    /// - [`RabtError::DuplicateRegistration`] when two dependencies
    ///   derive the same key.
    pub fn register(&mut self, deps: impl IntoIterator<Item = Dependency>) -> Result<()> {
        for dep in deps {
            if !dep.spec.kind().is_reference() {
                return Err(RabtError::InvalidValueKind {
                    type_name: dep.spec.type_name().to_string(),
                });
            }

            let key = BindingKey::new(
                dep.spec.type_id(),
                dep.spec.type_name(),
                dep.spec.kind(),
                dep.name.clone(),
            );
            self.registry
                .insert(Binding::new(key, dep.name, dep.handle, dep.spec))?;
        }

        Ok(())
    }

    /// Resolves the unnamed binding of concrete type `T`, wiring its
    /// whole dependency graph, and returns the populated handle.
    pub fn resolve<T: Injectable>(&self) -> Result<Shared<T>> {
        self.resolve_by_name("")
    }

    /// Resolves the binding of concrete type `T` registered under
    /// `name`.
    pub fn resolve_by_name<T: Injectable>(&self, name: &str) -> Result<Shared<T>> {
        let key = BindingKey::new(
            TypeId::of::<T>(),
            type_name::<T>(),
            ValueKind::Shared,
            name,
        );
        trace!(key = %key, "resolving");

        let Some(binding) = self.registry.get(&key).cloned() else {
            return Err(RabtError::UnresolvedDependency {
                target: type_name::<T>().to_string(),
            });
        };

        self.resolve_core(&binding)?;

        binding
            .handle()
            .clone()
            .downcast::<RefCell<T>>()
            .map_err(|_| RabtError::InvalidValueKind {
                type_name: type_name::<T>().to_string(),
            })
    }

    /// Resolves the first binding whose concrete type satisfies
    /// capability `C`, wiring its graph, and returns a capability
    /// handle to it.
    pub fn resolve_capability<C: ?Sized + Any>(&self) -> Result<Shared<C>> {
        self.resolve_capability_by_name("")
    }

    /// Like [`resolve_capability`](Container::resolve_capability), but
    /// only bindings registered under `name` qualify.
    pub fn resolve_capability_by_name<C: ?Sized + Any>(&self, name: &str) -> Result<Shared<C>> {
        let id = matcher::CapabilityId::of::<C>();
        trace!(capability = %id, "resolving capability");

        let Some(binding) = matcher::find_by_capability(&self.registry, id, name) else {
            return Err(RabtError::UnresolvedDependency {
                target: type_name::<C>().to_string(),
            });
        };

        self.resolve_core(&binding)?;

        let invalid = || RabtError::InvalidValueKind {
            type_name: type_name::<C>().to_string(),
        };
        let boxed = binding.cast_capability(id).ok_or_else(invalid)?;
        boxed
            .downcast::<Shared<C>>()
            .map(|handle| *handle)
            .map_err(|_| invalid())
    }

    /// Resolves every registered binding, in unspecified order,
    /// surfacing the first error encountered.
    #[instrument(skip(self), name = "resolve_all")]
    pub fn resolve_all(&self) -> Result<()> {
        debug!(registered = self.registry.len(), "resolving all bindings");

        for binding in self.registry.iter() {
            self.resolve_core(binding)?;
        }

        Ok(())
    }

    /// Returns a blank (default-valued) instance shaped like `T`.
    ///
    /// Unlike [`resolve`](Container::resolve), the result is not the
    /// registered singleton and is explicitly not wired: no field holds
    /// a previously-assigned value.
    pub fn resolve_new<T: Injectable + Default>(&self) -> Result<Shared<T>> {
        let key = BindingKey::of::<T>();
        let matched = self.registry.get(&key).is_some();
        debug!(key = %key, matched, "resolving blank instance");

        Ok(Rc::new(RefCell::new(T::default())))
    }

    // ── Internal ──

    /// The recursive heart of resolution.
    ///
    /// Marks the binding in progress before walking its fields so that
    /// cyclic re-entry short-circuits and the cyclic edge is satisfied
    /// with the in-progress instance. Any failure demotes the marker,
    /// making a later retry re-walk (and reassign) every field.
    fn resolve_core(&self, binding: &Rc<Binding>) -> Result<()> {
        match binding.state() {
            ResolveState::Resolved | ResolveState::Resolving => return Ok(()),
            ResolveState::Unresolved => {}
        }

        binding.set_state(ResolveState::Resolving);
        trace!(binding = %binding.key(), "resolving binding");

        for field in binding.spec().fields() {
            let Some(raw) = field.tag() else {
                // Not an injection point; never touched.
                continue;
            };

            if let Err(err) = self.resolve_field(binding, field, raw) {
                binding.set_state(ResolveState::Unresolved);
                return Err(err);
            }
        }

        binding.set_state(ResolveState::Resolved);
        Ok(())
    }

    /// Resolves and assigns a single injection point of `binding`.
    fn resolve_field(&self, binding: &Rc<Binding>, field: &FieldSpec, raw: &str) -> Result<()> {
        let enclosing = binding.short_name();
        let annotation =
            annotation::parse(raw).map_err(|err| err.in_type(enclosing.clone()))?;

        let dependency = match field.target() {
            Some(FieldTarget::Shared { type_id, type_name }) => {
                let key = BindingKey::new(
                    *type_id,
                    type_name,
                    ValueKind::Shared,
                    annotation.name.clone(),
                );
                self.registry.get(&key).cloned()
            }
            Some(FieldTarget::Capability { id }) => {
                matcher::find_by_capability(&self.registry, *id, &annotation.name)
            }
            Some(FieldTarget::Value { .. }) | None => {
                return Err(RabtError::InvalidValueKind {
                    type_name: field.name().to_string(),
                }
                .in_type(enclosing));
            }
        };

        if !field.is_settable() {
            return Err(RabtError::UnexportedField {
                field: field.name().to_string(),
            }
            .in_type(enclosing));
        }

        let Some(dependency) = dependency else {
            return Err(RabtError::UnresolvedDependency {
                target: field.name().to_string(),
            }
            .in_type(enclosing));
        };

        self.resolve_core(&dependency)
            .map_err(|err| err.in_type(enclosing.clone()))?;

        let value = match field.target() {
            Some(FieldTarget::Capability { id }) => {
                let Some(cast) = dependency.cast_capability(*id) else {
                    return Err(RabtError::InvalidValueKind {
                        type_name: field.name().to_string(),
                    }
                    .in_type(enclosing));
                };
                ResolvedValue::Capability(cast)
            }
            _ => ResolvedValue::Shared(dependency.handle().clone()),
        };

        if !field.assign(binding.handle(), &value) {
            return Err(RabtError::InvalidValueKind {
                type_name: field.name().to_string(),
            }
            .in_type(enclosing));
        }

        trace!(binding = %binding.key(), field = field.name(), "assigned dependency");
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .finish()
    }
}

// ============================================================
// Prelude
// ============================================================

pub mod prelude {
    pub use super::{Container, Dependency};
    pub use crate::error::{RabtError, Result};
    pub use crate::inject::{FieldSpec, Injectable, Shared, TypeSpec};
    pub use crate::injectable;
    pub use crate::key::{BindingKey, ValueKind};
    pub use crate::matcher::{CapabilityId, CapabilitySpec};
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectable;

    fn shared<T>(value: T) -> Shared<T> {
        Rc::new(RefCell::new(value))
    }

    // === Types shared across scenarios ===

    #[derive(Default, Debug)]
    struct Leaf {
        value: i32,
    }

    injectable!(Leaf);

    trait Worker: std::fmt::Debug {
        fn work(&self) -> String;
    }

    #[derive(Default, Debug)]
    struct Builder {
        work: String,
    }

    impl Worker for Builder {
        fn work(&self) -> String {
            self.work.clone()
        }
    }

    injectable! {
        Builder {
            provides dyn Worker;
        }
    }

    #[derive(Default, Debug)]
    struct Holder {
        leaf: Option<Shared<Leaf>>,
    }

    injectable! {
        Holder {
            inject leaf: Leaf = "";
        }
    }

    // Three-level graph mixing shared and capability fields.

    #[derive(Default, Debug)]
    struct Outer {
        middle: Option<Shared<Middle>>,
        leaf: Option<Shared<Leaf>>,
        worker: Option<Shared<dyn Worker>>,
    }

    #[derive(Default, Debug)]
    struct Middle {
        inner: Option<Shared<Inner>>,
        leaf: Option<Shared<Leaf>>,
    }

    #[derive(Default, Debug)]
    struct Inner {
        leaf: Option<Shared<Leaf>>,
        worker: Option<Shared<dyn Worker>>,
    }

    injectable! {
        Outer {
            inject middle: Middle = "";
            inject leaf: Leaf = "";
            inject worker: dyn Worker = "";
        }
    }
    injectable! {
        Middle {
            inject inner: Inner = "";
            inject leaf: Leaf = "";
        }
    }
    injectable! {
        Inner {
            inject leaf: Leaf = "";
            inject worker: dyn Worker = "";
        }
    }

    // Mutual cycle.

    #[derive(Default)]
    struct First {
        second: Option<Shared<Second>>,
        leaf: Option<Shared<Leaf>>,
    }

    #[derive(Default)]
    struct Second {
        first: Option<Shared<First>>,
    }

    #[derive(Default)]
    struct Third {
        second: Option<Shared<Second>>,
    }

    injectable! {
        First {
            inject second: Second = "";
            inject leaf: Leaf = "";
        }
    }
    injectable! {
        Second {
            inject first: First = "";
        }
    }
    injectable! {
        Third {
            inject second: Second = "";
        }
    }

    // Named injection points.

    #[derive(Default, Debug)]
    struct Named {
        leaf: Option<Shared<Leaf>>,
        worker: Option<Shared<dyn Worker>>,
    }

    injectable! {
        Named {
            inject leaf: Leaf = "name=test1";
            inject worker: dyn Worker = "name=test2";
        }
    }

    // === Scenarios ===

    #[test]
    fn resolves_dependencies_recursively() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Outer::default())),
                Dependency::new(shared(Middle::default())),
                Dependency::new(shared(Inner::default())),
                Dependency::new(shared(Leaf { value: 5 })),
                Dependency::new(shared(Builder {
                    work: "Work".into(),
                })),
            ])
            .unwrap();

        let outer = container.resolve::<Outer>().unwrap();
        let outer = outer.borrow();

        let leaf = outer.leaf.as_ref().unwrap();
        assert_eq!(leaf.borrow().value, 5);

        let middle = outer.middle.as_ref().unwrap().borrow();
        assert_eq!(middle.leaf.as_ref().unwrap().borrow().value, 5);

        let inner = middle.inner.as_ref().unwrap().borrow();
        assert_eq!(inner.leaf.as_ref().unwrap().borrow().value, 5);
        assert_eq!(inner.worker.as_ref().unwrap().borrow().work(), "Work");

        // The same singleton instance flows everywhere.
        assert!(Rc::ptr_eq(leaf, inner.leaf.as_ref().unwrap()));

        assert_eq!(outer.worker.as_ref().unwrap().borrow().work(), "Work");
    }

    #[test]
    fn resolves_capability_root() {
        let mut container = Container::new();
        container
            .register([Dependency::new(shared(Builder {
                work: "Build".into(),
            }))])
            .unwrap();

        let worker = container.resolve_capability::<dyn Worker>().unwrap();
        assert_eq!(worker.borrow().work(), "Build");
    }

    #[test]
    fn resolves_named_bindings() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Named::default())),
                Dependency::named("test1", shared(Leaf { value: 50 })),
                Dependency::named("test2", shared(Builder {
                    work: "Builder".into(),
                })),
            ])
            .unwrap();

        let named = container.resolve::<Named>().unwrap();
        let named = named.borrow();
        assert_eq!(named.leaf.as_ref().unwrap().borrow().value, 50);
        assert_eq!(named.worker.as_ref().unwrap().borrow().work(), "Builder");
    }

    #[test]
    fn named_point_ignores_unnamed_binding() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Named::default())),
                Dependency::new(shared(Leaf { value: 50 })),
                Dependency::named("test2", shared(Builder {
                    work: "Builder".into(),
                })),
            ])
            .unwrap();

        let err = container.resolve::<Named>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Named] unable to find registered dependency: leaf"
        );
    }

    #[test]
    fn named_capability_point_ignores_unnamed_binding() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Named::default())),
                Dependency::named("test1", shared(Leaf { value: 50 })),
                Dependency::new(shared(Builder {
                    work: "Builder".into(),
                })),
            ])
            .unwrap();

        let err = container.resolve::<Named>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Named] unable to find registered dependency: worker"
        );
    }

    #[test]
    fn same_type_distinct_names_resolve_separately() {
        let mut container = Container::new();
        container
            .register([
                Dependency::named("x", shared(Leaf { value: 1 })),
                Dependency::named("y", shared(Leaf { value: 2 })),
            ])
            .unwrap();

        let x = container.resolve_by_name::<Leaf>("x").unwrap();
        let y = container.resolve_by_name::<Leaf>("y").unwrap();
        assert_eq!(x.borrow().value, 1);
        assert_eq!(y.borrow().value, 2);
    }

    #[test]
    fn resolves_mutual_cycle_to_same_instance() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(First::default())),
                Dependency::new(shared(Second::default())),
                Dependency::new(shared(Third::default())),
                Dependency::new(shared(Leaf { value: 100 })),
            ])
            .unwrap();

        let third = container.resolve::<Third>().unwrap();
        assert!(third.borrow().second.is_some());

        let first = container.resolve::<First>().unwrap();
        {
            let borrowed = first.borrow();
            assert_eq!(borrowed.leaf.as_ref().unwrap().borrow().value, 100);

            let second = borrowed.second.as_ref().unwrap().borrow();
            let back = second.first.as_ref().unwrap();
            // The back-reference is the same singleton instance.
            assert!(Rc::ptr_eq(back, &first));
        }

        let second = container.resolve::<Second>().unwrap();
        assert!(second.borrow().first.is_some());
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Holder::default())),
                Dependency::new(shared(Leaf { value: 5 })),
            ])
            .unwrap();

        let once = container.resolve::<Holder>().unwrap();
        let leaf_once = once.borrow().leaf.as_ref().unwrap().clone();

        let twice = container.resolve::<Holder>().unwrap();
        let leaf_twice = twice.borrow().leaf.as_ref().unwrap().clone();

        assert!(Rc::ptr_eq(&once, &twice));
        assert!(Rc::ptr_eq(&leaf_once, &leaf_twice));
        assert_eq!(leaf_twice.borrow().value, 5);
    }

    #[test]
    fn untagged_fields_are_never_touched() {
        #[derive(Default)]
        struct NoTag {
            resolve_me: Option<Shared<Leaf>>,
            dont_resolve_me: Option<Shared<Leaf>>,
        }

        injectable! {
            NoTag {
                inject resolve_me: Leaf = "";
                skip dont_resolve_me;
            }
        }

        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(NoTag::default())),
                Dependency::new(shared(Leaf { value: 75 })),
            ])
            .unwrap();

        let no_tag = container.resolve::<NoTag>().unwrap();
        let no_tag = no_tag.borrow();
        assert!(no_tag.dont_resolve_me.is_none());
        assert_eq!(no_tag.resolve_me.as_ref().unwrap().borrow().value, 75);
    }

    #[test]
    fn missing_root_binding_fails() {
        let container = Container::new();
        let err = container.resolve::<Leaf>().unwrap_err();
        assert!(matches!(err, RabtError::UnresolvedDependency { ref target } if target.contains("Leaf")));
        assert!(err
            .to_string()
            .starts_with("unable to find registered dependency:"));
    }

    #[test]
    fn missing_capability_root_fails() {
        let container = Container::new();
        let err = container.resolve_capability::<dyn Worker>().unwrap_err();
        assert!(matches!(err, RabtError::UnresolvedDependency { ref target } if target.contains("Worker")));
    }

    #[test]
    fn resolve_by_name_ignores_unnamed_binding() {
        let mut container = Container::new();
        container
            .register([Dependency::new(shared(Builder {
                work: "Builder".into(),
            }))])
            .unwrap();

        let err = container.resolve_by_name::<Builder>("test").unwrap_err();
        assert!(err.to_string().contains("Builder"));

        let err = container
            .resolve_capability_by_name::<dyn Worker>("test")
            .unwrap_err();
        assert!(err.to_string().contains("Worker"));
    }

    #[test]
    fn resolve_by_name_finds_named_binding() {
        let mut container = Container::new();
        container
            .register([Dependency::named("test", shared(Builder {
                work: "Builder".into(),
            }))])
            .unwrap();

        let builder = container.resolve_by_name::<Builder>("test").unwrap();
        assert_eq!(builder.borrow().work(), "Builder");

        let worker = container
            .resolve_capability_by_name::<dyn Worker>("test")
            .unwrap();
        assert_eq!(worker.borrow().work(), "Builder");
    }

    #[test]
    fn breadcrumbs_accumulate_across_levels() {
        // Outer → Middle → Inner, with Inner's capability dependency
        // missing.
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Outer::default())),
                Dependency::new(shared(Middle::default())),
                Dependency::new(shared(Inner::default())),
                Dependency::new(shared(Leaf { value: 1 })),
            ])
            .unwrap();

        let err = container.resolve::<Outer>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Outer] [Middle] [Inner] unable to find registered dependency: worker"
        );
        assert_eq!(err.trail(), vec!["Outer", "Middle", "Inner"]);
        assert!(matches!(
            err.root_cause(),
            RabtError::UnresolvedDependency { target } if target == "worker"
        ));
    }

    #[test]
    fn failure_rolls_back_completion_for_retry() {
        let mut container = Container::new();
        container
            .register([Dependency::new(shared(Holder::default()))])
            .unwrap();

        // First attempt fails: Leaf is not registered yet.
        let err = container.resolve::<Holder>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Holder] unable to find registered dependency: leaf"
        );

        // Registering the missing dependency makes a retry succeed.
        container
            .register([Dependency::new(shared(Leaf { value: 7 }))])
            .unwrap();

        let holder = container.resolve::<Holder>().unwrap();
        assert_eq!(holder.borrow().leaf.as_ref().unwrap().borrow().value, 7);
    }

    #[test]
    fn duplicate_registration_names_derived_key() {
        let mut container = Container::new();
        let err = container
            .register([
                Dependency::new(shared(Leaf { value: 1 })),
                Dependency::new(shared(Leaf { value: 2 })),
            ])
            .unwrap_err();

        let expected = format!(
            "duplicate dependency: {}-shared",
            std::any::type_name::<Leaf>()
        );
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn duplicate_names_of_same_type_collide() {
        let mut container = Container::new();
        let err = container
            .register([
                Dependency::named("x", shared(Leaf { value: 1 })),
                Dependency::named("x", shared(Leaf { value: 2 })),
            ])
            .unwrap_err();
        assert!(err.to_string().ends_with("-shared-x"));
    }

    #[test]
    fn invalid_annotation_cites_fragment_verbatim() {
        #[derive(Default, Debug)]
        struct InvalidTag {
            leaf: Option<Shared<Leaf>>,
        }

        injectable! {
            InvalidTag {
                inject leaf: Leaf = "name=";
            }
        }

        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(InvalidTag::default())),
                Dependency::new(shared(Leaf::default())),
            ])
            .unwrap();

        let err = container.resolve::<InvalidTag>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[InvalidTag] invalid tag configuration 'name=', expecting <key>=<value>"
        );
    }

    #[test]
    fn unexported_field_cannot_be_set() {
        #[derive(Default, Debug)]
        struct Unexp {
            hidden: Option<Shared<Leaf>>,
        }

        impl Injectable for Unexp {
            fn type_spec() -> TypeSpec {
                TypeSpec::of::<Unexp>().field(FieldSpec::unsettable::<Leaf>("hidden", ""))
            }
        }

        let unexp = shared(Unexp::default());
        let mut container = Container::new();
        container
            .register([
                Dependency::new(unexp.clone()),
                Dependency::new(shared(Leaf::default())),
            ])
            .unwrap();

        let err = container.resolve::<Unexp>().unwrap_err();
        assert_eq!(err.to_string(), "[Unexp] cannot set field hidden");
        assert!(matches!(
            err.root_cause(),
            RabtError::UnexportedField { field } if field == "hidden"
        ));

        // The field was never assigned.
        assert!(unexp.borrow().hidden.is_none());
    }

    #[test]
    fn by_value_field_is_rejected() {
        #[derive(Default, Debug)]
        struct PlainField {
            count: i32,
        }

        impl Injectable for PlainField {
            fn type_spec() -> TypeSpec {
                TypeSpec::of::<PlainField>().field(FieldSpec::by_value::<i32>("count", ""))
            }
        }

        let plain = shared(PlainField::default());
        let mut container = Container::new();
        container
            .register([Dependency::new(plain.clone())])
            .unwrap();

        let err = container.resolve::<PlainField>().unwrap_err();
        assert!(matches!(
            err.root_cause(),
            RabtError::InvalidValueKind { type_name } if type_name == "count"
        ));
        assert_eq!(err.trail(), vec!["PlainField"]);
        assert_eq!(plain.borrow().count, 0);
    }

    #[test]
    fn register_rejects_non_reference_kind() {
        struct ByValue;

        impl Injectable for ByValue {
            fn type_spec() -> TypeSpec {
                TypeSpec::of::<ByValue>().with_kind(ValueKind::Value)
            }
        }

        let mut container = Container::new();
        let err = container
            .register([Dependency::new(shared(ByValue))])
            .unwrap_err();

        assert!(matches!(
            err,
            RabtError::InvalidValueKind { ref type_name } if type_name.contains("ByValue")
        ));
        assert!(err
            .to_string()
            .ends_with("should be a shared or capability reference"));
    }

    #[test]
    fn resolve_all_wires_disjoint_hierarchies() {
        #[derive(Default)]
        struct RootA {
            leaf: Option<Shared<Leaf>>,
        }

        #[derive(Default)]
        struct RootB {
            worker: Option<Shared<dyn Worker>>,
        }

        injectable! {
            RootA {
                inject leaf: Leaf = "";
            }
        }
        injectable! {
            RootB {
                inject worker: dyn Worker = "";
            }
        }

        let a = shared(RootA::default());
        let b = shared(RootB::default());

        let mut container = Container::new();
        container
            .register([
                Dependency::new(a.clone()),
                Dependency::new(b.clone()),
                Dependency::new(shared(Leaf { value: 100 })),
                Dependency::new(shared(Builder {
                    work: "ResolveAll".into(),
                })),
            ])
            .unwrap();

        container.resolve_all().unwrap();

        assert_eq!(a.borrow().leaf.as_ref().unwrap().borrow().value, 100);
        assert_eq!(
            b.borrow().worker.as_ref().unwrap().borrow().work(),
            "ResolveAll"
        );
    }

    #[test]
    fn resolve_all_surfaces_first_error() {
        let mut container = Container::new();
        container
            .register([Dependency::new(shared(Middle::default()))])
            .unwrap();

        let err = container.resolve_all().unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Middle] unable to find registered dependency: inner"
        );
    }

    #[test]
    fn resolve_new_yields_blank_instance() {
        let mut container = Container::new();
        container
            .register([Dependency::new(shared(Leaf { value: 5 }))])
            .unwrap();

        let registered = container.resolve::<Leaf>().unwrap();
        let blank = container.resolve_new::<Leaf>().unwrap();

        assert_eq!(blank.borrow().value, 0);
        assert!(!Rc::ptr_eq(&registered, &blank));

        // Works without any matching binding, too.
        let container = Container::new();
        let blank = container.resolve_new::<Holder>().unwrap();
        assert!(blank.borrow().leaf.is_none());
    }

    #[test]
    fn independent_containers_do_not_interfere() {
        let mut populated = Container::new();
        populated
            .register([Dependency::new(shared(Leaf { value: 1 }))])
            .unwrap();

        let empty = Container::new();
        assert!(populated.resolve::<Leaf>().is_ok());
        assert!(empty.resolve::<Leaf>().is_err());
    }

    #[test]
    fn debug_shows_registered_count() {
        let mut container = Container::new();
        container
            .register([
                Dependency::new(shared(Leaf::default())),
                Dependency::new(shared(Holder::default())),
            ])
            .unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains('2'));
    }
}
