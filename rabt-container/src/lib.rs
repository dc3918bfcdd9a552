//! Core container implementation for Rabt DI.

pub mod annotation;
pub mod container;
pub mod error;
pub mod inject;
pub mod key;
pub mod matcher;
pub mod registry;

pub use container::prelude;
pub use container::{Container, Dependency};
pub use error::{RabtError, Result};
pub use inject::{FieldSpec, Injectable, Shared, TypeSpec};
pub use key::{BindingKey, ValueKind};
pub use matcher::{CapabilityId, CapabilitySpec};
