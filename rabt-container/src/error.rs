//! Error types for Rabt container operations.
//!
//! Every failure crossing the public surface is one of the typed variants
//! below; nothing panics out of the container. Recursive resolution wraps
//! the original error in [`RabtError::Context`] breadcrumbs, one per
//! enclosing binding on the path from the resolution root to the failure.

use rabt_support::rendering::render_trail;

/// Main error type for all Rabt operations.
#[derive(Debug, thiserror::Error)]
pub enum RabtError {
    /// A registered value, resolution target, or injection-point field is
    /// not reference-like (neither a shared handle nor a capability).
    ///
    /// Also produced when a guarded handle downcast does not line up with
    /// the declared type table, instead of letting the mismatch escape as
    /// a panic.
    #[error("{type_name} should be a shared or capability reference")]
    InvalidValueKind {
        /// The offending type, or the field identifier for field failures.
        type_name: String,
    },

    /// Two dependencies derived the same binding key.
    #[error("duplicate dependency: {key}")]
    DuplicateRegistration {
        /// Textual form of the colliding key.
        key: String,
    },

    /// No binding matches an injection point's type and name.
    #[error("unable to find registered dependency: {target}")]
    UnresolvedDependency {
        /// The requested type for root lookups, the field identifier for
        /// injection-point lookups.
        target: String,
    },

    /// A tagged field exists but carries no setter, so it cannot be
    /// assigned from outside its declaring module.
    #[error("cannot set field {field}")]
    UnexportedField { field: String },

    /// Malformed annotation content. The fragment is reproduced verbatim
    /// for callers inspecting error text.
    #[error("invalid tag configuration '{fragment}', expecting <key>=<value>")]
    InvalidAnnotation { fragment: String },

    /// Breadcrumb wrapper added by each enclosing binding during recursive
    /// resolution, producing paths such as
    /// `[Outer] [Middle] unable to find registered dependency: field`.
    #[error("[{enclosing}] {source}")]
    Context {
        enclosing: String,
        #[source]
        source: Box<RabtError>,
    },
}

impl RabtError {
    /// Wraps this error with the short name of the enclosing binding.
    pub(crate) fn in_type(self, enclosing: impl Into<String>) -> Self {
        RabtError::Context {
            enclosing: enclosing.into(),
            source: Box::new(self),
        }
    }

    /// Unwraps all [`RabtError::Context`] layers down to the originating
    /// error.
    pub fn root_cause(&self) -> &RabtError {
        let mut current = self;
        while let RabtError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// The enclosing type names accumulated during resolution, outermost
    /// first. Empty for errors that never crossed a binding boundary.
    pub fn trail(&self) -> Vec<&str> {
        let mut trail = Vec::new();
        let mut current = self;
        while let RabtError::Context { enclosing, source } = current {
            trail.push(enclosing.as_str());
            current = source;
        }
        trail
    }

    /// The accumulated trail rendered as a `[Outer] [Middle]` prefix.
    pub fn breadcrumbs(&self) -> String {
        render_trail(&self.trail())
    }
}

/// Convenient Result type for Rabt operations.
pub type Result<T> = std::result::Result<T, RabtError>;
