//! Annotation parsing for injection points.
//!
//! A field's raw annotation string is a comma-separated list of
//! `key=value` pairs. The empty string is a valid annotation and selects
//! the default (unnamed) injection. The only recognized key is `name`,
//! which restricts the injection point to a binding registered with that
//! exact name.
//!
//! Absent annotations never reach this parser: a field without one is not
//! an injection point and is skipped by the resolver entirely.

use crate::error::{RabtError, Result};

/// Parsed annotation options for a single injection point.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Required binding name; empty means the injection is unnamed.
    pub name: String,
}

impl Annotation {
    /// Returns `true` when the injection point does not require a name.
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

/// Parses raw annotation content into structured options.
///
/// Malformed fragments (no `=`, more than one `=`, empty key or value, or
/// an unrecognized key) fail with [`RabtError::InvalidAnnotation`]
/// carrying the offending fragment byte-for-byte.
pub fn parse(raw: &str) -> Result<Annotation> {
    let mut annotation = Annotation::default();
    if raw.is_empty() {
        return Ok(annotation);
    }

    for fragment in raw.split(',') {
        let parts: Vec<&str> = fragment.split('=').collect();
        if parts.len() != 2 {
            return Err(invalid(fragment));
        }

        let (key, value) = (parts[0], parts[1]);
        if value.is_empty() {
            return Err(invalid(fragment));
        }

        match key {
            "name" => annotation.name = value.to_string(),
            _ => return Err(invalid(fragment)),
        }
    }

    Ok(annotation)
}

fn invalid(fragment: &str) -> RabtError {
    RabtError::InvalidAnnotation {
        fragment: fragment.to_string(),
    }
}
