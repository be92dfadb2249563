use core::fmt;
use core::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Path;

/// A user-facing problem with a value, located by a [`Path`].
///
/// Two errors are equal when their `kind` and `path` are equal; the message is
/// informational only, so re-wording a message never changes error identity.
///
/// # Examples
///
/// ```
/// use form_rail::types::{Path, ValidationError};
///
/// let a = ValidationError::new("required", "value required");
/// let b = ValidationError::new("required", "please fill in this field");
/// assert_eq!(a, b);
///
/// let nested = a.clone().at(Path::new(["first_name"]).unwrap());
/// assert_ne!(a, nested);
/// ```
#[must_use]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationError {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: String,
    message: String,
    path: Path,
}

impl ValidationError {
    /// Creates an error located at the root path.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into(), path: Path::root() }
    }

    /// Replaces the location of this error.
    #[inline]
    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Prepends `prefix` to the location of this error.
    #[inline]
    pub fn prefixed(mut self, prefix: &Path) -> Self {
        self.path = prefix.plus(&self.path);
        self
    }

    /// The error type, e.g. `"required"`.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.path == other.path
    }
}

impl Eq for ValidationError {}

impl Hash for ValidationError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.path.hash(state);
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.kind)
    }
}
