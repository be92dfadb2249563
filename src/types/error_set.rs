use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{ErrorVec, Path, ValidationError};

/// A set of [`ValidationError`]s with path-aware merging.
///
/// Membership is decided by `(kind, path)`: inserting an error that is
/// already present is a no-op. Equality is order-independent set equality.
///
/// # Examples
///
/// ```
/// use form_rail::types::{ErrorSet, Path, ValidationError};
///
/// let root = ErrorSet::single(ValidationError::new("custom", "not allowed"));
/// let merged = root.replace(
///     &Path::new(["first_name"]).unwrap(),
///     ErrorSet::single(ValidationError::new("required", "value required")),
/// );
///
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged.at(&Path::new(["first_name"]).unwrap()).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ErrorSet {
    items: ErrorVec<ValidationError>,
}

impl ErrorSet {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self { items: ErrorVec::new() }
    }

    /// Creates a set holding one error.
    #[inline]
    pub fn single(error: ValidationError) -> Self {
        let mut set = Self::new();
        set.push(error);
        set
    }

    /// Adds an error unless an equal one (same kind and path) is present.
    pub fn push(&mut self, error: ValidationError) {
        if !self.contains(&error) {
            self.items.push(error);
        }
    }

    /// Adds every error of `iter`, skipping duplicates.
    pub fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        for error in iter {
            self.push(error);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, ValidationError> {
        self.items.iter()
    }

    /// Returns `true` if an error with the same kind and path is present.
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.items.iter().any(|item| item == error)
    }

    /// Returns a copy of this set with `prefix` prepended to every path.
    #[must_use]
    pub fn prefixed(&self, prefix: &Path) -> ErrorSet {
        self.items.iter().cloned().map(|error| error.prefixed(prefix)).collect()
    }

    /// Errors located at `path` or nested under it.
    #[must_use]
    pub fn at(&self, path: &Path) -> ErrorSet {
        self.items.iter().filter(|error| error.path().includes(path)).cloned().collect()
    }

    /// Errors located outside of `path`.
    #[must_use]
    pub fn without(&self, path: &Path) -> ErrorSet {
        self.items.iter().filter(|error| !error.path().includes(path)).cloned().collect()
    }

    /// Replaces the subtree rooted at `path` with `errors`.
    ///
    /// Every existing error at or under `path` is dropped, then `errors` are
    /// added with `path` prepended to each of their own paths. Errors outside
    /// of `path` are kept untouched.
    #[must_use]
    pub fn replace(&self, path: &Path, errors: ErrorSet) -> ErrorSet {
        let mut merged = self.without(path);
        merged.extend(errors.into_iter().map(|error| error.prefixed(path)));
        merged
    }

    /// Union of two sets.
    #[must_use]
    pub fn union(&self, other: &ErrorSet) -> ErrorSet {
        let mut merged = self.clone();
        merged.extend(other.iter().cloned());
        merged
    }

    /// Order-independent equality by `(kind, path)`.
    pub fn matches(&self, other: &ErrorSet) -> bool {
        self.len() == other.len() && self.iter().all(|error| other.contains(error))
    }
}

impl PartialEq for ErrorSet {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for ErrorSet {}

impl From<ValidationError> for ErrorSet {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl From<Vec<ValidationError>> for ErrorSet {
    fn from(errors: Vec<ValidationError>) -> Self {
        errors.into_iter().collect()
    }
}

impl FromIterator<ValidationError> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ErrorSet {
    type Item = ValidationError;
    type IntoIter = smallvec::IntoIter<[ValidationError; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a ValidationError;
    type IntoIter = core::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, error) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", error)?;
        }
        f.write_str("]")
    }
}
