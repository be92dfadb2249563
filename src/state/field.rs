use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::ControlState;
use crate::types::{ErrorSet, FieldValue};

/// State of a field control.
///
/// Created with an initial value and default flags (enabled, pristine,
/// untouched, not validating). Each `with_*`/`mark_*` method returns a new
/// state with exactly one field changed.
///
/// # Examples
///
/// ```
/// use form_rail::state::FormState;
/// use form_rail::types::{ErrorSet, ValidationError};
///
/// let state = FormState::new(String::new())
///     .with_errors(ErrorSet::single(ValidationError::new("required", "value required")));
///
/// assert_eq!(state.value(), "");
/// assert_eq!(state.errors().len(), 1);
/// assert!(state.enabled());
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormState<V> {
    value: V,
    errors: ErrorSet,
    dirty: bool,
    touched: bool,
    enabled: bool,
    validating: bool,
    validation_requested: bool,
}

impl<V> FormState<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            errors: ErrorSet::new(),
            dirty: false,
            touched: false,
            enabled: true,
            validating: false,
            validation_requested: false,
        }
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> V {
        self.value
    }

    #[inline]
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn touched(&self) -> bool {
        self.touched
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn validating(&self) -> bool {
        self.validating
    }

    #[inline]
    pub fn validation_requested(&self) -> bool {
        self.validation_requested
    }

    #[inline]
    pub fn with_value(self, value: V) -> Self {
        Self { value, ..self }
    }

    /// Computes the next value from the current one.
    #[inline]
    pub fn map_value<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> V,
    {
        let Self { value, errors, dirty, touched, enabled, validating, validation_requested } =
            self;
        Self { value: f(value), errors, dirty, touched, enabled, validating, validation_requested }
    }

    #[inline]
    pub fn with_errors(self, errors: ErrorSet) -> Self {
        Self { errors, ..self }
    }

    #[inline]
    pub fn mark_touched(self, touched: bool) -> Self {
        Self { touched, ..self }
    }

    #[inline]
    pub fn mark_dirty(self, dirty: bool) -> Self {
        Self { dirty, ..self }
    }

    #[inline]
    pub fn mark_validating(self, validating: bool) -> Self {
        Self { validating, ..self }
    }

    #[inline]
    pub fn request_validation(self, requested: bool) -> Self {
        Self { validation_requested: requested, ..self }
    }

    #[inline]
    pub fn enable(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Converts the value while keeping errors and flags.
    pub fn convert<O, F>(self, f: F) -> FormState<O>
    where
        F: FnOnce(V) -> O,
    {
        FormState {
            value: f(self.value),
            errors: self.errors,
            dirty: self.dirty,
            touched: self.touched,
            enabled: self.enabled,
            validating: self.validating,
            validation_requested: self.validation_requested,
        }
    }
}

impl<V: PartialEq> FormState<V> {
    /// Deep equality, comparing errors as sets.
    pub fn matches(&self, other: &Self) -> bool {
        self == other
    }
}

impl<V: Default> Default for FormState<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: fmt::Debug> fmt::Display for FormState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FormState{{value={:?} errors={} dirty={} touched={} enabled={} validating={} validation_requested={}}}",
            self.value,
            self.errors,
            self.dirty,
            self.touched,
            self.enabled,
            self.validating,
            self.validation_requested
        )
    }
}

impl<V: FieldValue> ControlState for FormState<V> {
    type Value = V;

    fn value(&self) -> &V {
        &self.value
    }

    fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    fn dirty(&self) -> bool {
        self.dirty
    }

    fn touched(&self) -> bool {
        self.touched
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn validating(&self) -> bool {
        self.validating
    }

    fn validation_requested(&self) -> bool {
        self.validation_requested
    }

    fn mark_touched(self, touched: bool) -> Self {
        FormState::mark_touched(self, touched)
    }

    fn mark_dirty(self, dirty: bool) -> Self {
        FormState::mark_dirty(self, dirty)
    }

    fn enable(self, enabled: bool) -> Self {
        FormState::enable(self, enabled)
    }

    fn matches(&self, other: &Self) -> bool {
        FormState::matches(self, other)
    }
}
