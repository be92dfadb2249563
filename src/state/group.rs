use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::control::AnyControl;
use crate::state::ControlState;
use crate::types::{ErrorSet, FormValue, Path, ValueMap};

/// Flags and value of a child, as observed by its parent group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSnapshot {
    pub value: FormValue,
    pub errors: ErrorSet,
    pub dirty: bool,
    pub touched: bool,
    pub enabled: bool,
    pub validating: bool,
}

/// A child control together with the path its errors are scoped under.
#[derive(Clone)]
pub(crate) struct ChildEntry {
    pub(crate) path: Path,
    pub(crate) control: Arc<dyn AnyControl>,
}

pub(crate) type Controls = Arc<BTreeMap<String, ChildEntry>>;

/// Derived state of a group control.
///
/// `value`, `errors`, `dirty`, `touched` and `enabled` are aggregated from the
/// children the state contains:
///
/// - `value` is the overlay of keys not backed by a child, plus the value of
///   every enabled child;
/// - `errors` are the errors of every enabled child, prefixed by the child key,
///   plus the group-level errors produced by the group's own validators;
/// - `dirty`/`touched` are true if any child is, `enabled` requires the group's
///   own enable instruction and every child to be enabled.
///
/// A group disabled through [`ControlState::enable`] reports an empty value and
/// no errors.
///
/// `mark_touched`, `mark_dirty`, `enable` and `with_value` do not change the
/// aggregate directly: they record an instruction that the owning
/// [`GroupControl`](crate::control::GroupControl) pushes into the children
/// during its next `transform`.
#[must_use]
#[derive(Clone)]
pub struct FormGroupState {
    controls: Controls,
    value: ValueMap,
    child_errors: ErrorSet,
    errors: ErrorSet,
    dirty: bool,
    touched: bool,
    enabled: bool,
    validating: bool,
    validation_requested: bool,
    form_value: ValueMap,
    form_errors: ErrorSet,
    pending_value: Option<ValueMap>,
    form_touched: Option<bool>,
    form_dirty: Option<bool>,
    form_enabled: Option<bool>,
    self_enabled: bool,
    pub(crate) controls_dirty: bool,
}

impl FormGroupState {
    pub(crate) fn new(controls: Controls) -> Self {
        let mut state = Self {
            controls,
            value: ValueMap::new(),
            child_errors: ErrorSet::new(),
            errors: ErrorSet::new(),
            dirty: false,
            touched: false,
            enabled: true,
            validating: false,
            validation_requested: false,
            form_value: ValueMap::new(),
            form_errors: ErrorSet::new(),
            pending_value: None,
            form_touched: None,
            form_dirty: None,
            form_enabled: None,
            self_enabled: true,
            controls_dirty: true,
        };
        state.refresh();
        state
    }

    #[inline]
    pub fn value(&self) -> &ValueMap {
        &self.value
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

    /// Keys of the value that are not backed by a child control.
    #[inline]
    pub fn form_value(&self) -> &ValueMap {
        &self.form_value
    }

    /// Errors produced by the group's own validators, at group level.
    #[inline]
    pub fn form_errors(&self) -> &ErrorSet {
        &self.form_errors
    }

    /// Pending touched instruction, if any.
    #[inline]
    pub fn form_touched(&self) -> Option<bool> {
        self.form_touched
    }

    /// Pending dirty instruction, if any.
    #[inline]
    pub fn form_dirty(&self) -> Option<bool> {
        self.form_dirty
    }

    /// Pending enable instruction, if any.
    #[inline]
    pub fn form_enabled(&self) -> Option<bool> {
        self.form_enabled
    }

    /// Keys of the child controls.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.controls.keys().map(String::as_str)
    }

    /// Child control registered under `key`.
    pub fn control(&self, key: &str) -> Option<Arc<dyn AnyControl>> {
        self.controls.get(key).map(|entry| Arc::clone(&entry.control))
    }

    /// Records a new desired value.
    ///
    /// Keys backed by a child are pushed into that child by the next
    /// `transform`; the remaining keys become the group overlay.
    pub fn with_value(mut self, value: ValueMap) -> Self {
        self.pending_value = Some(value);
        self
    }

    /// Computes the next desired value from the current aggregate.
    pub fn map_value<F>(self, f: F) -> Self
    where
        F: FnOnce(ValueMap) -> ValueMap,
    {
        let current = self.pending_value.clone().unwrap_or_else(|| self.value.clone());
        self.with_value(f(current))
    }

    /// Replaces the group-level errors.
    pub fn with_errors(mut self, errors: ErrorSet) -> Self {
        self.form_errors = errors;
        self.errors = if self.self_enabled {
            self.child_errors.union(&self.form_errors)
        } else {
            ErrorSet::new()
        };
        self
    }

    pub fn mark_touched(mut self, touched: bool) -> Self {
        self.form_touched = Some(touched);
        self
    }

    pub fn mark_dirty(mut self, dirty: bool) -> Self {
        self.form_dirty = Some(dirty);
        self
    }

    pub fn enable(mut self, enabled: bool) -> Self {
        self.form_enabled = Some(enabled);
        self
    }

    pub(crate) fn mark_validating(mut self, validating: bool) -> Self {
        self.validating = validating;
        self
    }

    pub(crate) fn request_validation(mut self, requested: bool) -> Self {
        self.validation_requested = requested;
        self
    }

    /// Encodes the aggregated value as JSON.
    #[cfg(feature = "serde")]
    pub fn value_to_json(&self) -> serde_json::Value {
        FormValue::Map(self.value.clone()).to_json()
    }

    /// Deep equality of the aggregate, comparing errors as sets.
    pub fn matches(&self, other: &Self) -> bool {
        self.value == other.value
            && self.errors == other.errors
            && self.dirty == other.dirty
            && self.touched == other.touched
            && self.enabled == other.enabled
            && self.validating == other.validating
            && self.validation_requested == other.validation_requested
    }

    pub(crate) fn controls(&self) -> &Controls {
        &self.controls
    }

    pub(crate) fn pending_value(&self) -> Option<&ValueMap> {
        self.pending_value.as_ref()
    }

    /// Applies the pending instructions after they were pushed into the
    /// children: the overlay keeps the keys without a child, the enable
    /// instruction becomes the group's own flag, and every instruction is
    /// cleared.
    pub(crate) fn settle_instructions(mut self) -> Self {
        if let Some(value) = self.pending_value.take() {
            self.form_value = value
                .into_iter()
                .filter(|(key, _)| !self.controls.contains_key(key))
                .collect();
        }
        if let Some(enabled) = self.form_enabled.take() {
            self.self_enabled = enabled;
        }
        self.form_touched = None;
        self.form_dirty = None;
        self.controls_dirty = true;
        self
    }

    /// Recomputes the aggregate from the children if a child reported a change.
    pub(crate) fn refresh(&mut self) {
        if !self.controls_dirty {
            return;
        }

        let mut value = ValueMap::new();
        let mut child_errors = ErrorSet::new();
        let mut dirty = false;
        let mut touched = false;
        let mut all_enabled = true;

        if self.self_enabled {
            value.extend(self.form_value.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        for (key, entry) in self.controls.iter() {
            let child = entry.control.snapshot();
            dirty |= child.dirty;
            touched |= child.touched;
            all_enabled &= child.enabled;

            if self.self_enabled && child.enabled {
                value.insert(key.clone(), child.value);
                if !child.errors.is_empty() {
                    child_errors = child_errors.replace(&entry.path, child.errors);
                }
            }
        }

        self.value = value;
        self.dirty = dirty;
        self.touched = touched;
        self.enabled = self.self_enabled && all_enabled;
        self.errors = if self.self_enabled {
            child_errors.union(&self.form_errors)
        } else {
            ErrorSet::new()
        };
        self.child_errors = child_errors;
        self.controls_dirty = false;
    }

    pub(crate) fn refreshed(mut self) -> Self {
        self.refresh();
        self
    }

    pub(crate) fn self_enabled(&self) -> bool {
        self.self_enabled
    }

    pub(crate) fn snapshot(&self) -> ChildSnapshot {
        ChildSnapshot {
            value: FormValue::Map(self.value.clone()),
            errors: self.errors.clone(),
            dirty: self.dirty,
            touched: self.touched,
            enabled: self.enabled,
            validating: self.validating,
        }
    }
}

impl fmt::Debug for FormGroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormGroupState")
            .field("controls", &self.controls.keys().collect::<Vec<_>>())
            .field("value", &self.value)
            .field("errors", &self.errors)
            .field("dirty", &self.dirty)
            .field("touched", &self.touched)
            .field("enabled", &self.enabled)
            .field("validating", &self.validating)
            .field("validation_requested", &self.validation_requested)
            .field("form_value", &self.form_value)
            .field("form_errors", &self.form_errors)
            .field("form_touched", &self.form_touched)
            .field("form_dirty", &self.form_dirty)
            .field("form_enabled", &self.form_enabled)
            .field("controls_dirty", &self.controls_dirty)
            .finish()
    }
}

impl fmt::Display for FormGroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FormGroupState{{value={} errors={} dirty={} touched={} enabled={} validating={} validation_requested={}}}",
            FormValue::Map(self.value.clone()),
            self.errors,
            self.dirty,
            self.touched,
            self.enabled,
            self.validating,
            self.validation_requested
        )
    }
}

impl ControlState for FormGroupState {
    type Value = ValueMap;

    fn value(&self) -> &ValueMap {
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
        FormGroupState::mark_touched(self, touched)
    }

    fn mark_dirty(self, dirty: bool) -> Self {
        FormGroupState::mark_dirty(self, dirty)
    }

    fn enable(self, enabled: bool) -> Self {
        FormGroupState::enable(self, enabled)
    }

    fn matches(&self, other: &Self) -> bool {
        FormGroupState::matches(self, other)
    }
}
