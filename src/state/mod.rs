//! Immutable state snapshots held by controls.
//!
//! - [`FormState`] is the state of a single field.
//! - [`FormGroupState`] is the derived state of a group: the aggregation of
//!   its children plus group-level data.
//!
//! Both implement [`ControlState`], the capability set the rest of the crate
//! relies on. Every builder-style method consumes the state and returns a new
//! one; nothing is mutated in place.
//!
//! # Examples
//!
//! ```
//! use form_rail::state::{ControlState, FormState};
//!
//! let state = FormState::new(String::from("hello"));
//! let touched = state.clone().mark_touched(true);
//!
//! assert!(!state.touched());
//! assert!(touched.touched());
//! assert!(!touched.matches(&state));
//! ```
use crate::types::ErrorSet;

pub mod field;
pub mod group;

pub use field::FormState;
pub use group::{ChildSnapshot, FormGroupState};

/// Read access to the flags every state carries, plus the writes a parent
/// may push into it.
pub trait ControlState: Clone + Send + Sync + 'static {
    /// Type of the value this state holds.
    type Value;

    fn value(&self) -> &Self::Value;

    fn errors(&self) -> &ErrorSet;

    fn dirty(&self) -> bool;

    fn touched(&self) -> bool;

    fn enabled(&self) -> bool;

    /// `true` while a validation run is in flight.
    fn validating(&self) -> bool;

    /// `true` while the in-flight run was requested explicitly through
    /// `validate()` rather than triggered by a change.
    fn validation_requested(&self) -> bool;

    #[must_use]
    fn mark_touched(self, touched: bool) -> Self;

    #[must_use]
    fn mark_dirty(self, dirty: bool) -> Self;

    #[must_use]
    fn enable(self, enabled: bool) -> Self;

    /// Deep equality of value, errors (as sets) and flags.
    ///
    /// Subscribers use this to skip redundant notifications.
    fn matches(&self, other: &Self) -> bool;
}
