//! Helpers building the closures passed to `transform`.
//!
//! # Examples
//!
//! ```
//! use form_rail::prelude::*;
//! use form_rail::transform::{errors_when_touched, when_touched};
//!
//! let state = FormState::new(String::new())
//!     .with_errors(ErrorSet::single(ValidationError::new("required", "value required")));
//!
//! // Untouched fields do not display their errors yet.
//! assert!(errors_when_touched(&state).is_empty());
//!
//! let upper = when_touched(|state: FormState<String>| state.map_value(|v| v.to_uppercase()));
//! assert_eq!(upper(state.with_value("ab".to_string())).value(), "ab");
//! ```

use crate::state::{ControlState, FormState};
use crate::types::{ErrorSet, Path};

/// Applies `f` only if `condition` holds.
pub fn when<S, F>(condition: bool, f: F) -> impl FnOnce(S) -> S
where
    F: FnOnce(S) -> S,
{
    move |state| if condition { f(state) } else { state }
}

/// Applies `f` only to a touched state.
pub fn when_touched<S, F>(f: F) -> impl FnOnce(S) -> S
where
    S: ControlState,
    F: FnOnce(S) -> S,
{
    move |state| if state.touched() { f(state) } else { state }
}

/// Adds the errors of `other` to the field, at the field's root.
///
/// Used to surface errors computed elsewhere (a group validator comparing two
/// fields, for instance) on the field that should display them.
pub fn merge_errors<V, O>(other: &O) -> impl FnOnce(FormState<V>) -> FormState<V>
where
    O: ControlState,
{
    let extra: ErrorSet = other.errors().iter().cloned().map(|error| error.at(Path::root())).collect();
    move |state| {
        let errors = state.errors().union(&extra);
        state.with_errors(errors)
    }
}

/// Errors worth displaying: none until the user touched the control.
pub fn errors_when_touched<S: ControlState>(state: &S) -> ErrorSet {
    if state.touched() {
        state.errors().clone()
    } else {
        ErrorSet::new()
    }
}
