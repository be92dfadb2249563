//! Reactive form state with asynchronous, cancellable validation.
//!
//! A form is a tree of controls. [`FieldControl`]s hold a single value and
//! its validators; [`GroupControl`]s aggregate named children into a map and
//! keep the value, errors and interaction flags of the subtree consistent.
//! Every committed state is an immutable snapshot delivered to observers.
//!
//! Validation is concurrent and "last write wins": a newer `transform` or
//! `validate` on a control supersedes the older ones, and a superseded run
//! never commits stale errors.
//!
//! Each submodule re-exports its public surface from here, so consumers can
//! simply depend on `form_rail::*` or pick focused pieces as needed.
//!
//! # Examples
//!
//! ## Field with a required value
//!
//! ```
//! use form_rail::prelude::*;
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let name = text_control("").validator(Required::new()).build();
//!
//! let state = name.validate().await.unwrap();
//! let error = state.errors().iter().next().unwrap();
//! assert_eq!(error.kind(), "required");
//! assert!(error.path().is_root());
//! # });
//! ```
//!
//! ## Errors scoped by path
//!
//! ```
//! use form_rail::prelude::*;
//!
//! let errors = ErrorSet::single(ValidationError::new("required", "value required"))
//!     .prefixed(&path!("address", "zip").unwrap());
//!
//! assert_eq!(errors.at(&path!("address").unwrap()).len(), 1);
//! assert!(errors.at(&path!("name").unwrap()).is_empty());
//! ```

/// Controls: field, group and the traits tying them together
pub mod control;
/// Converters between stored values and their text representation
pub mod convert;
/// Convenience re-exports for quick starts
pub mod prelude;
/// Immutable state snapshots
pub mod state;
/// Helpers for building transform closures
pub mod transform;
/// Extension points: validators and converters
pub mod traits;
/// Paths, validation errors, values and control errors
pub mod types;
/// Built-in validators
pub mod validators;

pub use control::{
    text_control, AnyControl, ChildPush, Control, ControlConfig, FieldControl, GroupControl,
    ParentLink,
};
pub use state::{ChildSnapshot, ControlState, FormGroupState, FormState};
pub use traits::*;
pub use types::*;
