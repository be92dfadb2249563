//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use form_rail::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Controls**: [`FieldControl`], [`GroupControl`], [`text_control`], [`ControlConfig`]
//! - **State**: [`FormState`], [`FormGroupState`], [`ControlState`]
//! - **Data**: [`ErrorSet`], [`ValidationError`], [`Path`], [`FormValue`], [`ValueMap`]
//! - **Validation**: [`Validator`], [`ValidatorExt`], [`validator_fn`] and the
//!   built-in [`Required`], [`Pattern`], [`Min`], [`Max`]
//! - **Traits**: [`Control`], [`AnyControl`], [`Converter`]
//!
//! # Examples
//!
//! ```
//! use form_rail::prelude::*;
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let email = text_control("").validator(Required::new()).build();
//! let form = GroupControl::builder().control("email", email).build()?;
//!
//! let state = form.validate().await?;
//! assert_eq!(state.errors().len(), 1);
//! # Ok::<(), ControlError>(())
//! # }).unwrap();
//! ```

// Macros
pub use crate::path;

// Controls
pub use crate::control::{
    text_control, AnyControl, CallbackId, Control, ControlConfig, FieldControl, GroupControl,
    StateStream,
};

// State
pub use crate::state::{ControlState, FormGroupState, FormState};

// Data model
pub use crate::types::{
    BindingError, ControlError, ControlResult, ErrorSet, FieldValue, FormValue, Path, PathError,
    ValidationError, ValidatorFailure, ValueMap,
};

// Validation
pub use crate::traits::{validator_fn, Converter, Validator, ValidatorExt};
pub use crate::validators::{Max, Min, Pattern, Required};
