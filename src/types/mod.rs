//! Data model shared by every control.
//!
//! This module provides paths, validation errors and the values controls
//! hold. Everything here is an immutable value type; the mutable parts of the
//! crate live in [`crate::control`].
//!
//! # Examples
//!
//! ```
//! use form_rail::types::{ErrorSet, Path, ValidationError};
//!
//! let child = ErrorSet::single(ValidationError::new("required", "value required"));
//! let scoped = child.prefixed(&Path::new(["first_name"]).unwrap());
//!
//! assert_eq!(scoped.iter().next().unwrap().path().to_string(), "/first_name");
//! ```
use smallvec::SmallVec;

pub mod control_error;
pub mod error_set;
pub mod path;
pub mod validation_error;
pub mod value;

pub use control_error::*;
pub use error_set::*;
pub use path::*;
pub use validation_error::*;
pub use value::*;

/// SmallVec-backed collection used for accumulating validation errors.
///
/// Uses inline storage for up to 2 elements; most fields report at most one
/// or two errors at a time.
pub type ErrorVec<E> = SmallVec<[E; 2]>;
