//! Extension points of the crate.
//!
//! - [`Validator`]: async check producing the errors of a state snapshot
//! - [`ValidatorExt`]: combinators such as [`apply_when`](ValidatorExt::apply_when)
//! - [`Converter`]: mapping between a stored value and its external form
//!
//! # Examples
//!
//! ```
//! use form_rail::traits::Converter;
//! use form_rail::convert::IntConverter;
//!
//! let converter = IntConverter::new(false);
//! assert_eq!(converter.from_external("12a3".to_string()), Some(123));
//! assert_eq!(converter.to_external(None), "");
//! ```

pub mod converter;
pub mod validator;

pub use converter::Converter;
pub use validator::{validator_fn, ApplyWhen, FnValidator, Validator, ValidatorExt};
