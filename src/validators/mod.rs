//! Built-in validators for field states.
//!
//! | Validator | Error kind | Applies to |
//! |-----------|------------|------------|
//! | [`Required`] | `required` | text (blank after trimming), `Option` (`None`) |
//! | [`Pattern`] | `pattern` | text, full match of a regular expression |
//! | [`Min`] / [`Max`] | `min` / `max` | integers; `None` is left to [`Required`] |
//!
//! Errors are reported at the root path of the field; a parent group scopes
//! them under the field's key.
//!
//! # Examples
//!
//! ```
//! use form_rail::prelude::*;
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let zip = Pattern::new(r"\d{5}").unwrap();
//!
//! let errors = zip.validate(&FormState::new("1234a".to_string())).await.unwrap();
//! assert_eq!(errors.iter().next().unwrap().kind(), "pattern");
//!
//! let errors = zip.validate(&FormState::new("12345".to_string())).await.unwrap();
//! assert!(errors.is_empty());
//! # });
//! ```

use async_trait::async_trait;
use regex::Regex;

use crate::state::FormState;
use crate::traits::Validator;
use crate::types::{ErrorSet, FieldValue, ValidationError, ValidatorFailure};

/// Values that can be missing.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T: Blank> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, Blank::is_blank)
    }
}

impl Blank for i32 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for i64 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for bool {
    fn is_blank(&self) -> bool {
        false
    }
}

/// Values that can be compared as integers.
pub trait AsInteger {
    fn as_integer(&self) -> Option<i64>;
}

impl AsInteger for i32 {
    fn as_integer(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl AsInteger for i64 {
    fn as_integer(&self) -> Option<i64> {
        Some(*self)
    }
}

impl<T: AsInteger> AsInteger for Option<T> {
    fn as_integer(&self) -> Option<i64> {
        self.as_ref().and_then(AsInteger::as_integer)
    }
}

fn single(kind: &str, message: &str) -> ErrorSet {
    ErrorSet::single(ValidationError::new(kind, message))
}

/// Rejects blank values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Required {
    message: String,
}

impl Required {
    pub fn new() -> Self {
        Self { message: "value required".to_string() }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: FieldValue + Blank> Validator<FormState<V>> for Required {
    async fn validate(&self, state: &FormState<V>) -> Result<ErrorSet, ValidatorFailure> {
        if state.value().is_blank() {
            Ok(single("required", &self.message))
        } else {
            Ok(ErrorSet::new())
        }
    }
}

/// Requires the whole text to match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    message: String,
}

impl Pattern {
    /// Compiles `pattern`, anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex, message: "wrong value".to_string() })
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

#[async_trait]
impl Validator<FormState<String>> for Pattern {
    async fn validate(&self, state: &FormState<String>) -> Result<ErrorSet, ValidatorFailure> {
        if self.is_match(state.value()) {
            Ok(ErrorSet::new())
        } else {
            Ok(single("pattern", &self.message))
        }
    }
}

/// Lower bound for integer values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Min {
    min: i64,
    message: String,
}

impl Min {
    pub fn new(min: i64) -> Self {
        Self { min, message: format!("must be greater than {}", min) }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[async_trait]
impl<V: FieldValue + AsInteger> Validator<FormState<V>> for Min {
    async fn validate(&self, state: &FormState<V>) -> Result<ErrorSet, ValidatorFailure> {
        match state.value().as_integer() {
            Some(value) if value < self.min => Ok(single("min", &self.message)),
            _ => Ok(ErrorSet::new()),
        }
    }
}

/// Upper bound for integer values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Max {
    max: i64,
    message: String,
}

impl Max {
    pub fn new(max: i64) -> Self {
        Self { max, message: format!("must be lower than {}", max) }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[async_trait]
impl<V: FieldValue + AsInteger> Validator<FormState<V>> for Max {
    async fn validate(&self, state: &FormState<V>) -> Result<ErrorSet, ValidatorFailure> {
        match state.value().as_integer() {
            Some(value) if value > self.max => Ok(single("max", &self.message)),
            _ => Ok(ErrorSet::new()),
        }
    }
}
