//! Converters between stored values and their text representation.
//!
//! Number inputs store an `Option<i32>` but are edited as text. The helpers
//! here sanitize that text: non-digit characters are dropped, the digit count
//! is bounded by `i32::MAX`, and a leading `-` is kept only when negatives are
//! allowed.
//!
//! # Examples
//!
//! ```
//! use form_rail::convert::{process_number, string_to_int};
//!
//! assert_eq!(process_number("1a2b3", "2147483647", true), "123");
//! assert_eq!(process_number("-42", "2147483647", true), "-42");
//! assert_eq!(process_number("-42", "2147483647", false), "");
//! assert_eq!(string_to_int("99999999999", true), Some(999_999_999));
//! assert_eq!(string_to_int("abc", true), None);
//! ```

use core::marker::PhantomData;

use crate::state::FormState;
use crate::traits::Converter;

const I32_MAX: &str = "2147483647";

/// Keeps the digits of `input`, bounded by `max_value`.
///
/// When at least as many digits as `max_value` are present, the input is cut
/// to that many digits; if the result is still greater than `max_value`, the
/// last digit is dropped as well.
pub fn process_number(input: &str, max_value: &str, allow_negative: bool) -> String {
    let negative = input.trim_start().starts_with('-');
    if negative && !allow_negative {
        return String::new();
    }

    let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= max_value.len() {
        digits.truncate(max_value.len());
        // Equal-length digit strings compare like the numbers they spell.
        if digits.as_str() > max_value {
            digits.pop();
        }
    }

    if negative {
        digits.insert(0, '-');
    }
    digits
}

/// Parses sanitized text into an `i32`, `None` when no digits remain.
pub fn string_to_int(value: &str, allow_negative: bool) -> Option<i32> {
    process_number(value, I32_MAX, allow_negative).parse().ok()
}

/// Converts between text and `Option<i32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntConverter {
    allow_negative: bool,
}

impl IntConverter {
    pub fn new(allow_negative: bool) -> Self {
        Self { allow_negative }
    }

    #[inline]
    pub fn allow_negative(&self) -> bool {
        self.allow_negative
    }
}

impl Default for IntConverter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Converter for IntConverter {
    type Internal = Option<i32>;
    type External = String;

    fn from_external(&self, external: String) -> Option<i32> {
        string_to_int(&external, self.allow_negative)
    }

    fn to_external(&self, internal: Option<i32>) -> String {
        internal.map(|value| value.to_string()).unwrap_or_default()
    }
}

/// Converter that leaves values untouched.
pub struct IdentityConverter<T>(PhantomData<fn(T) -> T>);

impl<T> IdentityConverter<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for IdentityConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for IdentityConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for IdentityConverter<T> {}

impl<T> Converter for IdentityConverter<T> {
    type Internal = T;
    type External = T;

    fn from_external(&self, external: T) -> T {
        external
    }

    fn to_external(&self, internal: T) -> T {
        internal
    }
}

/// Lifts a value converter to whole field states, carrying errors and flags.
///
/// ```
/// use form_rail::convert::{IntConverter, StateConverter};
/// use form_rail::state::FormState;
/// use form_rail::traits::Converter;
///
/// let converter = StateConverter::new(IntConverter::default());
/// let text = FormState::new("12".to_string()).mark_touched(true);
///
/// let number = converter.from_external(text);
/// assert_eq!(*number.value(), Some(12));
/// assert!(number.touched());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StateConverter<C> {
    inner: C,
}

impl<C> StateConverter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Converter> Converter for StateConverter<C> {
    type Internal = FormState<C::Internal>;
    type External = FormState<C::External>;

    fn from_external(&self, external: Self::External) -> Self::Internal {
        external.convert(|value| self.inner.from_external(value))
    }

    fn to_external(&self, internal: Self::Internal) -> Self::External {
        internal.convert(|value| self.inner.to_external(value))
    }
}
