//! Failures raised by control operations.
//!
//! Validation problems are *data* ([`ErrorSet`](crate::types::ErrorSet)) and
//! never appear here. The types below describe misuse (binding, malformed keys,
//! mismatched values) and validators that broke while running.
use core::fmt;

use crate::types::PathError;

/// Error raised when a control is attached to a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    /// The control already has a parent group.
    AlreadyBound,
    /// The requested parent is not a group control.
    NotAGroup,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound => f.write_str("control is already bound to a parent group"),
            Self::NotAGroup => f.write_str("a control can only be bound to a group control"),
        }
    }
}

impl std::error::Error for BindingError {}

/// A validator that failed to produce a verdict.
///
/// Returned by validators through `Err`, and synthesized when a validator
/// task panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorFailure {
    message: String,
}

impl ValidatorFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidatorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validator failed: {}", self.message)
    }
}

impl std::error::Error for ValidatorFailure {}

impl From<String> for ValidatorFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidatorFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<tokio::task::JoinError> for ValidatorFailure {
    fn from(error: tokio::task::JoinError) -> Self {
        if error.is_panic() {
            Self::new("validator panicked")
        } else {
            Self::new("validator task was cancelled")
        }
    }
}

/// Error returned by control operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    Binding(BindingError),
    /// A control key is not a valid path segment.
    Path(PathError),
    /// At least one validator failed; the control still committed the errors
    /// of the validators that succeeded.
    Validator(ValidatorFailure),
    /// A group pushed a value of the wrong shape into a child.
    ValueMismatch { key: String, expected: &'static str, found: &'static str },
    /// A spawned job could not complete.
    Runtime(String),
}

impl ControlError {
    /// Scopes a value mismatch reported by a child under the child's key.
    pub(crate) fn within(self, parent_key: &str) -> Self {
        match self {
            Self::ValueMismatch { key, expected, found } => {
                let key = if key.is_empty() { parent_key.to_string() } else { format!("{}/{}", parent_key, key) };
                Self::ValueMismatch { key, expected, found }
            },
            other => other,
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding(error) => write!(f, "{}", error),
            Self::Path(error) => write!(f, "{}", error),
            Self::Validator(failure) => write!(f, "{}", failure),
            Self::ValueMismatch { key, expected, found } => {
                write!(f, "control {} expects a {} value (got {})", key, expected, found)
            },
            Self::Runtime(message) => write!(f, "control job failed: {}", message),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Binding(error) => Some(error),
            Self::Path(error) => Some(error),
            Self::Validator(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<BindingError> for ControlError {
    fn from(error: BindingError) -> Self {
        Self::Binding(error)
    }
}

impl From<PathError> for ControlError {
    fn from(error: PathError) -> Self {
        Self::Path(error)
    }
}

impl From<ValidatorFailure> for ControlError {
    fn from(failure: ValidatorFailure) -> Self {
        Self::Validator(failure)
    }
}

impl From<tokio::task::JoinError> for ControlError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Runtime(error.to_string())
    }
}

/// Result alias for control operations.
pub type ControlResult<T> = Result<T, ControlError>;
