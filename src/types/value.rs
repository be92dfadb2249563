//! Typed values stored in controls and aggregated by groups.
//!
//! Groups hold children of different value types, so their aggregated value
//! is a [`FormValue`] tree. Only the variants below can be represented, which
//! keeps equality and JSON encoding total.
use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mapping from control key to value, as produced by a group.
pub type ValueMap = BTreeMap<String, FormValue>;

/// A value held by a control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FormValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Map(ValueMap),
}

impl FormValue {
    /// Short name of the variant, used in mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Map(_) => "map",
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Encodes this value as JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Int(value) => serde_json::Value::from(*value),
            Self::Text(value) => serde_json::Value::String(value.clone()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{:?}", value),
            Self::Map(map) => {
                f.write_str("{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FormValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<ValueMap> for FormValue {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}

/// Error returned when a JSON value has no [`FormValue`] representation.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedValue {
    pub found: &'static str,
}

#[cfg(feature = "serde")]
impl fmt::Display for UnsupportedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {} not supported", self.found)
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for UnsupportedValue {}

#[cfg(feature = "serde")]
impl TryFrom<&serde_json::Value> for FormValue {
    type Error = UnsupportedValue;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(value) => Ok(Self::Bool(*value)),
            Value::Number(number) => {
                number.as_i64().map(Self::Int).ok_or(UnsupportedValue { found: "float" })
            },
            Value::String(value) => Ok(Self::Text(value.clone())),
            Value::Array(_) => Err(UnsupportedValue { found: "array" }),
            Value::Object(object) => object
                .iter()
                .map(|(key, value)| Ok((key.clone(), FormValue::try_from(value)?)))
                .collect::<Result<ValueMap, _>>()
                .map(Self::Map),
        }
    }
}

/// A Rust type that a field control can store.
///
/// Field values travel through groups as [`FormValue`]s; this trait converts
/// in both directions. `from_form_value` returns `None` when the value has the
/// wrong shape.
pub trait FieldValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    fn to_form_value(&self) -> FormValue;

    fn from_form_value(value: &FormValue) -> Option<Self>;

    /// Name of the expected [`FormValue`] variant.
    fn expected_kind() -> &'static str;
}

impl FieldValue for String {
    fn to_form_value(&self) -> FormValue {
        FormValue::Text(self.clone())
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn expected_kind() -> &'static str {
        "text"
    }
}

impl FieldValue for bool {
    fn to_form_value(&self) -> FormValue {
        FormValue::Bool(*self)
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        match value {
            FormValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    fn expected_kind() -> &'static str {
        "bool"
    }
}

impl FieldValue for i64 {
    fn to_form_value(&self) -> FormValue {
        FormValue::Int(*self)
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        match value {
            FormValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    fn expected_kind() -> &'static str {
        "int"
    }
}

impl FieldValue for i32 {
    fn to_form_value(&self) -> FormValue {
        FormValue::Int(i64::from(*self))
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        match value {
            FormValue::Int(value) => i32::try_from(*value).ok(),
            _ => None,
        }
    }

    fn expected_kind() -> &'static str {
        "int"
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_form_value(&self) -> FormValue {
        self.as_ref().map_or(FormValue::Null, FieldValue::to_form_value)
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        match value {
            FormValue::Null => Some(None),
            other => T::from_form_value(other).map(Some),
        }
    }

    fn expected_kind() -> &'static str {
        T::expected_kind()
    }
}

impl FieldValue for FormValue {
    fn to_form_value(&self) -> FormValue {
        self.clone()
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        Some(value.clone())
    }

    fn expected_kind() -> &'static str {
        "any"
    }
}

impl FieldValue for ValueMap {
    fn to_form_value(&self) -> FormValue {
        FormValue::Map(self.clone())
    }

    fn from_form_value(value: &FormValue) -> Option<Self> {
        value.as_map().cloned()
    }

    fn expected_kind() -> &'static str {
        "map"
    }
}
