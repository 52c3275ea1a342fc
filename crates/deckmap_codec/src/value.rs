//! Field types and dynamic field values.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer.
    Int,
    /// IEEE-754 binary64.
    Double,
    /// Boolean.
    Bool,
}

impl FieldType {
    /// All field types, in tag order.
    pub const ALL: [FieldType; 4] = [Self::String, Self::Int, Self::Double, Self::Bool];

    /// Parses a schema type token, case-insensitively.
    ///
    /// Accepts the canonical tokens plus the common aliases `str`,
    /// `integer`, `long`, `float` and `boolean`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "string" | "str" => Some(Self::String),
            "int" | "integer" | "long" => Some(Self::Int),
            "double" | "float" => Some(Self::Double),
            "bool" | "boolean" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Returns the canonical schema token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "bool",
        }
    }

    /// Returns the one-byte tag used by the binary codec.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::String => 1,
            Self::Int => 2,
            Self::Double => 3,
            Self::Bool => 4,
        }
    }

    /// Looks up a field type by its binary tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::String),
            2 => Some(Self::Int),
            3 => Some(Self::Double),
            4 => Some(Self::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single field value.
///
/// Serializes untagged, so JSON output shows plain strings, numbers and
/// booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Text value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl Value {
    /// Returns the field type this value belongs to.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Value::Str(_) => FieldType::String,
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Double,
            Value::Bool(_) => FieldType::Bool,
        }
    }

    /// Parses `text` as a value of type `ty`.
    ///
    /// Strings are taken verbatim, integers and doubles use Rust's standard
    /// parsers, booleans accept `true`/`false` in any case.
    ///
    /// Returns `None` if the text is not a valid literal of that type.
    #[must_use]
    pub fn parse_as(ty: FieldType, text: &str) -> Option<Self> {
        match ty {
            FieldType::String => Some(Value::Str(text.to_string())),
            FieldType::Int => text.parse().ok().map(Value::Int),
            FieldType::Double => text.parse().ok().map(Value::Float),
            FieldType::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
        }
    }

    /// Get this value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float, if it is one.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Formats the value the way the text codec writes it, unescaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Rust types that can be copied out of a field value.
///
/// This is the typed accessor behind [`crate::Record::get_value`].
pub trait FromValue: Sized {
    /// The field type this Rust type corresponds to.
    const FIELD_TYPE: FieldType;

    /// Extracts `Self` from `value`, which belongs to `field`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TypeMismatch`] if the value holds another type.
    fn from_value(field: &str, value: &Value) -> CodecResult<Self>;
}

fn mismatch(field: &str, value: &Value, wanted: FieldType) -> CodecError {
    CodecError::TypeMismatch {
        field: field.to_string(),
        expected: value.field_type(),
        actual: wanted,
    }
}

impl FromValue for String {
    const FIELD_TYPE: FieldType = FieldType::String;

    fn from_value(field: &str, value: &Value) -> CodecResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(field, value, Self::FIELD_TYPE))
    }
}

impl FromValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Int;

    fn from_value(field: &str, value: &Value) -> CodecResult<Self> {
        value
            .as_int()
            .ok_or_else(|| mismatch(field, value, Self::FIELD_TYPE))
    }
}

impl FromValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Double;

    fn from_value(field: &str, value: &Value) -> CodecResult<Self> {
        value
            .as_float()
            .ok_or_else(|| mismatch(field, value, Self::FIELD_TYPE))
    }
}

impl FromValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn from_value(field: &str, value: &Value) -> CodecResult<Self> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(field, value, Self::FIELD_TYPE))
    }
}
