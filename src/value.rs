//! Typed values coerced from raw environment strings.
//!
//! The environment only stores strings. [`parse`] infers a native type on
//! the way out; [`Value`]'s `Display` impl produces the string that goes
//! back in. Booleans, integers and floats round-trip exactly.

use serde::ser::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

/// A value coerced from, or destined for, the environment store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A JSON-decoded structure (object or array).
    Json(Json),
    Str(String),
}

/// Coerce a raw environment string into a typed value.
///
/// Rules are tried in order and the first match wins:
/// exact `true`/`false`, integer, float, JSON object/array, raw string.
/// This never fails; a string that matches nothing comes back unchanged.
///
/// ```
/// use envscope::{parse, Value};
///
/// assert_eq!(parse("3000"), Value::Int(3000));
/// assert_eq!(parse("12/>SDc80"), Value::Str("12/>SDc80".to_string()));
/// ```
pub fn parse(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    if raw.trim_start().starts_with(['{', '[']) {
        if let Ok(json) = serde_json::from_str::<Json>(raw) {
            return Value::Json(json);
        }
    }
    Value::Str(raw.to_string())
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Json> {
        match self {
            Value::Json(json) => Some(json),
            _ => None,
        }
    }

    /// The nested-object view, if this value holds a JSON object.
    pub fn as_object(&self) -> Option<&serde_json::Map<String, Json>> {
        self.as_json().and_then(Json::as_object)
    }
}

/// The string form written to the environment store.
///
/// Scalars stringify directly with no JSON quoting; structures serialize
/// to compact JSON. Whole-number floats keep a trailing `.0` so they
/// re-parse as floats rather than integers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) if x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Json(Json::String(s)) => f.write_str(s),
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Json(json) => json.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::Json(json)
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Json::Bool(b),
            Value::Int(n) => Json::from(n),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s),
            Value::Json(json) => json,
        }
    }
}
