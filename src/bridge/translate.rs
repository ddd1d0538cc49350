// Tue Jan 20 2026 - Alex

//! JSON result translation.
//!
//! Turns the decoded result of a script evaluation into host-native values.
//! Integral numbers become `Integer` (so `2.0` reads back as `2`), empty arrays
//! are always `NumberArray`, and array element kind is decided by the first
//! element. Translation is shallow: nested arrays and objects are kept as raw
//! JSON.

use serde_json::{Map, Value};
use std::fmt;

/// Host-native form of an evaluation result
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    BooleanArray(Vec<bool>),
    NumberArray(Vec<f64>),
    StringArray(Vec<String>),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl TranslatedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TranslatedValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TranslatedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TranslatedValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TranslatedValue::Float(n) => Some(*n),
            TranslatedValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TranslatedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            TranslatedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Message of an `{"error": ...}` result, if this is one.
    pub fn error_message(&self) -> Option<&str> {
        self.as_object()
            .and_then(|map| map.get("error"))
            .and_then(Value::as_str)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TranslatedValue::Null => "null",
            TranslatedValue::Boolean(_) => "boolean",
            TranslatedValue::Integer(_) => "integer",
            TranslatedValue::Float(_) => "float",
            TranslatedValue::String(_) => "string",
            TranslatedValue::BooleanArray(_) => "boolean[]",
            TranslatedValue::NumberArray(_) => "number[]",
            TranslatedValue::StringArray(_) => "string[]",
            TranslatedValue::Array(_) => "array",
            TranslatedValue::Object(_) => "object",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            TranslatedValue::Null => Value::Null,
            TranslatedValue::Boolean(b) => Value::Bool(*b),
            TranslatedValue::Integer(n) => Value::from(*n),
            TranslatedValue::Float(n) => Value::from(*n),
            TranslatedValue::String(s) => Value::from(s.as_str()),
            TranslatedValue::BooleanArray(items) => Value::from(items.clone()),
            TranslatedValue::NumberArray(items) => Value::from(items.clone()),
            TranslatedValue::StringArray(items) => Value::from(items.clone()),
            TranslatedValue::Array(items) => Value::Array(items.clone()),
            TranslatedValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl fmt::Display for TranslatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Translate a decoded JSON value into its host-native form.
pub fn translate(value: &Value) -> TranslatedValue {
    match value {
        Value::Null => TranslatedValue::Null,
        Value::Bool(b) => TranslatedValue::Boolean(*b),
        Value::Number(_) => translate_number(value),
        Value::String(s) => TranslatedValue::String(s.clone()),
        Value::Array(items) => translate_array(items),
        Value::Object(map) => TranslatedValue::Object(map.clone()),
    }
}

/// Decode `json` and translate it.
pub fn translate_str(json: &str) -> Result<TranslatedValue, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    Ok(translate(&value))
}

fn translate_number(value: &Value) -> TranslatedValue {
    if let Some(n) = value.as_i64() {
        return TranslatedValue::Integer(n);
    }

    let n = value.as_f64().unwrap_or(f64::NAN);
    if n.is_finite() && n.trunc() == n && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        TranslatedValue::Integer(n as i64)
    } else {
        TranslatedValue::Float(n)
    }
}

fn translate_array(items: &[Value]) -> TranslatedValue {
    let first = match items.first() {
        Some(first) => first,
        None => return TranslatedValue::NumberArray(Vec::new()),
    };

    let homogeneous = match first {
        Value::Bool(_) => items
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<_>>>()
            .map(TranslatedValue::BooleanArray),
        Value::Number(_) => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<_>>>()
            .map(TranslatedValue::NumberArray),
        Value::String(_) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(TranslatedValue::StringArray),
        _ => None,
    };

    homogeneous.unwrap_or_else(|| {
        if matches!(first, Value::Bool(_) | Value::Number(_) | Value::String(_)) {
            log::warn!("Mixed array starting with {}, keeping elements untyped", first);
        }
        TranslatedValue::Array(items.to_vec())
    })
}
