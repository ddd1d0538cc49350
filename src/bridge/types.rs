// Tue Jan 20 2026 - Alex

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Values that cross the script/host boundary
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<HostValue>),
    Object(IndexMap<String, HostValue>),
}

impl HostValue {
    pub fn null() -> Self {
        HostValue::Null
    }

    pub fn string(s: impl Into<String>) -> Self {
        HostValue::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(n) => Some(*n),
            HostValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<HostValue>> {
        match self {
            HostValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, HostValue>> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Runtime type of this value. Never `Number` or `Any`.
    pub fn host_type(&self) -> HostType {
        match self {
            HostValue::Null => HostType::Null,
            HostValue::Boolean(_) => HostType::Boolean,
            HostValue::Integer(_) => HostType::Integer,
            HostValue::Float(_) => HostType::Float,
            HostValue::String(_) => HostType::String,
            HostValue::Array(_) => HostType::Array,
            HostValue::Object(_) => HostType::Object,
        }
    }

    /// Boundary decoding: JSON integers stay integers, every other number is a float.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Integer(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => HostValue::String(s.clone()),
            Value::Array(items) => HostValue::Array(items.iter().map(HostValue::from_json).collect()),
            Value::Object(map) => HostValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), HostValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Non-finite floats have no JSON form and encode as `null`, like `JSON.stringify`.
    pub fn to_json(&self) -> Value {
        match self {
            HostValue::Null => Value::Null,
            HostValue::Boolean(b) => Value::Bool(*b),
            HostValue::Integer(n) => Value::Number((*n).into()),
            HostValue::Float(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            HostValue::String(s) => Value::String(s.clone()),
            HostValue::Array(items) => Value::Array(items.iter().map(HostValue::to_json).collect()),
            HostValue::Object(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                Value::Object(out)
            }
        }
    }
}

impl Default for HostValue {
    fn default() -> Self {
        HostValue::Null
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Boolean(b)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Integer(n as i64)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Integer(n)
    }
}

impl From<usize> for HostValue {
    fn from(n: usize) -> Self {
        HostValue::Integer(n as i64)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Float(n)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(HostValue::Null)
    }
}

impl From<&Value> for HostValue {
    fn from(value: &Value) -> Self {
        HostValue::from_json(value)
    }
}

/// Type descriptors for declared parameters and runtime arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Null,
    Boolean,
    Integer,
    Float,
    /// Integer or Float
    Number,
    String,
    Array,
    Object,
    Any,
}

impl HostType {
    /// Whether a parameter declared as `self` takes an argument whose runtime type is `actual`.
    pub fn accepts(&self, actual: HostType) -> bool {
        match self {
            HostType::Any => true,
            HostType::Number => matches!(actual, HostType::Integer | HostType::Float),
            declared => *declared == actual,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HostType::Null => "null",
            HostType::Boolean => "boolean",
            HostType::Integer => "integer",
            HostType::Float => "float",
            HostType::Number => "number",
            HostType::String => "string",
            HostType::Array => "array",
            HostType::Object => "object",
            HostType::Any => "any",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
