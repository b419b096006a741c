//! Attribute value model.
//!
//! A span attribute is a tagged union over four primitive kinds and
//! homogeneous arrays of each. Mixed-type arrays are deliberately not a
//! representable shape; they are rejected at the encoding boundary rather
//! than silently truncated.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A value attachable to a span under a string key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    BoolArray(Vec<bool>),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl AttributeValue {
    /// Human-readable kind tag, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Int(_) => "int",
            AttributeValue::Float(_) => "float",
            AttributeValue::String(_) => "string",
            AttributeValue::BoolArray(_) => "bool[]",
            AttributeValue::IntArray(_) => "int[]",
            AttributeValue::FloatArray(_) => "float[]",
            AttributeValue::StringArray(_) => "string[]",
        }
    }

    /// Encode a dynamic JSON value into a typed attribute value.
    ///
    /// Dispatch, in priority order:
    /// 1. supported scalars encode directly (JSON numbers that fit `i64`
    ///    stay integers, anything else becomes `f64`);
    /// 2. arrays must share one primitive kind; an empty array encodes as an
    ///    empty **string** array (the encoder default);
    /// 3. `null` encodes as `Ok(None)`; the caller writes no key;
    /// 4. objects, nested arrays, null elements, and mixed-kind arrays are
    ///    [`Error::UnsupportedAttributeShape`].
    pub fn from_json(value: &serde_json::Value) -> Result<Option<Self>> {
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Bool(b) => Ok(Some(AttributeValue::Bool(*b))),
            serde_json::Value::Number(n) => Ok(Some(number_to_value(n))),
            serde_json::Value::String(s) => Ok(Some(AttributeValue::String(s.clone()))),
            serde_json::Value::Array(items) => array_to_value(items).map(Some),
            serde_json::Value::Object(_) => Err(Error::UnsupportedAttributeShape(
                "nested objects are not representable as span attributes".to_string(),
            )),
        }
    }
}

fn number_to_value(n: &serde_json::Number) -> AttributeValue {
    if let Some(i) = n.as_i64() {
        AttributeValue::Int(i)
    } else {
        // u64 beyond i64::MAX or a fractional number; every JSON number has
        // an f64 reading.
        AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn array_to_value(items: &[serde_json::Value]) -> Result<AttributeValue> {
    let Some(first) = items.first() else {
        // Documented default for empty sequences.
        return Ok(AttributeValue::StringArray(Vec::new()));
    };

    match first {
        serde_json::Value::Bool(_) => items
            .iter()
            .map(|v| match v {
                serde_json::Value::Bool(b) => Ok(*b),
                other => Err(mixed_array(other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(AttributeValue::BoolArray),
        serde_json::Value::Number(first_n) => {
            // An array of numbers is integer-typed only when every element
            // reads as i64; a single fractional element makes it mixed, not
            // coerced.
            if first_n.as_i64().is_some() {
                items
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| mixed_array(v)),
                        other => Err(mixed_array(other)),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(AttributeValue::IntArray)
            } else {
                items
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::Number(n) if n.as_i64().is_none() => {
                            Ok(n.as_f64().unwrap_or(f64::NAN))
                        }
                        other => Err(mixed_array(other)),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(AttributeValue::FloatArray)
            }
        }
        serde_json::Value::String(_) => items
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => Ok(s.clone()),
                other => Err(mixed_array(other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(AttributeValue::StringArray),
        serde_json::Value::Null => Err(Error::UnsupportedAttributeShape(
            "arrays may not contain null elements".to_string(),
        )),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(Error::UnsupportedAttributeShape(
                "arrays must contain primitive elements only".to_string(),
            ))
        }
    }
}

fn mixed_array(offending: &serde_json::Value) -> Error {
    let kind = match offending {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.as_i64().is_some() => "int",
        serde_json::Value::Number(_) => "float",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    };
    Error::UnsupportedAttributeShape(format!(
        "mixed-type array: unexpected {kind} element in a homogeneous array"
    ))
}

// ---------------------------------------------------------------------------
// Conversions from natural Rust types
// ---------------------------------------------------------------------------

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<Vec<bool>> for AttributeValue {
    fn from(v: Vec<bool>) -> Self {
        AttributeValue::BoolArray(v)
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(v: Vec<i64>) -> Self {
        AttributeValue::IntArray(v)
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(v: Vec<f64>) -> Self {
        AttributeValue::FloatArray(v)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        AttributeValue::StringArray(v)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(v: Vec<&str>) -> Self {
        AttributeValue::StringArray(v.into_iter().map(str::to_string).collect())
    }
}
