//! Envelope Types
//!
//! Closed value model for records sealed by the codec, plus the mapping to
//! and from `serde_json::Value`. No crypto here - only data structures.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde_json::{Map, Number, Value as JsonValue};

use super::error::{EnvelopeError, EnvelopeResult};

// ============================================================================
// VALUE
// ============================================================================

/// A single value inside a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    fn to_json_at(&self, path: &str) -> EnvelopeResult<JsonValue> {
        Ok(match self {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number(Number::from(*i)),
            Value::Float(f) => {
                // serde_json would silently write `null` for these
                let number = Number::from_f64(*f).ok_or_else(|| {
                    EnvelopeError::EncodingFailure(format!(
                        "non-finite float {} at `{}`",
                        f, path
                    ))
                })?;
                JsonValue::Number(number)
            }
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.to_json_at(&format!("{}[{}]", path, i)))
                    .collect::<EnvelopeResult<Vec<_>>>()?,
            ),
            Value::Record(r) => r.to_json_at(path)?,
        })
    }

    fn from_json_at(json: JsonValue, path: &str) -> EnvelopeResult<Self> {
        Ok(match json {
            JsonValue::Null => {
                return Err(EnvelopeError::ParseFailure(format!(
                    "null value at `{}` is not supported",
                    path
                )))
            }
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                // u64 above i64::MAX lands here and loses precision
                None => Value::Float(n.as_f64().ok_or_else(|| {
                    EnvelopeError::ParseFailure(format!("unrepresentable number at `{}`", path))
                })?),
            },
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Value::from_json_at(item, &format!("{}[{}]", path, i)))
                    .collect::<EnvelopeResult<Vec<_>>>()?,
            ),
            JsonValue::Object(map) => Value::Record(Record::from_json_object_at(map, path)?),
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Named mapping of values - the unit sealed and opened by the codec.
///
/// Keys are kept sorted so the serialized form is canonical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value for that key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Convert to a JSON object. Fails on non-finite floats.
    pub fn to_json_value(&self) -> EnvelopeResult<JsonValue> {
        self.to_json_at("")
    }

    /// Rebuild from a JSON value. The top level must be an object and no
    /// `null` may appear anywhere.
    pub fn from_json_value(json: JsonValue) -> EnvelopeResult<Self> {
        match json {
            JsonValue::Object(map) => Self::from_json_object_at(map, ""),
            other => Err(EnvelopeError::ParseFailure(format!(
                "expected a JSON object at top level, found {}",
                json_type_name(&other)
            ))),
        }
    }

    fn to_json_at(&self, path: &str) -> EnvelopeResult<JsonValue> {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json_at(&join_path(path, key))?);
        }
        Ok(JsonValue::Object(map))
    }

    fn from_json_object_at(map: Map<String, JsonValue>, path: &str) -> EnvelopeResult<Self> {
        let mut fields = BTreeMap::new();
        for (key, json) in map {
            let value = Value::from_json_at(json, &join_path(path, &key))?;
            fields.insert(key, value);
        }
        Ok(Self { fields })
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// TESTS
// ============================================================================
