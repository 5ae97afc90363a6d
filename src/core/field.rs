//! Polymorphic field values carried by resource records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// Records expose their attributes as `FieldValue`s so the pipeline can
/// sort, filter and serialize them without knowing the concrete resource
/// type at compile time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare two values of compatible types
    ///
    /// Returns `None` when the variants are not comparable (e.g. a string
    /// against a boolean). `Null` sorts before everything else so ordering
    /// stays total over a single column.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (String(a), String(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            _ => None,
        }
    }

    /// Render the value as a plain string, the form used by the textual
    /// filter predicates (`eq`, `cont`, `start`, ...). `Null` renders empty.
    pub fn render(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Uuid(u) => u.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::Null => String::new(),
        }
    }

    /// Convert into a JSON value for presentation output
    pub fn into_json(self) -> Value {
        match self {
            FieldValue::String(s) => Value::String(s),
            FieldValue::Integer(i) => Value::from(i),
            FieldValue::Float(f) => Value::from(f),
            FieldValue::Boolean(b) => Value::Bool(b),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            FieldValue::Null => Value::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<Uuid> for FieldValue {
    fn from(u: Uuid) -> Self {
        FieldValue::Uuid(u)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}
