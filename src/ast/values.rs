use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ast::QualifiedName;

/// A value in a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Timestamp (UTC)
    Timestamp(DateTime<Utc>),
    /// Collection of values
    List(Vec<Value>),
    /// Value composite, one entry per declared property
    Composite(Vec<CompositeField>),
}

/// One property of a value composite, keyed by its resolved slot name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    pub name: QualifiedName,
    pub value: Value,
}

/// SQL type of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Boolean,
    BigInt,
    Double,
    Varchar,
    Timestamp,
}

impl Value {
    /// Build a value composite from `(slot, value)` pairs.
    pub fn composite<V: Into<Value>>(fields: impl IntoIterator<Item = (QualifiedName, V)>) -> Self {
        Value::Composite(
            fields
                .into_iter()
                .map(|(name, value)| CompositeField { name, value: value.into() })
                .collect(),
        )
    }

    /// SQL type used when this value is bound as a parameter.
    /// Returns `None` for values that never bind directly.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Value::Bool(_) => Some(SqlType::Boolean),
            Value::Int(_) => Some(SqlType::BigInt),
            Value::Float(_) => Some(SqlType::Double),
            Value::String(_) => Some(SqlType::Varchar),
            Value::Timestamp(_) => Some(SqlType::Timestamp),
            Value::Null | Value::List(_) | Value::Composite(_) => None,
        }
    }

    /// True if a list appears anywhere inside this value.
    pub fn contains_collection(&self) -> bool {
        match self {
            Value::List(_) => true,
            Value::Composite(fields) => fields.iter().any(|f| f.value.contains_collection()),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Composite(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}: {}", field.name.member, field.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
