//! Literal values and column types.

use serde::Serialize;

/// A literal bound to a positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The column type this value binds as, if it has one.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(SqlType::Bool),
            Value::Int32(_) => Some(SqlType::Int4),
            Value::Int64(_) => Some(SqlType::Int8),
            Value::Float64(_) => Some(SqlType::Float8),
            Value::String(_) => Some(SqlType::Text),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// PostgreSQL column types known to the compiler.
///
/// Used to render explicit casts on placeholders (`$1::TEXT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Text,
    Name,
    Bool,
    Int4,
    Int8,
    Float8,
}

impl SqlType {
    /// The type name used in a `::` cast.
    pub fn cast_name(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Name => "NAME",
            SqlType::Bool => "BOOLEAN",
            SqlType::Int4 => "INTEGER",
            SqlType::Int8 => "BIGINT",
            SqlType::Float8 => "DOUBLE PRECISION",
        }
    }
}
