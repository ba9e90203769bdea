use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

/// Supported column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int,
    Varchar,
    Float,
    Boolean,
}

impl DataType {
    /// Resolves a type name (case-insensitive)
    pub fn from_name(name: &str) -> Option<DataType> {
        Some(match name.to_uppercase().as_ref() {
            "INT" => DataType::Int,
            "VARCHAR" => DataType::Varchar,
            "FLOAT" => DataType::Float,
            "BOOLEAN" => DataType::Boolean,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Varchar => "VARCHAR",
            DataType::Float => "FLOAT",
            DataType::Boolean => "BOOLEAN",
        }
    }

    /// All type names, sorted, for error messages
    pub fn names() -> &'static str {
        "BOOLEAN, FLOAT, INT, VARCHAR"
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value stored in rows and used as literal in statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns the data type the value naturally belongs to, or None if it's Null
    pub fn datatype(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Integer(_) => Some(DataType::Int),
            Self::Float(_) => Some(DataType::Float),
            Self::Text(_) => Some(DataType::Varchar),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Orders two non-null values of compatible kinds
    ///
    /// Integers and floats compare numerically. Any other cross-kind pair, and
    /// any pair involving Null, is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (_, _) => None,
        }
    }

    /// Stringifies the value for storage in a VARCHAR column
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

/// Human-readable rendering used by result display
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.0}", v),
            Value::Float(v) => write!(f, "{:.2}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

/// A row is a vector of values, positionally aligned with its table's schema
pub type Row = Vec<Value>;
