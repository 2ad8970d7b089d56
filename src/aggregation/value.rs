//! Aggregated values
//!
//! Values are numeric by default. Text and boolean values may be stored, but
//! only when the caller supplies both an operator and a default.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{AggResult, ConfigurationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Short kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The zero of the value's own numeric type, if it has one.
    ///
    /// This is the implicit default for a key that has not been seen yet.
    pub fn zero_like(&self) -> Option<Value> {
        match self {
            Value::Int(_) => Some(Value::Int(0)),
            Value::Float(_) => Some(Value::Float(0.0)),
            _ => None,
        }
    }

    /// Compares two values for ordering.
    ///
    /// Ordering rules:
    /// - bool < number < text
    /// - ints and floats compare numerically with each other
    /// - NaN compares equal to everything numeric
    pub fn compare(&self, other: &Value) -> Ordering {
        let type_order = |v: &Value| -> u8 {
            match v {
                Value::Bool(_) => 0,
                Value::Int(_) | Value::Float(_) => 1,
                Value::Text(_) => 2,
            }
        };

        let a_type = type_order(self);
        let b_type = type_order(other);
        if a_type != b_type {
            return a_type.cmp(&b_type);
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => {
                let a_f = a.as_f64().unwrap_or(0.0);
                let b_f = b.as_f64().unwrap_or(0.0);
                a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
            }
        }
    }

    pub(crate) fn checked_add(&self, rhs: &Value) -> AggResult<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| ConfigurationError::Overflow { op: "+" }),
            (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
            _ => Self::float_op(self, rhs, "+", |a, b| a + b),
        }
    }

    pub(crate) fn checked_sub(&self, rhs: &Value) -> AggResult<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(*b)
                .map(Value::Int)
                .ok_or_else(|| ConfigurationError::Overflow { op: "-" }),
            _ => Self::float_op(self, rhs, "-", |a, b| a - b),
        }
    }

    pub(crate) fn checked_mul(&self, rhs: &Value) -> AggResult<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(*b)
                .map(Value::Int)
                .ok_or_else(|| ConfigurationError::Overflow { op: "*" }),
            _ => Self::float_op(self, rhs, "*", |a, b| a * b),
        }
    }

    /// True division: the result is always a float.
    pub(crate) fn checked_div(&self, rhs: &Value) -> AggResult<Value> {
        if rhs.as_f64() == Some(0.0) {
            return Err(ConfigurationError::DivisionByZero);
        }
        Self::float_op(self, rhs, "/", |a, b| a / b)
    }

    fn float_op(
        lhs: &Value,
        rhs: &Value,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> AggResult<Value> {
        match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float(f(a, b))),
            _ => Err(ConfigurationError::IncompatibleOperands {
                op,
                left: lhs.kind(),
                right: rhs.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

macro_rules! value_try_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for Value {
                type Error = ConfigurationError;

                fn try_from(i: $t) -> Result<Self, Self::Error> {
                    i64::try_from(i).map(Value::Int).map_err(|_| ConfigurationError::Overflow {
                        op: concat!(stringify!($t), " -> i64"),
                    })
                }
            }
        )*
    };
}

value_try_from_unsigned!(u64, usize);

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
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
