//! Combine operators
//!
//! An operator folds a new value into the value already stored at a key:
//! `stored = op(old, new)`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{AggResult, ConfigurationError};
use super::value::Value;

/// Caller-supplied combine function for value types the built-in operators
/// do not cover.
pub type CombineFn = Arc<dyn Fn(&Value, &Value) -> AggResult<Value> + Send + Sync>;

#[derive(Clone)]
pub enum CombineOperator {
    /// Last write wins
    Replace,
    Add,
    Subtract,
    Multiply,
    Divide,
    Custom(CombineFn),
}

/// Tag to operator lookup table
const OPERATOR_TAGS: [(&str, CombineOperator); 5] = [
    ("=", CombineOperator::Replace),
    ("+", CombineOperator::Add),
    ("-", CombineOperator::Subtract),
    ("*", CombineOperator::Multiply),
    ("/", CombineOperator::Divide),
];

impl CombineOperator {
    /// Wraps a caller-supplied function
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> AggResult<Value> + Send + Sync + 'static,
    {
        CombineOperator::Custom(Arc::new(f))
    }

    /// Returns the operator's tag (`"custom"` for caller functions)
    pub fn as_str(&self) -> &'static str {
        match self {
            CombineOperator::Replace => "=",
            CombineOperator::Add => "+",
            CombineOperator::Subtract => "-",
            CombineOperator::Multiply => "*",
            CombineOperator::Divide => "/",
            CombineOperator::Custom(_) => "custom",
        }
    }

    /// Applies the operator to the old and new value
    pub fn apply(&self, old: &Value, new: &Value) -> AggResult<Value> {
        match self {
            CombineOperator::Replace => Ok(new.clone()),
            CombineOperator::Add => old.checked_add(new),
            CombineOperator::Subtract => old.checked_sub(new),
            CombineOperator::Multiply => old.checked_mul(new),
            CombineOperator::Divide => old.checked_div(new),
            CombineOperator::Custom(f) => f(old, new),
        }
    }
}

impl FromStr for CombineOperator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATOR_TAGS
            .iter()
            .find(|(tag, _)| *tag == s)
            .map(|(_, op)| op.clone())
            .ok_or_else(|| ConfigurationError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Debug for CombineOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineOperator::Custom(_) => write!(f, "Custom(..)"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl fmt::Display for CombineOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for CombineOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CombineOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_tags() {
        for (tag, _) in OPERATOR_TAGS {
            let op: CombineOperator = tag.parse().unwrap();
            assert_eq!(op.as_str(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = "add".parse::<CombineOperator>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownOperator("add".into()));
    }

    #[test]
    fn test_replace_ignores_old() {
        let op = CombineOperator::Replace;
        assert_eq!(op.apply(&Value::Int(9), &Value::Int(0)).unwrap(), Value::Int(0));
        assert_eq!(
            op.apply(&Value::Int(9), &Value::from("x")).unwrap(),
            Value::from("x")
        );
    }

    #[test]
    fn test_arithmetic_ops() {
        let old = Value::Int(6);
        let new = Value::Int(3);
        assert_eq!(CombineOperator::Add.apply(&old, &new).unwrap(), Value::Int(9));
        assert_eq!(CombineOperator::Subtract.apply(&old, &new).unwrap(), Value::Int(3));
        assert_eq!(CombineOperator::Multiply.apply(&old, &new).unwrap(), Value::Int(18));
        assert_eq!(CombineOperator::Divide.apply(&old, &new).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_custom_operator() {
        let longest = CombineOperator::custom(|old, new| match (old, new) {
            (Value::Text(a), Value::Text(b)) if b.len() > a.len() => Ok(new.clone()),
            _ => Ok(old.clone()),
        });
        assert_eq!(
            longest.apply(&Value::from("ab"), &Value::from("abc")).unwrap(),
            Value::from("abc")
        );
        assert_eq!(longest.as_str(), "custom");
    }

    #[test]
    fn test_serde_roundtrip_tag() {
        let op: CombineOperator = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(op.as_str(), "*");
        assert_eq!(serde_json::to_string(&op).unwrap(), "\"*\"");

        assert!(serde_json::from_str::<CombineOperator>("\"%\"").is_err());
    }
}
