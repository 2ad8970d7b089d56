//! Declarative updates
//!
//! Lets a transform file describe accumulation as data:
//!
//! ```json
//! {"key": ["input_1", "sheet1", "city"], "value": 1, "operator": "+", "default": 0}
//! ```
//!
//! `key` may also be a bare scalar. `operator` and `default` are optional and
//! resolve the same way as [`AggregationMap::update_with`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{AggResult, ConfigurationError};
use super::key::HierarchicalKey;
use super::map::AggregationMap;
use super::operator::CombineOperator;
use super::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Update {
    pub key: HierarchicalKey,
    /// `null` or missing is rejected when applied
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub operator: Option<CombineOperator>,
    #[serde(default)]
    pub default: Option<Value>,
}

impl Update {
    /// An update with operator and default resolved from the value
    pub fn new(key: impl Into<HierarchicalKey>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            operator: None,
            default: None,
        }
    }

    pub fn with_operator(mut self, operator: CombineOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Parses an update from a JSON config node
    pub fn from_json(value: &serde_json::Value) -> AggResult<Self> {
        Ok(Self::deserialize(value)?)
    }
}

impl AggregationMap {
    /// Applies one declarative update
    pub fn apply(&mut self, update: &Update) -> AggResult<&mut Self> {
        self.update_with(
            &update.key,
            update.value.clone(),
            update.operator.clone(),
            update.default.clone(),
        )
    }

    /// Applies updates in order, stopping at the first failure.
    ///
    /// Updates before the failing one stay applied; the failing one leaves
    /// no trace. Returns the number of updates applied.
    pub fn apply_all<'a>(
        &mut self,
        updates: impl IntoIterator<Item = &'a Update>,
    ) -> AggResult<usize> {
        let mut applied = 0;
        for (index, update) in updates.into_iter().enumerate() {
            if let Err(err) = self.apply(update) {
                debug!(index, applied, "batch stopped");
                return Err(ConfigurationError::InBatch {
                    index,
                    source: Box::new(err),
                });
            }
            applied += 1;
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_from_json() {
        let update = Update::from_json(&json!({
            "key": ["input_1", "sheet1", "city"],
            "value": 1,
            "operator": "+",
            "default": 0
        }))
        .unwrap();
        assert_eq!(update.key, HierarchicalKey::from(("input_1", "sheet1", "city")));
        assert_eq!(update.value, Some(Value::Int(1)));
        assert_eq!(update.operator.map(|op| op.as_str()), Some("+"));
        assert_eq!(update.default, Some(Value::Int(0)));
    }

    #[test]
    fn test_update_from_json_scalar_key() {
        let update = Update::from_json(&json!({"key": "a", "value": 2.5})).unwrap();
        assert_eq!(update.key, HierarchicalKey::from("a"));
        assert!(update.operator.is_none());
    }

    #[test]
    fn test_update_rejects_unknown_operator() {
        let err = Update::from_json(&json!({"key": "a", "value": 1, "operator": "max"}))
            .unwrap_err();
        assert_eq!(err.code(), "HIERAGG_INVALID_OPTIONS");
    }

    #[test]
    fn test_null_value_rejected_on_apply() {
        let update = Update::from_json(&json!({"key": "a", "value": null})).unwrap();
        let mut map = AggregationMap::new();
        let err = map.apply(&update).unwrap_err();
        assert_eq!(err.code(), "HIERAGG_MISSING_VALUE");
        assert!(map.is_empty());
    }

    #[test]
    fn test_apply_all_counts() {
        let updates = vec![
            Update::new("a", 1),
            Update::new("a", 1),
            Update::new(("b", "c"), 2),
        ];
        let mut map = AggregationMap::new();
        assert_eq!(map.apply_all(&updates).unwrap(), 3);
        assert_eq!(map.get(&HierarchicalKey::from("a")), Some(&Value::Int(2)));
    }

    #[test]
    fn test_apply_all_stops_at_failure() {
        let updates = vec![
            Update::new("a", 1),
            Update::new("b", "text"),
            Update::new("c", 1),
        ];
        let mut map = AggregationMap::new();
        let err = map.apply_all(&updates).unwrap_err();

        assert!(matches!(err, ConfigurationError::InBatch { index: 1, .. }));
        assert_eq!(err.code(), "HIERAGG_UNRESOLVED_DEFAULT");
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&HierarchicalKey::from("c")));
    }

    #[test]
    fn test_text_update_with_operator_and_default() {
        let update = Update::new("names", "bob")
            .with_operator(CombineOperator::Add)
            .with_default("");
        let mut map = AggregationMap::new();
        map.apply(&update).unwrap().apply(&update).unwrap();
        assert_eq!(map.get(&HierarchicalKey::from("names")), Some(&Value::from("bobbob")));
    }
}
