//! Dominant entry under a prefix

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use super::errors::{AggResult, ConfigurationError};
use super::key::{HierarchicalKey, ReportKey};
use super::map::{sum_values, AggregationMap};
use super::value::Value;

/// Result of a dominant-entry query.
///
/// When nothing matches the prefix, `key` and `count` are `None`, `total` is
/// zero and `percentage` is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxEntry {
    /// Key with the greatest value; one-element keys are reported bare
    pub key: Option<ReportKey>,
    /// Value stored at `key` in the queried map
    pub count: Option<Value>,
    /// Sum over every entry under the prefix
    pub total: Value,
    /// `count / total * 100`
    pub percentage: f64,
}

impl MaxEntry {
    /// The no-match sentinel
    pub fn empty() -> Self {
        Self {
            key: None,
            count: None,
            total: Value::Int(0),
            percentage: 0.0,
        }
    }

    /// Returns true if no entry matched
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    /// The winning key as a full path
    pub fn full_key(&self) -> Option<HierarchicalKey> {
        self.key.as_ref().map(ReportKey::to_key)
    }
}

impl AggregationMap {
    /// Finds the entry with the greatest value among keys starting with
    /// `prefix` (`()` for the whole map).
    ///
    /// Ties go to the entry inserted first. The total sums exactly the
    /// matching entries, with keys unshortened.
    ///
    /// The percentage is always within `[0, 100]`: matching values must be
    /// numeric, finite and non-negative, otherwise the query fails.
    pub fn max_entry(&self, prefix: impl Into<HierarchicalKey>) -> AggResult<MaxEntry> {
        let prefix = prefix.into();
        let filtered = self.subgroup(&prefix);

        let mut entries = filtered.iter();
        let Some(mut best) = entries.next() else {
            debug!(prefix = %prefix, "no entries under prefix");
            return Ok(MaxEntry::empty());
        };
        for entry in entries {
            if entry.1.compare(best.1) == Ordering::Greater {
                best = entry;
            }
        }

        let total = sum_values(filtered.iter())?;
        if let Some((key, value)) = filtered.iter().find(|(_, value)| !is_shareable(value)) {
            return Err(ConfigurationError::NegativeShare {
                key: key.clone(),
                value: value.clone(),
            });
        }
        let (key_max, value_max) = best;

        let percentage = match (value_max.as_f64(), total.as_f64()) {
            (Some(value), Some(sum)) if sum != 0.0 => value / sum * 100.0,
            _ => 0.0,
        };

        debug!(
            prefix = %prefix,
            key = %key_max,
            total = %total,
            percentage,
            "dominant entry found"
        );

        Ok(MaxEntry {
            key: Some(ReportKey::collapse(key_max.clone())),
            count: self.get(key_max).cloned(),
            total,
            percentage,
        })
    }
}

/// True for values that can take a share of a total
fn is_shareable(value: &Value) -> bool {
    value.as_f64().is_some_and(|x| x.is_finite() && x >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::CombineOperator;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_empty_map_returns_sentinel() {
        let result = AggregationMap::new().max_entry(()).unwrap();
        assert_eq!(result, MaxEntry::empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        let map: AggregationMap = [(("a", "b"), 1)].into_iter().collect();
        let result = map.max_entry("z").unwrap();
        assert!(result.key.is_none());
        assert!(result.count.is_none());
        assert_eq!(result.total, Value::Int(0));
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn test_tie_goes_to_first_inserted() {
        let map: AggregationMap = [("b", 4), ("a", 4), ("c", 1)].into_iter().collect();
        let result = map.max_entry(()).unwrap();
        assert_eq!(result.key, Some(ReportKey::Scalar("b".into())));
    }

    #[test]
    fn test_singleton_key_reported_bare() {
        let map: AggregationMap = [("x", 2), ("y", 6)].into_iter().collect();
        let result = map.max_entry(None::<HierarchicalKey>).unwrap();
        assert_eq!(result.key, Some(ReportKey::Scalar("y".into())));
        assert_eq!(result.count, Some(Value::Int(6)));
        assert_eq!(result.total, Value::Int(8));
        assert!(approx(result.percentage, 75.0));
        assert_eq!(result.full_key(), Some(HierarchicalKey::from("y")));
    }

    #[test]
    fn test_numeric_keys() {
        let map: AggregationMap = [
            (HierarchicalKey::from((1, 0.33)), 6),
            (HierarchicalKey::from((2, 0.33)), 1),
            (HierarchicalKey::from((3, 2)), 13),
            (HierarchicalKey::from((0, 0.2)), 100),
            (HierarchicalKey::from((1, 0.5)), 2),
            (HierarchicalKey::from((1, 1)), 7),
        ]
        .into_iter()
        .collect();

        let result = map.max_entry(()).unwrap();
        assert_eq!(result.full_key(), Some(HierarchicalKey::from((0, 0.2))));
        assert_eq!(result.count, Some(Value::Int(100)));
        assert_eq!(result.total, Value::Int(129));
        assert!(approx(result.percentage, 77.519));

        let result = map.max_entry(1i64).unwrap();
        assert_eq!(result.full_key(), Some(HierarchicalKey::from((1, 1))));
        assert_eq!(result.total, Value::Int(15));
    }

    #[test]
    fn test_zero_total_reports_zero_percentage() {
        let map: AggregationMap = [("a", 0), ("b", 0)].into_iter().collect();
        let result = map.max_entry(()).unwrap();
        assert_eq!(result.key, Some(ReportKey::Scalar("a".into())));
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn test_text_values_cannot_be_totalled() {
        let map: AggregationMap = [("a", "x")].into_iter().collect();
        let err = map.max_entry(()).unwrap_err();
        assert_eq!(err.code(), "HIERAGG_NON_NUMERIC_TOTAL");
    }

    #[test]
    fn test_negative_value_rejected() {
        let mut map: AggregationMap = [("a", 5), ("b", 0)].into_iter().collect();
        map.update_with("b", Some(Value::Int(3)), Some(CombineOperator::Subtract), None)
            .unwrap();

        let err = map.max_entry(()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NegativeShare {
                key: HierarchicalKey::from("b"),
                value: Value::Int(-3),
            }
        );
        assert_eq!(err.code(), "HIERAGG_NEGATIVE_SHARE");
    }

    #[test]
    fn test_negative_value_outside_prefix_ignored() {
        let map: AggregationMap = [(("f", "a"), 3), (("f", "b"), 1), (("g", "c"), -7)]
            .into_iter()
            .collect();
        let result = map.max_entry("f").unwrap();
        assert_eq!(result.percentage, 75.0);
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let map: AggregationMap = [("a", Value::Float(f64::INFINITY)), ("b", Value::Int(1))]
            .into_iter()
            .collect();
        assert_eq!(map.max_entry(()).unwrap_err().code(), "HIERAGG_NEGATIVE_SHARE");
    }

    #[test]
    fn test_serialize_result() {
        let map: AggregationMap = [(("f", "s"), 3)].into_iter().collect();
        let json = serde_json::to_value(map.max_entry("f").unwrap()).unwrap();
        assert_eq!(json["key"], serde_json::json!(["f", "s"]));
        assert_eq!(json["count"], 3);
        assert_eq!(json["total"], 3);
        assert_eq!(json["percentage"], 100.0);
    }
}
