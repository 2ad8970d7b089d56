//! The aggregation map and its accumulator update
//!
//! # Update Flow (strict order)
//!
//! 1. Normalize the key
//! 2. Reject a missing value
//! 3. Resolve the default (explicit, or the zero of the value's numeric type)
//! 4. Resolve the operator (explicit, or `+` for numeric values)
//! 5. Read the stored value if the key is present, else the default
//! 6. Combine, then store
//!
//! Any failure in steps 2-6 returns before the map is touched.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use super::errors::{AggResult, ConfigurationError};
use super::key::HierarchicalKey;
use super::operator::CombineOperator;
use super::value::Value;

/// Insertion-ordered map from hierarchical keys to accumulated values.
///
/// Iteration order is insertion order; queries rely on it for tie-breaks.
/// Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationMap {
    entries: IndexMap<HierarchicalKey, Value>,
}

impl AggregationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &HierarchicalKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &HierarchicalKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, HierarchicalKey, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, HierarchicalKey, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, HierarchicalKey, Value> {
        self.entries.values()
    }

    /// Sum of every value in the map
    pub fn total(&self) -> AggResult<Value> {
        sum_values(self.iter())
    }

    /// Accumulates `new_val` at `key`, resolving operator and default from
    /// the value's type.
    ///
    /// Numeric values add onto a zero of their own type. Text and boolean
    /// values need [`update_with`](Self::update_with).
    pub fn update(
        &mut self,
        key: impl Into<HierarchicalKey>,
        new_val: impl Into<Value>,
    ) -> AggResult<&mut Self> {
        self.update_with(key, Some(new_val.into()), None, None)
    }

    /// Accumulates `new_val` at `key` with an optional explicit operator and
    /// default.
    ///
    /// The stored value is used whenever the key is present, even if it is
    /// zero, empty or `false`; `default` only stands in for an absent key.
    pub fn update_with(
        &mut self,
        key: impl Into<HierarchicalKey>,
        new_val: Option<Value>,
        operator: Option<CombineOperator>,
        default: Option<Value>,
    ) -> AggResult<&mut Self> {
        let key = key.into();

        let combined = match Self::resolve_and_combine(
            self.entries.get(&key),
            &key,
            new_val,
            operator,
            default,
        ) {
            Ok(combined) => combined,
            Err(err) => {
                debug!(key = %key, code = err.code(), "update rejected");
                return Err(err);
            }
        };

        trace!(key = %key, value = %combined, "accumulated");
        self.entries.insert(key, combined);
        Ok(self)
    }

    /// Computes the value to store without touching the map
    fn resolve_and_combine(
        stored: Option<&Value>,
        key: &HierarchicalKey,
        new_val: Option<Value>,
        operator: Option<CombineOperator>,
        default: Option<Value>,
    ) -> AggResult<Value> {
        let new_val = new_val.ok_or_else(|| ConfigurationError::MissingValue { key: key.clone() })?;

        let default = default.or_else(|| new_val.zero_like()).ok_or_else(|| {
            ConfigurationError::UnresolvedDefault {
                key: key.clone(),
                kind: new_val.kind(),
            }
        })?;

        let operator = operator
            .or_else(|| new_val.is_numeric().then_some(CombineOperator::Add))
            .ok_or_else(|| ConfigurationError::UnresolvedOperator {
                key: key.clone(),
                kind: new_val.kind(),
            })?;

        let old = stored.unwrap_or(&default);
        operator.apply(old, &new_val)
    }

    pub(crate) fn from_entries(entries: IndexMap<HierarchicalKey, Value>) -> Self {
        Self { entries }
    }
}

/// Sums values, staying integral while every value is an int.
pub(crate) fn sum_values<'a>(
    entries: impl IntoIterator<Item = (&'a HierarchicalKey, &'a Value)>,
) -> AggResult<Value> {
    entries
        .into_iter()
        .try_fold(Value::Int(0), |acc, (key, value)| {
            if !value.is_numeric() {
                return Err(ConfigurationError::NonNumericTotal {
                    key: key.clone(),
                    kind: value.kind(),
                });
            }
            acc.checked_add(value)
        })
}

/// Serializes as a sequence of `[key, value]` pairs in insertion order, since
/// keys are paths rather than strings.
impl Serialize for AggregationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<K: Into<HierarchicalKey>, V: Into<Value>> FromIterator<(K, V)> for AggregationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for AggregationMap {
    type Item = (HierarchicalKey, Value);
    type IntoIter = indexmap::map::IntoIter<HierarchicalKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregationMap {
    type Item = (&'a HierarchicalKey, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, HierarchicalKey, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
