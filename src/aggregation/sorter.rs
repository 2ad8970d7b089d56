//! Value sorting for subgroup queries
//!
//! Sorts entries by value, deterministically.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::ConfigurationError;
use super::key::HierarchicalKey;
use super::value::Value;

/// Sort order for subgroup results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Keep insertion order
    #[default]
    None,
    ByValueDesc,
    ByValueAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::ByValueDesc => "by_value_desc",
            SortOrder::ByValueAsc => "by_value_asc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SortOrder::None),
            "by_value_desc" => Ok(SortOrder::ByValueDesc),
            "by_value_asc" => Ok(SortOrder::ByValueAsc),
            other => Err(ConfigurationError::UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Sorts map entries by value
pub struct ValueSorter;

impl ValueSorter {
    /// Sorts entries according to `order`.
    ///
    /// Sort is stable: equal values keep insertion order in both directions.
    pub fn sort(entries: &mut IndexMap<HierarchicalKey, Value>, order: SortOrder) {
        match order {
            SortOrder::None => {}
            SortOrder::ByValueAsc => entries.sort_by(|_, a, _, b| Value::compare(a, b)),
            SortOrder::ByValueDesc => entries.sort_by(|_, a, _, b| Value::compare(b, a)),
        }
    }
}
