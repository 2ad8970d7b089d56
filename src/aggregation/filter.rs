//! Subgroup selection
//!
//! # Transform Flow (strict order)
//!
//! 1. Select entries whose key starts with the prefix
//! 2. Sort by value (if requested)
//! 3. Isolate: strip the prefix from each key (if requested)
//! 4. Unwrap into a tree, or else collapse one-element keys to scalars
//!    (if requested)
//!
//! The input map is never mutated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::AggResult;
use super::key::{HierarchicalKey, ReportKey};
use super::map::AggregationMap;
use super::sorter::{SortOrder, ValueSorter};
use super::tree::{unwrap_tree, Node};
use super::value::Value;

/// Options controlling how a subgroup is reshaped.
///
/// Deserializable from a transform file, e.g.
/// `{"sort": "by_value_desc", "isolate": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    pub sort: SortOrder,
    /// Strip the matched prefix from returned keys
    pub isolate: bool,
    /// Return a nested tree instead of a flat map
    pub unwrap: bool,
    /// Return one-element keys as bare scalars (ignored when unwrapping)
    pub unwrap_singleton: bool,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON config node
    pub fn from_json(value: &serde_json::Value) -> AggResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn isolated(mut self) -> Self {
        self.isolate = true;
        self
    }

    pub fn unwrapped(mut self) -> Self {
        self.unwrap = true;
        self
    }

    pub fn singletons_unwrapped(mut self) -> Self {
        self.unwrap_singleton = true;
        self
    }
}

/// The result of a subgroup query
#[derive(Debug, Clone, PartialEq)]
pub enum Subgroup {
    /// Flat map keyed by full (or isolated) keys
    Flat(AggregationMap),
    /// Flat map where one-element keys were collapsed to scalars
    Labeled(IndexMap<ReportKey, Value>),
    /// Nested tree view
    Tree(Node),
}

impl Subgroup {
    pub fn as_flat(&self) -> Option<&AggregationMap> {
        match self {
            Subgroup::Flat(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_flat(self) -> Option<AggregationMap> {
        match self {
            Subgroup::Flat(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_labeled(&self) -> Option<&IndexMap<ReportKey, Value>> {
        match self {
            Subgroup::Labeled(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Node> {
        match self {
            Subgroup::Tree(node) => Some(node),
            _ => None,
        }
    }

    /// Number of values in the result
    pub fn len(&self) -> usize {
        match self {
            Subgroup::Flat(map) => map.len(),
            Subgroup::Labeled(map) => map.len(),
            Subgroup::Tree(node) => node.leaf_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All values in result order
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Subgroup::Flat(map) => map.values().collect(),
            Subgroup::Labeled(map) => map.values().collect(),
            Subgroup::Tree(node) => node.leaves().into_iter().map(|(_, v)| v).collect(),
        }
    }
}

impl AggregationMap {
    /// Entries whose key starts with `prefix`, keys unchanged, in insertion
    /// order. An empty prefix selects everything.
    pub fn subgroup(&self, prefix: &HierarchicalKey) -> AggregationMap {
        AggregationMap::from_entries(select(self, prefix))
    }

    /// Selects and reshapes the entries under `prefix`
    pub fn filter(
        &self,
        prefix: impl Into<HierarchicalKey>,
        options: &FilterOptions,
    ) -> AggResult<Subgroup> {
        let prefix = prefix.into();
        let mut entries = select(self, &prefix);
        let matched = entries.len();

        ValueSorter::sort(&mut entries, options.sort);

        if options.isolate {
            entries = entries
                .into_iter()
                .map(|(key, value)| (key.strip_leading(prefix.len()), value))
                .collect();
        }

        debug!(
            prefix = %prefix,
            matched,
            sort = %options.sort,
            isolate = options.isolate,
            unwrap = options.unwrap,
            "subgroup selected"
        );

        if options.unwrap {
            return Ok(Subgroup::Tree(unwrap_tree(&AggregationMap::from_entries(
                entries,
            ))?));
        }

        if options.unwrap_singleton {
            let labeled = entries
                .into_iter()
                .map(|(key, value)| (ReportKey::collapse(key), value))
                .collect();
            return Ok(Subgroup::Labeled(labeled));
        }

        Ok(Subgroup::Flat(AggregationMap::from_entries(entries)))
    }
}

/// Linear prefix scan in insertion order
fn select(map: &AggregationMap, prefix: &HierarchicalKey) -> IndexMap<HierarchicalKey, Value> {
    map.iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
