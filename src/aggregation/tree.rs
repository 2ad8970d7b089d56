//! Tree view of an aggregation map
//!
//! Each key segment becomes one level of nesting:
//!
//! ```text
//! (file1, sheet1, col1) = 3         file1
//! (file1, sheet1, col2) = 2   =>      sheet1
//! (file1, sheet2, col3) = 3             col1 = 3
//!                                       col2 = 2
//!                                     sheet2
//!                                       col3 = 3
//! ```
//!
//! Building and flattening both walk key segments iteratively, so key depth
//! is bounded only by memory.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use tracing::debug;

use super::errors::{AggResult, ConfigurationError};
use super::key::{HierarchicalKey, Segment};
use super::map::AggregationMap;
use super::value::Value;

/// One level of the tree: children keyed by segment, in insertion order
pub type Branch = IndexMap<Segment, Node>;

/// A node is either a stored value or a nested level
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Value),
    Branch(Branch),
}

impl Default for Node {
    fn default() -> Self {
        Node::Branch(Branch::new())
    }
}

impl Node {
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Node::Branch(children) => Some(children),
            Node::Leaf(_) => None,
        }
    }

    /// Follows `path` down the tree and returns the node there
    pub fn node_at(&self, path: &HierarchicalKey) -> Option<&Node> {
        path.segments().iter().try_fold(self, |node, segment| match node {
            Node::Branch(children) => children.get(segment),
            Node::Leaf(_) => None,
        })
    }

    /// Returns the value stored at exactly `path`
    pub fn get(&self, path: &HierarchicalKey) -> Option<&Value> {
        self.node_at(path).and_then(Node::as_leaf)
    }

    /// Every leaf with its full path, depth-first in insertion order
    pub fn leaves(&self) -> Vec<(HierarchicalKey, &Value)> {
        let mut out = Vec::new();
        let mut stack: Vec<(Vec<Segment>, &Node)> = vec![(Vec::new(), self)];

        while let Some((path, node)) = stack.pop() {
            match node {
                Node::Leaf(value) => out.push((HierarchicalKey::new(path), value)),
                Node::Branch(children) => {
                    // Reverse so the first child is popped first
                    for (segment, child) in children.iter().rev() {
                        let mut child_path = path.clone();
                        child_path.push(segment.clone());
                        stack.push((child_path, child));
                    }
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(_) => count += 1,
                Node::Branch(children) => stack.extend(children.values()),
            }
        }
        count
    }

    /// Concatenates path segments down to every leaf, restoring the flat map
    pub fn flatten(&self) -> AggregationMap {
        self.leaves()
            .into_iter()
            .map(|(path, value)| (path, value.clone()))
            .collect()
    }

    /// Places `value` at `key`, creating intermediate branches as needed.
    ///
    /// Fails if the path passes through a leaf or ends on an existing node.
    fn insert(&mut self, key: &HierarchicalKey, value: Value) -> AggResult<()> {
        let segments = key.segments();

        let Some((last, parents)) = segments.split_last() else {
            // Degenerate root: only allowed on an empty tree
            if matches!(self, Node::Branch(children) if children.is_empty()) {
                *self = Node::Leaf(value);
                return Ok(());
            }
            return Err(collision(&[]));
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let current = node;
            let children = match current {
                Node::Branch(children) => children,
                Node::Leaf(_) => return Err(collision(&segments[..depth])),
            };
            node = children.entry(segment.clone()).or_default();
        }

        match node {
            Node::Branch(children) => match children.entry(last.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Node::Leaf(value));
                    Ok(())
                }
                Entry::Occupied(_) => Err(collision(segments)),
            },
            Node::Leaf(_) => Err(collision(parents)),
        }
    }
}

// Drops level by level instead of recursing once per nesting depth.
impl Drop for Node {
    fn drop(&mut self) {
        let Node::Branch(children) = self else {
            return;
        };
        let mut pending = vec![std::mem::take(children)];
        while let Some(mut branch) = pending.pop() {
            for (_, mut child) in branch.drain(..) {
                if let Node::Branch(grandchildren) = &mut child {
                    pending.push(std::mem::take(grandchildren));
                }
            }
        }
    }
}

fn collision(path: &[Segment]) -> ConfigurationError {
    ConfigurationError::TreeCollision {
        path: HierarchicalKey::new(path.to_vec()),
    }
}

/// Converts a flat map into a nested tree.
///
/// Entries sharing a leading segment merge under one branch. An empty key
/// makes the whole tree a single leaf. A key that ends where another key
/// continues is a collision and fails.
pub fn unwrap_tree(map: &AggregationMap) -> AggResult<Node> {
    let mut root = Node::default();
    for (key, value) in map {
        if let Err(err) = root.insert(key, value.clone()) {
            debug!(key = %key, code = err.code(), "tree unwrap rejected");
            return Err(err);
        }
    }
    Ok(root)
}

/// Serializes leaves as values and branches as objects keyed by segment text.
///
/// Siblings whose segments render to the same text (`1` and `"1"`, `true`
/// and `"true"`) would overwrite each other, so they fail instead.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Branch(children) => {
                let mut seen = IndexSet::with_capacity(children.len());
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (segment, child) in children {
                    let name = segment.to_string();
                    if !seen.insert(name.clone()) {
                        return Err(S::Error::custom(format!(
                            "sibling segments share the name {:?}",
                            name
                        )));
                    }
                    map.serialize_entry(&name, child)?;
                }
                map.end()
            }
        }
    }
}
