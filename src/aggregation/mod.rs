//! Hierarchical key aggregation
//!
//! Accumulates values under multi-part keys while a caller scans tabular
//! rows, then answers prefix-scoped summary queries over them.
//!
//! # Components
//!
//! - Update: folds one value into one entry ([`AggregationMap::update_with`])
//! - Subgroup filter: selects and reshapes a prefix scope
//!   ([`AggregationMap::filter`])
//! - Max finder: dominant entry, total and share within a prefix scope
//!   ([`AggregationMap::max_entry`])
//! - Tree unwrapper: nested view of a flat map ([`unwrap_tree`])
//!
//! # Invariants
//!
//! - A failed update leaves the map exactly as it was
//! - A stored value is always combined, even if zero, empty or `false`
//! - Queries never mutate the map
//! - Iteration follows insertion order; ties go to the first-inserted entry
//!
//! # Usage
//!
//! ```
//! use hieragg::aggregation::{AggregationMap, FilterOptions};
//!
//! let mut counts = AggregationMap::new();
//! counts.update(("input_1", "sheet1", "Oslo"), 1)?;
//! counts.update(("input_1", "sheet1", "Bergen"), 1)?;
//! counts.update(("input_1", "sheet1", "Oslo"), 1)?;
//!
//! let top = counts.max_entry("input_1")?;
//! assert_eq!(top.percentage.round(), 67.0);
//!
//! let cities = counts.filter(("input_1", "sheet1"), &FilterOptions::new().isolated())?;
//! assert_eq!(cities.len(), 2);
//! # Ok::<(), hieragg::aggregation::ConfigurationError>(())
//! ```

mod errors;
mod filter;
mod key;
mod map;
mod max;
mod operator;
mod sorter;
mod tree;
mod update;
mod value;

pub use errors::{AggResult, ConfigurationError};
pub use filter::{FilterOptions, Subgroup};
pub use key::{HierarchicalKey, ReportKey, Segment};
pub use map::AggregationMap;
pub use max::MaxEntry;
pub use operator::{CombineFn, CombineOperator};
pub use sorter::{SortOrder, ValueSorter};
pub use tree::{unwrap_tree, Branch, Node};
pub use update::Update;
pub use value::Value;
