//! hieragg - A strict, deterministic hierarchical key aggregation engine
//!
//! Accumulates values under multi-part keys and answers prefix-scoped
//! summary queries: dominant key, totals, percentages and tree views.

pub mod aggregation;
