//! Aggregation error types
//!
//! Every failure is a caller/configuration defect: never retried, never
//! downgraded, and never leaves a map half-updated.
//!
//! Error codes:
//! - HIERAGG_MISSING_VALUE
//! - HIERAGG_UNRESOLVED_DEFAULT
//! - HIERAGG_UNRESOLVED_OPERATOR
//! - HIERAGG_UNKNOWN_OPERATOR
//! - HIERAGG_UNKNOWN_SORT_ORDER
//! - HIERAGG_INVALID_OPTIONS
//! - HIERAGG_INCOMPATIBLE_OPERANDS
//! - HIERAGG_DIVISION_BY_ZERO
//! - HIERAGG_OVERFLOW
//! - HIERAGG_NON_NUMERIC_TOTAL
//! - HIERAGG_NEGATIVE_SHARE
//! - HIERAGG_TREE_COLLISION

use thiserror::Error;

use super::key::HierarchicalKey;
use super::value::Value;

/// Result type for aggregation operations
pub type AggResult<T> = Result<T, ConfigurationError>;

/// The single error kind raised by the engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    // ==================
    // Update Errors
    // ==================
    #[error("No value supplied for key {key}")]
    MissingValue { key: HierarchicalKey },

    #[error("No default for {kind} value at key {key}; supply a default explicitly")]
    UnresolvedDefault { key: HierarchicalKey, kind: &'static str },

    #[error("No combine operator for {kind} value at key {key}; supply one explicitly (e.g. \"+\")")]
    UnresolvedOperator { key: HierarchicalKey, kind: &'static str },

    #[error("Unknown combine operator: {0:?} (expected one of \"=\", \"+\", \"-\", \"*\", \"/\")")]
    UnknownOperator(String),

    #[error("Operator {op} is not defined for {left} and {right}")]
    IncompatibleOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow in {op}")]
    Overflow { op: &'static str },

    #[error("Update #{index} failed: {source}")]
    InBatch {
        index: usize,
        #[source]
        source: Box<ConfigurationError>,
    },

    // ==================
    // Query Errors
    // ==================
    #[error("Unknown sort order: {0:?} (expected \"none\", \"by_value_desc\" or \"by_value_asc\")")]
    UnknownSortOrder(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Cannot total {kind} value at key {key}")]
    NonNumericTotal { key: HierarchicalKey, kind: &'static str },

    #[error("Cannot compute a share of {value} at key {key}; values must be finite and non-negative")]
    NegativeShare { key: HierarchicalKey, value: Value },

    #[error("Leaf and subtree collide at path {path}")]
    TreeCollision { path: HierarchicalKey },
}

impl ConfigurationError {
    /// Returns the stable string code for this error.
    ///
    /// Batch failures report the code of the update that failed.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigurationError::InBatch { source, .. } => source.code(),
            ConfigurationError::MissingValue { .. } => "HIERAGG_MISSING_VALUE",
            ConfigurationError::UnresolvedDefault { .. } => "HIERAGG_UNRESOLVED_DEFAULT",
            ConfigurationError::UnresolvedOperator { .. } => "HIERAGG_UNRESOLVED_OPERATOR",
            ConfigurationError::UnknownOperator(_) => "HIERAGG_UNKNOWN_OPERATOR",
            ConfigurationError::IncompatibleOperands { .. } => "HIERAGG_INCOMPATIBLE_OPERANDS",
            ConfigurationError::DivisionByZero => "HIERAGG_DIVISION_BY_ZERO",
            ConfigurationError::Overflow { .. } => "HIERAGG_OVERFLOW",
            ConfigurationError::UnknownSortOrder(_) => "HIERAGG_UNKNOWN_SORT_ORDER",
            ConfigurationError::InvalidOptions(_) => "HIERAGG_INVALID_OPTIONS",
            ConfigurationError::NonNumericTotal { .. } => "HIERAGG_NON_NUMERIC_TOTAL",
            ConfigurationError::NegativeShare { .. } => "HIERAGG_NEGATIVE_SHARE",
            ConfigurationError::TreeCollision { .. } => "HIERAGG_TREE_COLLISION",
        }
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        ConfigurationError::InvalidOptions(err.to_string())
    }
}
