//! # Errors
//!
//! Every failure in this crate is local to a single tree operation: a node
//! construction, a copy, or a metadata lookup. Frozen trees are never mutated in
//! place, so an error can never leave shared state half-updated, and nothing here
//! is retried automatically. Retry policy, if any, belongs to the search driver.

use crate::column::ColumnId;
use crate::md::MdKind;
use crate::operator::Arity;

/// Errors produced by the operator/expression layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptError {
    /// The metadata provider has no descriptor for the requested identifier.
    /// Fatal to the construction that asked for it, and to nothing else.
    #[error("unknown {kind} identifier {id}")]
    UnknownMetadataIdentifier { kind: MdKind, id: String },

    /// A node was given a child count its operator does not admit.
    #[error("{op} expects {expected} children, got {actual}")]
    ArityMismatch {
        op: &'static str,
        expected: Arity,
        actual: usize,
    },

    /// A strict column remap met a column reference missing from the map.
    #[error("column {column} is not present in the column map")]
    UnmappedColumn { column: ColumnId },

    /// The expression is deeper than the configured limit.
    #[error("expression exceeds the maximum depth of {limit}")]
    TreeTooDeep { limit: usize },

    /// A column map could not be inverted because two sources share a target.
    #[error("column map is not injective: more than one column maps to {column}")]
    NonInjectiveColumnMap { column: ColumnId },
}

pub type Result<T, E = OptError> = std::result::Result<T, E>;
