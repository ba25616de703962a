//! Physical operators -- represent *how* to execute a computation.
//!
//! Child layout mirrors the logical operator each one implements, so an
//! implementation rule can swap the operator and keep the children.

use super::logical::{fmt_columns, JoinType, TableRef};
use super::Arity;
use crate::column::ColumnRef;
use serde::Serialize;
use std::fmt;

/// Build side for hash joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PhysicalOp {
    /// Sequential scan of a base table.
    TableScan {
        table: TableRef,
        columns: Vec<ColumnRef>,
    },
    /// Children: input, predicate.
    Filter,
    /// Children: input, then one scalar per output column.
    ComputeScalar { outputs: Vec<ColumnRef> },
    /// Children: outer, inner, predicate. Needs an equality conjunct.
    HashJoin {
        join_type: JoinType,
        build_side: BuildSide,
    },
    /// Children: outer, inner, predicate. Works for any predicate.
    NestedLoopJoin { join_type: JoinType },
    Limit { offset: u64, count: Option<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhysicalOpKind {
    TableScan,
    Filter,
    ComputeScalar,
    HashJoin,
    NestedLoopJoin,
    Limit,
}

impl PhysicalOpKind {
    pub const ALL: [PhysicalOpKind; 6] = [
        PhysicalOpKind::TableScan,
        PhysicalOpKind::Filter,
        PhysicalOpKind::ComputeScalar,
        PhysicalOpKind::HashJoin,
        PhysicalOpKind::NestedLoopJoin,
        PhysicalOpKind::Limit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PhysicalOpKind::TableScan => "PhysicalTableScan",
            PhysicalOpKind::Filter => "PhysicalFilter",
            PhysicalOpKind::ComputeScalar => "PhysicalComputeScalar",
            PhysicalOpKind::HashJoin => "PhysicalHashJoin",
            PhysicalOpKind::NestedLoopJoin => "PhysicalNestedLoopJoin",
            PhysicalOpKind::Limit => "PhysicalLimit",
        }
    }
}

impl PhysicalOp {
    pub fn kind(&self) -> PhysicalOpKind {
        match self {
            PhysicalOp::TableScan { .. } => PhysicalOpKind::TableScan,
            PhysicalOp::Filter => PhysicalOpKind::Filter,
            PhysicalOp::ComputeScalar { .. } => PhysicalOpKind::ComputeScalar,
            PhysicalOp::HashJoin { .. } => PhysicalOpKind::HashJoin,
            PhysicalOp::NestedLoopJoin { .. } => PhysicalOpKind::NestedLoopJoin,
            PhysicalOp::Limit { .. } => PhysicalOpKind::Limit,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            PhysicalOp::TableScan { .. } => Arity::Exact(0),
            PhysicalOp::Filter => Arity::Exact(2),
            PhysicalOp::ComputeScalar { outputs } => Arity::Exact(1 + outputs.len()),
            PhysicalOp::HashJoin { .. } | PhysicalOp::NestedLoopJoin { .. } => Arity::Exact(3),
            PhysicalOp::Limit { .. } => Arity::Exact(1),
        }
    }
}

impl fmt::Display for PhysicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            PhysicalOp::TableScan { table, columns } => {
                write!(f, "{} \"{}\" ({})", name, table, fmt_columns(columns))
            }
            PhysicalOp::Filter => f.write_str(name),
            PhysicalOp::ComputeScalar { outputs } => {
                write!(f, "{} ({})", name, fmt_columns(outputs))
            }
            PhysicalOp::HashJoin {
                join_type,
                build_side,
            } => write!(f, "{} ({:?}, build {:?})", name, join_type, build_side),
            PhysicalOp::NestedLoopJoin { join_type } => write!(f, "{} ({:?})", name, join_type),
            PhysicalOp::Limit { offset, count } => match count {
                Some(count) => write!(f, "{} (offset {}, count {})", name, offset, count),
                None => write!(f, "{} (offset {})", name, offset),
            },
        }
    }
}
