//! Logical operators -- represent *what* to compute, not *how*.
//!
//! Scalar parts of a logical operator (predicates, projected expressions) are
//! children of the expression tree rather than payload, so they take part in
//! structural matching and column remapping like any other subtree.

use super::Arity;
use crate::column::ColumnRef;
use serde::Serialize;
use std::fmt;

/// Reference to a table in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// SQL join types.
///
/// Only inner and cross joins may swap their inputs; the others have fixed
/// left/right semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Semi,
    Anti,
    Cross,
}

impl JoinType {
    pub fn is_commutative(&self) -> bool {
        matches!(self, JoinType::Inner | JoinType::Cross)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOp {
    /// Reads a base table and defines its output columns. Always a leaf.
    Get {
        table: TableRef,
        columns: Vec<ColumnRef>,
    },
    /// Children: input relation, predicate.
    Select,
    /// Children: input relation, then one scalar per entry of `outputs`; child
    /// `i + 1` computes `outputs[i]`.
    Project { outputs: Vec<ColumnRef> },
    /// Children: outer relation, inner relation, join predicate.
    Join { join_type: JoinType },
    /// Children: input relation.
    Limit { offset: u64, count: Option<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOpKind {
    Get,
    Select,
    Project,
    Join,
    Limit,
}

impl LogicalOpKind {
    pub const ALL: [LogicalOpKind; 5] = [
        LogicalOpKind::Get,
        LogicalOpKind::Select,
        LogicalOpKind::Project,
        LogicalOpKind::Join,
        LogicalOpKind::Limit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogicalOpKind::Get => "LogicalGet",
            LogicalOpKind::Select => "LogicalSelect",
            LogicalOpKind::Project => "LogicalProject",
            LogicalOpKind::Join => "LogicalJoin",
            LogicalOpKind::Limit => "LogicalLimit",
        }
    }
}

impl LogicalOp {
    pub fn kind(&self) -> LogicalOpKind {
        match self {
            LogicalOp::Get { .. } => LogicalOpKind::Get,
            LogicalOp::Select => LogicalOpKind::Select,
            LogicalOp::Project { .. } => LogicalOpKind::Project,
            LogicalOp::Join { .. } => LogicalOpKind::Join,
            LogicalOp::Limit { .. } => LogicalOpKind::Limit,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            LogicalOp::Get { .. } => Arity::Exact(0),
            LogicalOp::Select => Arity::Exact(2),
            LogicalOp::Project { outputs } => Arity::Exact(1 + outputs.len()),
            LogicalOp::Join { .. } => Arity::Exact(3),
            LogicalOp::Limit { .. } => Arity::Exact(1),
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            LogicalOp::Get { table, columns } => {
                write!(f, "{} \"{}\" ({})", name, table, fmt_columns(columns))
            }
            LogicalOp::Select => f.write_str(name),
            LogicalOp::Project { outputs } => write!(f, "{} ({})", name, fmt_columns(outputs)),
            LogicalOp::Join { join_type } => write!(f, "{} ({:?})", name, join_type),
            LogicalOp::Limit { offset, count } => match count {
                Some(count) => write!(f, "{} (offset {}, count {})", name, offset, count),
                None => write!(f, "{} (offset {})", name, offset),
            },
        }
    }
}

pub(crate) fn fmt_columns(columns: &[ColumnRef]) -> String {
    columns
        .iter()
        .map(|c| format!("{}{}", c, c.id))
        .collect::<Vec<_>>()
        .join(", ")
}
