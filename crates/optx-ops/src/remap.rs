//! # Column-Remapping Copier
//!
//! When an expression crosses a plan boundary (pushed through a projection or
//! a join, or pulled out of a de-correlated subquery) its column references
//! must be rewritten to the columns visible on the other side. The copier
//! builds a new tree, isomorphic to the source, with every column reference
//! `c` replaced by `map[c]` where the map has an entry.
//!
//! ## Strictness
//!
//! - `must_exist = true`: a reference missing from the map fails the whole copy
//!   with `UnmappedColumn`. The caller expected to touch every column.
//! - `must_exist = false`: unmapped references are copied unchanged. Used when
//!   only a subset (say the columns crossing a subquery boundary) is remapped.
//!
//! ## Per-operator behavior
//!
//! Operators that reference columns in their payload (`ScalarIdent`, and the
//! column lists of `Get`, `Project`, `TableScan`, `ComputeScalar`) rewrite
//! them. Every other operator, including the conditional, is copied verbatim
//! and its children are remapped recursively. Copying clones the payload, which
//! re-acquires every metadata handle: the source tree stays valid and is
//! released independently.
//!
//! The copy goes through [`Expr::new`], so `Canonical` operators are re-sorted
//! after their children's hashes change.

use crate::column::{ColumnMap, ColumnRef};
use crate::error::{OptError, Result};
use crate::expr::Expr;
use crate::operator::{LogicalOp, Operator, PhysicalOp, ScalarIdent, ScalarOp};
use crate::stack::maybe_grow;
use std::collections::BTreeSet;
use tracing::trace;

fn remap_column(column: &ColumnRef, map: &ColumnMap, must_exist: bool) -> Result<ColumnRef> {
    match map.target(column.id) {
        Some(target) => {
            trace!("Remapping column {} to {}", column.id, target.id);
            Ok(target.clone())
        }
        None if must_exist => Err(OptError::UnmappedColumn { column: column.id }),
        None => Ok(column.clone()),
    }
}

fn remap_columns(
    columns: &[ColumnRef],
    map: &ColumnMap,
    must_exist: bool,
) -> Result<Vec<ColumnRef>> {
    columns
        .iter()
        .map(|c| remap_column(c, map, must_exist))
        .collect()
}

impl Operator {
    /// Copy of this operator with its own column references remapped.
    pub fn copy_with_column_map(&self, map: &ColumnMap, must_exist: bool) -> Result<Operator> {
        let op = match self {
            Operator::Scalar(ScalarOp::Ident(ident)) => Operator::Scalar(ScalarOp::Ident(
                ScalarIdent::new(remap_column(ident.column(), map, must_exist)?),
            )),
            Operator::Logical(LogicalOp::Get { table, columns }) => {
                Operator::Logical(LogicalOp::Get {
                    table: table.clone(),
                    columns: remap_columns(columns, map, must_exist)?,
                })
            }
            Operator::Logical(LogicalOp::Project { outputs }) => {
                Operator::Logical(LogicalOp::Project {
                    outputs: remap_columns(outputs, map, must_exist)?,
                })
            }
            Operator::Physical(PhysicalOp::TableScan { table, columns }) => {
                Operator::Physical(PhysicalOp::TableScan {
                    table: table.clone(),
                    columns: remap_columns(columns, map, must_exist)?,
                })
            }
            Operator::Physical(PhysicalOp::ComputeScalar { outputs }) => {
                Operator::Physical(PhysicalOp::ComputeScalar {
                    outputs: remap_columns(outputs, map, must_exist)?,
                })
            }
            // No column references in the payload: default copy.
            other => other.clone(),
        };
        Ok(op)
    }
}

impl Expr {
    /// Deep copy with column references substituted per `map`.
    pub fn copy_with_column_map(&self, map: &ColumnMap, must_exist: bool) -> Result<Expr> {
        maybe_grow(|| {
            let op = self.op().copy_with_column_map(map, must_exist)?;
            let mut children = Vec::with_capacity(self.arity());
            for child in self.children() {
                children.push(child.copy_with_column_map(map, must_exist)?);
            }

            Expr::new(op, children).map_err(|e| {
                // Remapping preserves shape; a rejected rebuild is a logic defect.
                debug_assert!(
                    !matches!(e, OptError::ArityMismatch { .. }),
                    "remapped copy changed arity of {}",
                    self.name()
                );
                e
            })
        })
    }

    /// Ids of the columns this expression reads through `ScalarIdent`.
    pub fn used_columns(&self) -> BTreeSet<crate::column::ColumnId> {
        self.iter()
            .filter_map(|e| match e.op() {
                Operator::Scalar(ScalarOp::Ident(ident)) => Some(ident.column().id),
                _ => None,
            })
            .collect()
    }
}
