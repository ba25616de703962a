//! # Expression Trees
//!
//! An [`Expr`] is an operator plus an ordered list of child expressions it
//! owns exclusively. It is the unit rules rewrite and the memo deduplicates.
//! Sharing between plans is the memo's business; at this level ownership is
//! strictly tree-shaped.
//!
//! ## Construction Invariants
//!
//! All trees are built through [`Expr::new`] (or [`Expr::with_depth_limit`]),
//! which enforces, once and for all:
//!
//! - **Arity**: the child count is one the operator admits (`ArityMismatch`).
//! - **Depth**: the tree is no deeper than the limit (`TreeTooDeep`). The
//!   recursive algorithms over trees (matching, copying, folding) grow the
//!   stack as they descend (see [`crate::stack`]), so any tree that can be
//!   built can also be walked.
//! - **Canonical order**: children of `Canonical` operators are sorted by
//!   structural hash.
//!
//! The structural hash and depth are computed bottom-up from the children's
//! cached values and stored on the node. Trees are immutable after
//! construction (there is no `&mut` access to a node), so the cache can never
//! go stale; a rewrite always builds a new tree.
//!
//! ## Equality
//!
//! `PartialEq`/`Eq` for `Expr` is structural matching and `Hash` feeds the
//! structural hash, so trees can key `HashMap`s for deduplication directly.

use crate::error::{OptError, Result};
use crate::md::TypeHandle;
use crate::operator::{ChildOrder, OpKind, Operator};
use crate::stack::maybe_grow;
use crate::structural;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Hard cap on expression depth.
pub const RECURSION_LIMIT: usize = 1024;

#[derive(Clone, Serialize)]
pub struct Expr {
    op: Operator,
    children: Vec<Expr>,
    #[serde(skip)]
    hash: u64,
    #[serde(skip)]
    depth: usize,
}

impl Expr {
    /// Build a node, bounded by [`RECURSION_LIMIT`].
    pub fn new(op: impl Into<Operator>, children: Vec<Expr>) -> Result<Self> {
        Self::with_depth_limit(op, children, RECURSION_LIMIT)
    }

    /// Build a leaf node.
    pub fn leaf(op: impl Into<Operator>) -> Result<Self> {
        Self::new(op, Vec::new())
    }

    /// Build a node, bounded by `limit` (itself capped at [`RECURSION_LIMIT`]).
    pub fn with_depth_limit(
        op: impl Into<Operator>,
        mut children: Vec<Expr>,
        limit: usize,
    ) -> Result<Self> {
        let op = op.into();
        let arity = op.arity();
        if !arity.admits(children.len()) {
            debug!(
                "Rejecting {}: expected {} children, got {}",
                op.name(),
                arity,
                children.len()
            );
            return Err(OptError::ArityMismatch {
                op: op.name(),
                expected: arity,
                actual: children.len(),
            });
        }

        let limit = limit.min(RECURSION_LIMIT);
        let depth = 1 + children.iter().map(Expr::depth).max().unwrap_or(0);
        if depth > limit {
            debug!("Rejecting {}: depth {} exceeds {}", op.name(), depth, limit);
            return Err(OptError::TreeTooDeep { limit });
        }

        if op.child_order() == ChildOrder::Canonical {
            // Stable: children with equal hashes keep their relative order.
            children.sort_by_key(Expr::structural_hash);
        }

        let hash = structural::combine(&op, &children);
        Ok(Self {
            op,
            children,
            hash,
            depth,
        })
    }

    pub fn op(&self) -> &Operator {
        &self.op
    }

    pub fn kind(&self) -> OpKind {
        self.op.kind()
    }

    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    pub fn result_type(&self) -> Option<&TypeHandle> {
        self.op.result_type()
    }

    pub fn input_order_sensitive(&self) -> bool {
        self.op.input_order_sensitive()
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub fn child(&self, i: usize) -> Option<&Expr> {
        self.children.get(i)
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Structural fingerprint, computed at construction.
    pub fn structural_hash(&self) -> u64 {
        self.hash
    }

    /// Take the tree apart to rebuild it with a different operator or children.
    pub fn into_parts(self) -> (Operator, Vec<Expr>) {
        (self.op, self.children)
    }

    /// Pre-order iterator over this node and all its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.structural_match(other)
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            write!(f, "{:?}", self.op)
        } else {
            maybe_grow(|| {
                f.debug_struct("Expr")
                    .field("op", &self.op)
                    .field("children", &self.children)
                    .finish()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryMetadataProvider;
    use crate::md::builtin;
    use crate::operator::{Arity, BoolOpKind, Datum, ScalarBoolOp, ScalarConst, ScalarIf, ScalarOp};

    fn bool_const(p: &InMemoryMetadataProvider, v: bool) -> Expr {
        let op = ScalarConst::new(p, Datum::Bool(v), builtin::BOOL).unwrap();
        Expr::leaf(ScalarOp::Const(op)).unwrap()
    }

    #[test]
    fn test_arity_is_checked() {
        let p = InMemoryMetadataProvider::with_builtins();
        let op = ScalarOp::If(ScalarIf::new(&p, builtin::BOOL, 0).unwrap());
        let err = Expr::new(op, vec![bool_const(&p, true), bool_const(&p, false)]).unwrap_err();
        assert_eq!(
            err,
            OptError::ArityMismatch {
                op: "ScalarIf",
                expected: Arity::Exact(3),
                actual: 2
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let p = InMemoryMetadataProvider::with_builtins();
        let not = || ScalarOp::BoolOp(ScalarBoolOp::new(&p, BoolOpKind::Not).unwrap());

        let mut e = bool_const(&p, true);
        for _ in 0..4 {
            e = Expr::with_depth_limit(not(), vec![e], 5).unwrap();
        }
        assert_eq!(e.depth(), 5);
        let err = Expr::with_depth_limit(not(), vec![e], 5).unwrap_err();
        assert_eq!(err, OptError::TreeTooDeep { limit: 5 });
    }

    #[test]
    fn test_global_cap_applies() {
        let p = InMemoryMetadataProvider::with_builtins();
        let not = ScalarOp::BoolOp(ScalarBoolOp::new(&p, BoolOpKind::Not).unwrap());
        let mut e = bool_const(&p, true);
        let mut result = Ok(());
        for _ in 0..RECURSION_LIMIT + 1 {
            match Expr::with_depth_limit(not.clone(), vec![e.clone()], usize::MAX) {
                Ok(next) => e = next,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        assert_eq!(result, Err(OptError::TreeTooDeep { limit: RECURSION_LIMIT }));
        assert_eq!(e.depth(), RECURSION_LIMIT);
    }

    #[test]
    fn test_preorder_iter() {
        let p = InMemoryMetadataProvider::with_builtins();
        let and = ScalarOp::BoolOp(ScalarBoolOp::new(&p, BoolOpKind::And).unwrap());
        let e = Expr::new(and, vec![bool_const(&p, true), bool_const(&p, false)]).unwrap();
        let names: Vec<_> = e.iter().map(Expr::name).collect();
        assert_eq!(names, vec!["ScalarBoolOp", "ScalarConst", "ScalarConst"]);
    }
}
