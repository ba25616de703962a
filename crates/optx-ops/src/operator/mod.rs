//! # Operator Taxonomy
//!
//! This module defines the closed set of operators the optimizer knows about.
//! It is organized into three layers:
//!
//! ## Scalar Operators (`ScalarOp`)
//! Computations on individual rows: column references, literals, conditionals,
//! comparisons, boolean logic, arithmetic and function calls. A scalar operator
//! always produces a typed value and therefore carries a result type handle.
//!
//! ## Logical Operators (`LogicalOp`)
//! Relational operators describing *what* to compute (get, select, project,
//! join, limit). They have no scalar result type.
//!
//! ## Physical Operators (`PhysicalOp`)
//! Relational operators describing *how* to compute (table scan, filter, hash
//! join, ...). Produced from logical operators by implementation rules.
//!
//! ## Uniform Capability Interface
//! The memo and the rules never look inside a payload to group or compare
//! nodes. They dispatch on [`OpKind`] first and then use the accessors on
//! [`Operator`]: `kind`, `name`, `result_type`, `result_collation`,
//! `input_order_sensitive`, `arity`, `null_policy`, and the remapping copy in
//! [`crate::remap`].
//!
//! ## Child Ordering
//! Each operator declares a [`ChildOrder`]:
//!
//! - `Positional`: swapping children changes the meaning (the conditional's
//!   true/false branches, `a - b`, joins).
//! - `Permutation`: children form a multiset (`AND`, `OR`, `+`, `*`). Matching
//!   searches for a pairing; hashing combines child hashes order-independently.
//! - `Canonical`: children are sorted by structural hash when the node is built
//!   (`=`, `<>`, `IS DISTINCT FROM`), so structurally equal inputs end up in the
//!   same positions and matching is positional, falling back to a pairing only
//!   for children whose hashes tie.

mod logical;
mod physical;
mod scalar;

pub use logical::*;
pub use physical::*;
pub use scalar::*;

use crate::md::{Oid, TypeHandle, INVALID_OID};
use crate::null::NullPolicy;
use serde::Serialize;
use std::fmt;

/// Unified operator enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Scalar(ScalarOp),
    Logical(LogicalOp),
    Physical(PhysicalOp),
}

/// Kind discriminant for dispatch (without data).
///
/// `OpKind` strips away every payload field and keeps only which operator a
/// node is. Patterns, rules and plan tooling key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpKind {
    Scalar(ScalarOpKind),
    Logical(LogicalOpKind),
    Physical(PhysicalOpKind),
}

impl OpKind {
    /// Stable name of the kind. Plan dumps and tests key off these strings, so
    /// they must never change for an existing kind.
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Scalar(k) => k.name(),
            OpKind::Logical(k) => k.name(),
            OpKind::Physical(k) => k.name(),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of children an operator admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Any child count, including zero.
    Variadic,
}

impl Arity {
    pub fn admits(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "exactly {}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// How an operator's children participate in hashing and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildOrder {
    Positional,
    Permutation,
    Canonical,
}

impl Operator {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Operator::Scalar(_))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Logical(_))
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, Operator::Physical(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarOp> {
        match self {
            Operator::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_logical(&self) -> Option<&LogicalOp> {
        match self {
            Operator::Logical(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_physical(&self) -> Option<&PhysicalOp> {
        match self {
            Operator::Physical(p) => Some(p),
            _ => None,
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operator::Scalar(s) => OpKind::Scalar(s.kind()),
            Operator::Logical(l) => OpKind::Logical(l.kind()),
            Operator::Physical(p) => OpKind::Physical(p.kind()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Type of the value this operator produces; `None` for relational operators.
    pub fn result_type(&self) -> Option<&TypeHandle> {
        match self {
            Operator::Scalar(s) => Some(s.result_type()),
            Operator::Logical(_) | Operator::Physical(_) => None,
        }
    }

    /// Collation of the result, or [`INVALID_OID`] when the result is not collatable.
    pub fn result_collation(&self) -> Oid {
        match self {
            Operator::Scalar(s) => s.result_collation(),
            Operator::Logical(_) | Operator::Physical(_) => INVALID_OID,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::Scalar(s) => s.arity(),
            Operator::Logical(l) => l.arity(),
            Operator::Physical(p) => p.arity(),
        }
    }

    pub fn child_order(&self) -> ChildOrder {
        match self {
            Operator::Scalar(s) => s.child_order(),
            // Join commutativity is a rule, not structural identity.
            Operator::Logical(_) | Operator::Physical(_) => ChildOrder::Positional,
        }
    }

    /// Does reordering the children change the expression's meaning?
    pub fn input_order_sensitive(&self) -> bool {
        self.child_order() == ChildOrder::Positional
    }

    /// Null-propagation policy; only scalar operators have one.
    pub fn null_policy(&self) -> Option<NullPolicy> {
        self.as_scalar().map(ScalarOp::null_policy)
    }
}

impl From<ScalarOp> for Operator {
    fn from(op: ScalarOp) -> Self {
        Operator::Scalar(op)
    }
}

impl From<LogicalOp> for Operator {
    fn from(op: LogicalOp) -> Self {
        Operator::Logical(op)
    }
}

impl From<PhysicalOp> for Operator {
    fn from(op: PhysicalOp) -> Self {
        Operator::Physical(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Scalar(s) => write!(f, "{}", s),
            Operator::Logical(l) => write!(f, "{}", l),
            Operator::Physical(p) => write!(f, "{}", p),
        }
    }
}
