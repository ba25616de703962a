//! # Structural Hash & Match Engine
//!
//! Decides whether two expression trees are structurally interchangeable,
//! independent of which node instances they are. The memo uses this to put a
//! newly produced expression into the group that already holds its twin, and
//! the common-subexpression pass uses it to find repeated subtrees.
//!
//! ## Hash
//!
//! The hash of a node combines its operator (kind plus every declared
//! attribute, through the derived `Hash` on [`Operator`]), its arity, and the
//! hashes of its children:
//!
//! - `Positional` and `Canonical` operators feed child hashes in child order.
//!   For `Canonical` operators that order is already sorted by hash.
//! - `Permutation` operators feed the sorted list of child hashes, so any
//!   permutation of the children hashes the same.
//!
//! The hasher is `DefaultHasher::new()`, which is keyed identically for every
//! instance, so independently built copies of a tree always agree.
//!
//! ## Match
//!
//! Two trees match iff their operators are equal, they have the same number of
//! children, and the children match:
//!
//! - positionally, for `Positional` operators;
//! - positionally or else by pairing, for `Canonical` operators (the pairing
//!   only matters when two children have equal hashes but differ);
//! - by pairing, for `Permutation` operators.
//!
//! Pairing is greedy: each left child takes the first unused right child it
//! matches. Because matching is an equivalence relation, greedy pairing finds
//! a complete pairing whenever one exists.
//!
//! ## Consistency
//!
//! Equal operators hash equal, and a pairing of children implies equal sorted
//! child-hash lists, so `a.structural_match(b)` implies equal hashes. The
//! converse does not hold; a hash collision falls through to the full match.
//! Matching exploits this by rejecting on unequal hashes first.

use crate::expr::Expr;
use crate::operator::{ChildOrder, Operator};
use crate::stack::maybe_grow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash a node from its operator and its children's cached hashes.
pub(crate) fn combine(op: &Operator, children: &[Expr]) -> u64 {
    let mut hasher = DefaultHasher::new();
    op.hash(&mut hasher);
    children.len().hash(&mut hasher);
    match op.child_order() {
        ChildOrder::Positional | ChildOrder::Canonical => {
            for child in children {
                hasher.write_u64(child.structural_hash());
            }
        }
        ChildOrder::Permutation => {
            let mut hashes: Vec<u64> = children.iter().map(Expr::structural_hash).collect();
            hashes.sort_unstable();
            for h in hashes {
                hasher.write_u64(h);
            }
        }
    }
    hasher.finish()
}

impl Expr {
    /// Are `self` and `other` structurally interchangeable?
    pub fn structural_match(&self, other: &Expr) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.structural_hash() != other.structural_hash() {
            return false;
        }
        if self.arity() != other.arity() || self.op() != other.op() {
            return false;
        }

        let (left, right) = (self.children(), other.children());
        maybe_grow(|| match self.op().child_order() {
            ChildOrder::Positional => positional_match(left, right),
            ChildOrder::Canonical => {
                positional_match(left, right) || permutation_match(left, right)
            }
            ChildOrder::Permutation => permutation_match(left, right),
        })
    }
}

fn positional_match(left: &[Expr], right: &[Expr]) -> bool {
    left.iter().zip(right).all(|(l, r)| l.structural_match(r))
}

fn permutation_match(left: &[Expr], right: &[Expr]) -> bool {
    let mut used = vec![false; right.len()];
    'outer: for l in left {
        for (j, r) in right.iter().enumerate() {
            if !used[j] && l.structural_match(r) {
                used[j] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use crate::builder::ExprBuilder;
    use crate::catalog::InMemoryMetadataProvider;
    use crate::md::builtin;
    use crate::operator::{ArithOp, CmpOp, JoinType};

    #[test]
    fn test_commutative_and_matches_any_order() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let x = b.column(1, Some("r"), "x", builtin::BOOL).unwrap();
        let y = b.column(2, Some("r"), "y", builtin::BOOL).unwrap();
        let z = b.column(3, Some("r"), "z", builtin::BOOL).unwrap();

        let xyz = b
            .and(vec![b.ident(&x).unwrap(), b.ident(&y).unwrap(), b.ident(&z).unwrap()])
            .unwrap();
        let zxy = b
            .and(vec![b.ident(&z).unwrap(), b.ident(&x).unwrap(), b.ident(&y).unwrap()])
            .unwrap();
        let xxy = b
            .and(vec![b.ident(&x).unwrap(), b.ident(&x).unwrap(), b.ident(&y).unwrap()])
            .unwrap();

        assert_eq!(xyz.structural_hash(), zxy.structural_hash());
        assert!(xyz.structural_match(&zxy));
        assert!(!xyz.structural_match(&xxy));
    }

    #[test]
    fn test_subtraction_is_order_sensitive() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let c = b.column(2, Some("r"), "c", builtin::INT4).unwrap();

        let ab = b
            .arith(ArithOp::Sub, builtin::INT4, b.ident(&a).unwrap(), b.ident(&c).unwrap())
            .unwrap();
        let ba = b
            .arith(ArithOp::Sub, builtin::INT4, b.ident(&c).unwrap(), b.ident(&a).unwrap())
            .unwrap();
        assert!(!ab.structural_match(&ba));

        let sum_ab = b
            .arith(ArithOp::Add, builtin::INT4, b.ident(&a).unwrap(), b.ident(&c).unwrap())
            .unwrap();
        let sum_ba = b
            .arith(ArithOp::Add, builtin::INT4, b.ident(&c).unwrap(), b.ident(&a).unwrap())
            .unwrap();
        assert!(sum_ab.structural_match(&sum_ba));
    }

    #[test]
    fn test_equality_is_canonicalized_at_construction() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let c = b.column(2, Some("s"), "c", builtin::INT4).unwrap();

        let ac = b.cmp(CmpOp::Eq, b.ident(&a).unwrap(), b.ident(&c).unwrap()).unwrap();
        let ca = b.cmp(CmpOp::Eq, b.ident(&c).unwrap(), b.ident(&a).unwrap()).unwrap();

        // Both end up with the same child order.
        assert_eq!(ac.children()[0].structural_hash(), ca.children()[0].structural_hash());
        assert!(ac.structural_match(&ca));

        let lt_ac = b.cmp(CmpOp::Lt, b.ident(&a).unwrap(), b.ident(&c).unwrap()).unwrap();
        let lt_ca = b.cmp(CmpOp::Lt, b.ident(&c).unwrap(), b.ident(&a).unwrap()).unwrap();
        assert!(!lt_ac.structural_match(&lt_ca));
    }

    #[test]
    fn test_attributes_take_part() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let ten_int4 = b.int4(10).unwrap();
        let ten_int8 = b.constant(crate::operator::Datum::Int64(10), builtin::INT8).unwrap();
        assert!(!ten_int4.structural_match(&ten_int8));

        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let scan = || b.get("public", "r", vec![a.clone()]).unwrap();
        let pred = || b.cmp(CmpOp::Eq, b.ident(&a).unwrap(), b.int4(1).unwrap()).unwrap();
        let inner = b.join(JoinType::Inner, scan(), scan(), pred()).unwrap();
        let left = b.join(JoinType::Left, scan(), scan(), pred()).unwrap();
        assert!(!inner.structural_match(&left));
    }

    #[test]
    fn test_scalar_never_matches_relational() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let ident = b.ident(&a).unwrap();
        let get = b.get("public", "r", vec![a.clone()]).unwrap();
        assert!(ident.result_type().is_some());
        assert!(get.result_type().is_none());
        assert!(!ident.structural_match(&get));
        assert!(!get.structural_match(&ident));
    }
}
