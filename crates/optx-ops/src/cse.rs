//! Common-subexpression detection.
//!
//! Finds subtrees that occur more than once in an expression, up to structural
//! matching, so the caller can compute them once (for example as an extra
//! projection column). Only maximal repeats are reported: once a subtree is a
//! repeat, its own descendants are not reported separately. Leaves (column
//! references, literals) are never worth factoring out and are skipped.

use crate::expr::Expr;
use std::collections::HashMap;
use tracing::debug;

/// Maximal repeated non-leaf subtrees of `root`, with their occurrence counts,
/// in the pre-order position of their first occurrence.
pub fn common_subexpressions(root: &Expr) -> Vec<(&Expr, usize)> {
    let mut counts: HashMap<&Expr, usize> = HashMap::new();
    for e in root.iter().filter(|e| !e.is_leaf()) {
        *counts.entry(e).or_insert(0) += 1;
    }

    let mut found: Vec<(&Expr, usize)> = Vec::new();
    let mut stack = vec![root];
    while let Some(e) = stack.pop() {
        let count = if e.is_leaf() { 0 } else { counts[e] };
        if count > 1 {
            if !found.iter().any(|(seen, _)| seen.structural_match(e)) {
                found.push((e, count));
            }
            continue;
        }
        stack.extend(e.children().iter().rev());
    }

    if !found.is_empty() {
        debug!("Found {} common subexpressions", found.len());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExprBuilder;
    use crate::catalog::InMemoryMetadataProvider;
    use crate::column::ColumnRef;
    use crate::md::builtin;
    use crate::operator::{ArithOp, CmpOp};

    #[test]
    fn test_repeated_sum_is_reported_once() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let c = b.column(2, Some("r"), "c", builtin::INT4).unwrap();
        let sum = |l: &ColumnRef, r: &ColumnRef| {
            b.arith(ArithOp::Add, builtin::INT4, b.ident(l).unwrap(), b.ident(r).unwrap())
                .unwrap()
        };

        // (a + c) > 0 AND (c + a) < 10
        let e = b
            .and(vec![
                b.cmp(CmpOp::Gt, sum(&a, &c), b.int4(0).unwrap()).unwrap(),
                b.cmp(CmpOp::Lt, sum(&c, &a), b.int4(10).unwrap()).unwrap(),
            ])
            .unwrap();

        let cse = common_subexpressions(&e);
        assert_eq!(cse.len(), 1);
        assert_eq!(cse[0].0.name(), "ScalarArith");
        assert_eq!(cse[0].1, 2);
    }

    #[test]
    fn test_only_maximal_repeats() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let inner = || {
            b.arith(ArithOp::Mul, builtin::INT4, b.ident(&a).unwrap(), b.int4(2).unwrap())
                .unwrap()
        };
        let outer = || b.arith(ArithOp::Sub, builtin::INT4, inner(), b.int4(1).unwrap()).unwrap();

        let e = b.cmp(CmpOp::Lt, outer(), outer()).unwrap();
        let cse = common_subexpressions(&e);
        assert_eq!(cse.len(), 1);
        assert_eq!(cse[0].0.structural_hash(), outer().structural_hash());
    }

    #[test]
    fn test_no_repeats() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let e = b.cmp(CmpOp::Lt, b.ident(&a).unwrap(), b.ident(&a).unwrap()).unwrap();
        assert!(common_subexpressions(&e).is_empty());
    }
}
