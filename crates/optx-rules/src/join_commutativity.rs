//! # Join Commutativity Rule
//!
//! This rule implements the algebraic identity `A JOIN B = B JOIN A` for
//! symmetric join types (inner joins and cross joins).
//!
//! In a cost-based optimizer the order of join inputs matters: the smaller
//! relation should be the hash join build side, and combined with other
//! reordering rules commutativity lets the search explore join orders.
//!
//! ## Applicability
//!
//! Only `Inner` and `Cross` joins. Left, Right, Full, Semi and Anti joins have
//! fixed left/right semantics and cannot be commuted without changing the
//! result.
//!
//! The join predicate is carried over untouched. Joins are `Positional` for
//! structural matching, so the swapped join is a distinct tree; equality
//! comparisons inside the predicate are canonical already and need no
//! rewriting.

use optx_ops::expr::Expr;
use optx_ops::operator::{LogicalOp, Operator};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::Result;

/// Join commutativity: A JOIN B -> B JOIN A.
pub struct JoinCommutativityRule;

impl Rule for JoinCommutativityRule {
    fn name(&self) -> &str {
        "JoinCommutativity"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Transformation
    }

    fn pattern(&self) -> Pattern {
        Pattern::join()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Join { join_type }) = expr.op() else {
            return Ok(vec![]);
        };
        if !join_type.is_commutative() {
            return Ok(vec![]);
        }

        let [outer, inner, predicate] = expr.children() else {
            return Ok(vec![]);
        };
        let swapped = ctx.builder().join(
            *join_type,
            inner.clone(),
            outer.clone(),
            predicate.clone(),
        )?;
        Ok(vec![swapped])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optx_ops::catalog::InMemoryMetadataProvider;
    use optx_ops::md::builtin;
    use optx_ops::operator::{CmpOp, JoinType};
    use optx_ops::rule::apply_rule;

    fn join(ctx: &OptContext, join_type: JoinType) -> Expr {
        let b = ctx.builder();
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let x = b.column(2, Some("s"), "x", builtin::INT4).unwrap();
        let r = b.get("public", "r", vec![a.clone()]).unwrap();
        let s = b.get("public", "s", vec![x.clone()]).unwrap();
        let pred = b.cmp(CmpOp::Eq, b.ident(&a).unwrap(), b.ident(&x).unwrap()).unwrap();
        b.join(join_type, r, s, pred).unwrap()
    }

    #[test]
    fn test_inner_join_is_swapped() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let original = join(&ctx, JoinType::Inner);

        let results = apply_rule(&JoinCommutativityRule, &original, &ctx).unwrap();
        assert_eq!(results.len(), 1);
        let swapped = &results[0];
        assert!(!swapped.structural_match(&original));
        assert!(swapped.child(0).unwrap().structural_match(original.child(1).unwrap()));
        assert!(swapped.child(1).unwrap().structural_match(original.child(0).unwrap()));
        assert!(swapped.child(2).unwrap().structural_match(original.child(2).unwrap()));

        // Swapping twice gets back to the original.
        let back = apply_rule(&JoinCommutativityRule, swapped, &ctx).unwrap();
        assert!(back[0].structural_match(&original));
    }

    #[test]
    fn test_left_join_is_not_swapped() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let left = join(&ctx, JoinType::Left);
        assert!(apply_rule(&JoinCommutativityRule, &left, &ctx).unwrap().is_empty());
    }
}
