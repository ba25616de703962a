//! # Null-Propagation Folding
//!
//! Scalar simplification driven by the null-propagation classifier:
//!
//! - A scalar subtree that is NULL whatever the input row (`a + NULL`,
//!   `lower(NULL)`, a conditional whose branches are all NULL) is replaced by a
//!   typed NULL literal of the same result type.
//! - A conditional whose condition is statically `TRUE` is replaced by its true
//!   branch. A statically `FALSE` or NULL condition selects the false branch,
//!   matching SQL `CASE`, where a NULL condition is not satisfied.
//!
//! The rule rewrites the root of the expression it is given; a search driver
//! applies it bottom-up.

use optx_ops::expr::Expr;
use optx_ops::null::BoolEval;
use optx_ops::operator::{Operator, ScalarConst, ScalarOp};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::Result;
use tracing::debug;

pub struct NullPropagationFoldRule;

impl Rule for NullPropagationFoldRule {
    fn name(&self) -> &str {
        "NullPropagationFold"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Transformation
    }

    fn pattern(&self) -> Pattern {
        Pattern::any_scalar()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Scalar(op) = expr.op() else {
            return Ok(vec![]);
        };
        if matches!(op, ScalarOp::Const(_)) {
            return Ok(vec![]);
        }

        if expr.is_statically_null() {
            debug!("Folding statically NULL {} to a NULL literal", expr.name());
            let null = ScalarConst::null_of(op.result_type().clone(), op.result_collation());
            return Ok(vec![ctx.builder().node(ScalarOp::Const(null), vec![])?]);
        }

        if let (ScalarOp::If(_), [cond, then_value, else_value]) = (op, expr.children()) {
            let chosen = match cond.eval_bool() {
                BoolEval::True => then_value,
                BoolEval::False | BoolEval::Null => else_value,
                BoolEval::Any => return Ok(vec![]),
            };
            debug!("Folding conditional with constant condition");
            return Ok(vec![chosen.clone()]);
        }

        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optx_ops::builder::ExprBuilder;
    use optx_ops::catalog::InMemoryMetadataProvider;
    use optx_ops::md::builtin;
    use optx_ops::operator::{ArithOp, CmpOp, Datum};
    use optx_ops::rule::apply_rule;

    #[test]
    fn test_null_arithmetic_folds_to_typed_null() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let (ident, null) = (b.ident(&a).unwrap(), b.null(builtin::INT4).unwrap());
        let e = b.arith(ArithOp::Add, builtin::INT4, ident, null).unwrap();

        let folded = apply_rule(&NullPropagationFoldRule, &e, &ctx).unwrap();
        assert_eq!(folded.len(), 1);
        assert!(folded[0].structural_match(&b.null(builtin::INT4).unwrap()));
        assert_eq!(
            ScalarConst::from_operator(folded[0].op()).map(|c| c.value()),
            Some(&Datum::Null)
        );
    }

    #[test]
    fn test_conditional_with_constant_condition() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();

        let pick = |cond: Expr| {
            let e = b
                .scalar_if(builtin::INT4, cond, b.int4(10).unwrap(), b.ident(&a).unwrap())
                .unwrap();
            apply_rule(&NullPropagationFoldRule, &e, &ctx).unwrap()
        };

        let chosen = pick(b.boolean(true).unwrap());
        assert!(chosen[0].structural_match(&b.int4(10).unwrap()));

        let chosen = pick(b.null(builtin::BOOL).unwrap());
        assert!(chosen[0].structural_match(&b.ident(&a).unwrap()));

        let unknown = b.cmp(CmpOp::Lt, b.ident(&a).unwrap(), b.int4(3).unwrap()).unwrap();
        assert!(pick(unknown).is_empty());
    }

    #[test]
    fn test_conditional_with_null_condition_only_is_not_null() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let e = b
            .scalar_if(
                builtin::INT4,
                b.null(builtin::BOOL).unwrap(),
                b.int4(1).unwrap(),
                b.int4(2).unwrap(),
            )
            .unwrap();
        assert!(!e.is_statically_null());

        let all_null = b
            .scalar_if(
                builtin::INT4,
                b.null(builtin::BOOL).unwrap(),
                b.null(builtin::INT4).unwrap(),
                b.null(builtin::INT4).unwrap(),
            )
            .unwrap();
        assert!(all_null.is_statically_null());
    }
}
