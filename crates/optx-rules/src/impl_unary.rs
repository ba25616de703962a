//! Implementation rules for the single-input relational operators.
//!
//! Select, Project and Limit each have exactly one physical counterpart
//! (Filter, ComputeScalar, Limit) with the same child layout, so the rules
//! only swap the operator.

use optx_ops::expr::Expr;
use optx_ops::operator::{LogicalOp, Operator, PhysicalOp};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::Result;

/// Implement logical select as a filter.
pub struct ImplFilterRule;

impl Rule for ImplFilterRule {
    fn name(&self) -> &str {
        "ImplFilter"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::select()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        if !matches!(expr.op(), Operator::Logical(LogicalOp::Select)) {
            return Ok(vec![]);
        }
        Ok(vec![ctx.builder().node(PhysicalOp::Filter, expr.children().to_vec())?])
    }
}

/// Implement logical project as a compute-scalar.
pub struct ImplComputeScalarRule;

impl Rule for ImplComputeScalarRule {
    fn name(&self) -> &str {
        "ImplComputeScalar"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::project()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Project { outputs }) = expr.op() else {
            return Ok(vec![]);
        };
        let op = PhysicalOp::ComputeScalar {
            outputs: outputs.clone(),
        };
        Ok(vec![ctx.builder().node(op, expr.children().to_vec())?])
    }
}

/// Implement logical limit as a physical limit.
pub struct ImplLimitRule;

impl Rule for ImplLimitRule {
    fn name(&self) -> &str {
        "ImplLimit"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::limit()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Limit { offset, count }) = expr.op() else {
            return Ok(vec![]);
        };
        let op = PhysicalOp::Limit {
            offset: *offset,
            count: *count,
        };
        Ok(vec![ctx.builder().node(op, expr.children().to_vec())?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optx_ops::catalog::InMemoryMetadataProvider;
    use optx_ops::md::builtin;
    use optx_ops::operator::CmpOp;
    use optx_ops::rule::apply_rule;

    #[test]
    fn test_unary_operators_keep_children() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let b = ctx.builder();
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let out = b.column(9, None, "a2", builtin::INT4).unwrap();
        let get = b.get("public", "r", vec![a.clone()]).unwrap();
        let pred = b.cmp(CmpOp::Gt, b.ident(&a).unwrap(), b.int4(1).unwrap()).unwrap();
        let select = b.select(get.clone(), pred).unwrap();
        let project = b.project(select.clone(), vec![(out, b.ident(&a).unwrap())]).unwrap();
        let limit = b.limit(project.clone(), 5, Some(10)).unwrap();

        let filter = apply_rule(&ImplFilterRule, &select, &ctx).unwrap();
        assert_eq!(filter[0].name(), "PhysicalFilter");
        assert_eq!(filter[0].children(), select.children());

        let compute = apply_rule(&ImplComputeScalarRule, &project, &ctx).unwrap();
        assert_eq!(compute[0].name(), "PhysicalComputeScalar");
        assert_eq!(compute[0].arity(), 2);

        let phys_limit = apply_rule(&ImplLimitRule, &limit, &ctx).unwrap();
        assert_eq!(
            phys_limit[0].op(),
            &Operator::Physical(PhysicalOp::Limit {
                offset: 5,
                count: Some(10)
            })
        );

        // Patterns keep rules off the wrong operators.
        assert!(apply_rule(&ImplLimitRule, &select, &ctx).unwrap().is_empty());
    }
}
