//! # Join Implementation Rules
//!
//! Two implementation rules map a logical Join to physical join operators.
//! The physical join keeps the logical join's children (outer, inner,
//! predicate), so only the operator changes.
//!
//! ## Hash Join (`ImplHashJoinRule`)
//!
//! Builds a hash table on one side and probes it with the other. Produces two
//! alternatives per join (build-left and build-right) so the cost model can pick
//! the cheaper orientation.
//!
//! **Requires**: an equality between two column references, either as the
//! whole predicate or as one of its top-level conjuncts. Cross joins never
//! qualify.
//!
//! ## Nested Loop Join (`ImplNestedLoopJoinRule`)
//!
//! The universal fallback: for each outer row, scans all inner rows. Works with
//! any predicate, including non-equi predicates and cross joins.

use optx_ops::expr::Expr;
use optx_ops::operator::{
    BoolOpKind, BuildSide, CmpOp, JoinType, LogicalOp, Operator, PhysicalOp, ScalarOp,
};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::Result;
use tracing::trace;

/// Implement logical join as a hash join, with both build sides.
pub struct ImplHashJoinRule;

impl Rule for ImplHashJoinRule {
    fn name(&self) -> &str {
        "ImplHashJoin"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::join()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Join { join_type }) = expr.op() else {
            return Ok(vec![]);
        };
        if *join_type == JoinType::Cross {
            return Ok(vec![]);
        }
        let Some(predicate) = expr.child(2) else {
            return Ok(vec![]);
        };
        if !has_equi_conjunct(predicate) {
            trace!("No equi-join conjunct, skipping hash join");
            return Ok(vec![]);
        }

        let b = ctx.builder();
        [BuildSide::Left, BuildSide::Right]
            .into_iter()
            .map(|build_side| {
                let op = PhysicalOp::HashJoin {
                    join_type: *join_type,
                    build_side,
                };
                b.node(op, expr.children().to_vec())
            })
            .collect()
    }
}

/// Implement logical join as a nested loop join.
pub struct ImplNestedLoopJoinRule;

impl Rule for ImplNestedLoopJoinRule {
    fn name(&self) -> &str {
        "ImplNestedLoopJoin"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::join()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Join { join_type }) = expr.op() else {
            return Ok(vec![]);
        };
        let op = PhysicalOp::NestedLoopJoin {
            join_type: *join_type,
        };
        Ok(vec![ctx.builder().node(op, expr.children().to_vec())?])
    }
}

fn is_column_equality(e: &Expr) -> bool {
    let is_ident = |c: &Expr| matches!(c.op(), Operator::Scalar(ScalarOp::Ident(_)));
    match e.op() {
        Operator::Scalar(ScalarOp::Cmp(cmp)) if cmp.op() == CmpOp::Eq => {
            e.children().iter().all(is_ident)
        }
        _ => false,
    }
}

/// Check if the predicate contains an equality between two columns.
pub fn has_equi_conjunct(predicate: &Expr) -> bool {
    match predicate.op() {
        Operator::Scalar(ScalarOp::BoolOp(b)) if b.op() == BoolOpKind::And => {
            predicate.children().iter().any(is_column_equality)
        }
        _ => is_column_equality(predicate),
    }
}
