//! # Predicate Pushdown Rule
//!
//! Pushes a Select below a Project:
//!
//! ```text
//! Select(Project(input, e1..en), pred)  ->  Project(Select(input, pred'), e1..en)
//! ```
//!
//! Filtering before projecting reduces the rows the projection computes. The
//! predicate refers to the projection's output columns; below the projection
//! those names do not exist, so `pred'` is `pred` copied with each output column
//! replaced by the input column it renames. The copy is strict: if the predicate
//! reads an output that is computed (not a plain column), there is nothing to
//! rename it to and the rule produces no alternative.

use optx_ops::column::ColumnMap;
use optx_ops::expr::Expr;
use optx_ops::operator::{LogicalOp, Operator, ScalarIdent};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::{OptError, Result};
use tracing::{debug, trace};

/// Push a select below a project.
pub struct PredicatePushdownRule;

impl Rule for PredicatePushdownRule {
    fn name(&self) -> &str {
        "PredicatePushdown"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Transformation
    }

    fn pattern(&self) -> Pattern {
        Pattern::select_project()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let [project, predicate] = expr.children() else {
            return Ok(vec![]);
        };
        let Operator::Logical(LogicalOp::Project { outputs }) = project.op() else {
            return Ok(vec![]);
        };
        let Some((input, defining)) = project.children().split_first() else {
            return Ok(vec![]);
        };

        // Output column -> the input column it renames.
        let renames: ColumnMap = outputs
            .iter()
            .zip(defining)
            .filter_map(|(output, e)| {
                let ident = ScalarIdent::from_operator(e.op())?;
                Some((output.clone(), ident.column().clone()))
            })
            .collect();

        let pushed = match predicate.copy_with_column_map(&renames, true) {
            Ok(pushed) => pushed,
            Err(OptError::UnmappedColumn { column }) => {
                trace!("Predicate reads computed column {}, not pushing", column);
                return Ok(vec![]);
            }
            Err(e) => return Err(e),
        };

        let b = ctx.builder();
        let select = b.select(input.clone(), pushed)?;
        let mut children = Vec::with_capacity(project.arity());
        children.push(select);
        children.extend(defining.iter().cloned());
        let result = b.node(
            LogicalOp::Project {
                outputs: outputs.clone(),
            },
            children,
        )?;
        debug!("Pushed predicate below projection");
        Ok(vec![result])
    }
}
