//! # Scan Implementation Rule
//!
//! Maps a logical Get to a physical TableScan (sequential, full table scan)
//! over the same table and columns. There is no index scan: the storage the
//! optimizer targets has none.

use optx_ops::expr::Expr;
use optx_ops::operator::{LogicalOp, Operator, PhysicalOp};
use optx_ops::pattern::Pattern;
use optx_ops::rule::{OptContext, Rule, RuleType};
use optx_ops::Result;

/// Implement logical get as a sequential table scan.
pub struct ImplTableScanRule;

impl Rule for ImplTableScanRule {
    fn name(&self) -> &str {
        "ImplTableScan"
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Implementation
    }

    fn pattern(&self) -> Pattern {
        Pattern::get()
    }

    fn apply(&self, expr: &Expr, ctx: &OptContext) -> Result<Vec<Expr>> {
        let Operator::Logical(LogicalOp::Get { table, columns }) = expr.op() else {
            return Ok(vec![]);
        };
        let scan = PhysicalOp::TableScan {
            table: table.clone(),
            columns: columns.clone(),
        };
        Ok(vec![ctx.builder().node(scan, vec![])?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optx_ops::catalog::InMemoryMetadataProvider;
    use optx_ops::md::builtin;

    #[test]
    fn test_get_becomes_table_scan() {
        let p = InMemoryMetadataProvider::with_builtins();
        let ctx = OptContext::new(&p);
        let b = ctx.builder();
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let get = b.get("public", "r", vec![a.clone()]).unwrap();

        let results = ImplTableScanRule.apply(&get, &ctx).unwrap();
        assert_eq!(results.len(), 1);
        match results[0].op() {
            Operator::Physical(PhysicalOp::TableScan { table, columns }) => {
                assert_eq!(table.name, "r");
                assert_eq!(columns, &vec![a]);
            }
            other => panic!("Expected PhysicalTableScan, got {}", other),
        }
    }
}
