//! # Built-in Optimization Rules
//!
//! This crate provides the default set of rules over `optx-ops` expression
//! trees. Rules are divided into two categories:
//!
//! ## Transformation Rules (Logical -> Logical)
//!
//! - **`JoinCommutativityRule`**: Swaps the sides of inner and cross joins
//!   (A JOIN B -> B JOIN A).
//! - **`PredicatePushdownRule`**: Moves a select below a renaming projection,
//!   remapping the predicate's columns.
//! - **`NullPropagationFoldRule`**: Replaces statically NULL scalar subtrees by
//!   typed NULL literals and folds conditionals with constant conditions.
//!
//! ## Implementation Rules (Logical -> Physical)
//!
//! - **`ImplHashJoinRule`**: Hash join, build-left and build-right (equi-joins only).
//! - **`ImplNestedLoopJoinRule`**: Nested loop join (universal fallback).
//! - **`ImplTableScanRule`**: Sequential table scan.
//! - **`ImplFilterRule`**, **`ImplComputeScalarRule`**, **`ImplLimitRule`**:
//!   one-to-one mappings of select, project and limit.

pub mod impl_join;
pub mod impl_scan;
pub mod impl_unary;
pub mod join_commutativity;
pub mod null_fold;
pub mod predicate_pushdown;

use optx_ops::rule::RuleRegistry;

/// Create a default rule registry with all built-in rules.
pub fn default_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    // Transformation rules.
    registry.add_rule(Box::new(join_commutativity::JoinCommutativityRule));
    registry.add_rule(Box::new(predicate_pushdown::PredicatePushdownRule));
    registry.add_rule(Box::new(null_fold::NullPropagationFoldRule));

    // Implementation rules.
    registry.add_rule(Box::new(impl_join::ImplHashJoinRule));
    registry.add_rule(Box::new(impl_join::ImplNestedLoopJoinRule));
    registry.add_rule(Box::new(impl_scan::ImplTableScanRule));
    registry.add_rule(Box::new(impl_unary::ImplFilterRule));
    registry.add_rule(Box::new(impl_unary::ImplComputeScalarRule));
    registry.add_rule(Box::new(impl_unary::ImplLimitRule));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_registry() {
        let registry = default_rule_registry();
        assert_eq!(registry.transformation_rules().len(), 3);
        assert_eq!(registry.implementation_rules().len(), 6);

        let hashes: HashSet<u64> = registry.rules().map(|r| r.rule_hash()).collect();
        assert_eq!(hashes.len(), registry.len());
        assert!(registry.find("PredicatePushdown").is_some());
    }
}
