//! # Declarative Pattern Matching for Optimization Rules
//!
//! Each optimization rule declares a `Pattern` describing the shape of
//! expression trees it can rewrite. Before applying a rule, the caller checks
//! the pattern so `apply()` is only invoked on trees of the right shape.
//!
//! ## Pattern Language
//!
//! - `Pattern::Operator(matcher, children)`: matches an expression whose
//!   operator satisfies `matcher` and whose leading children match the given
//!   child patterns. Children beyond the listed patterns are unconstrained, so
//!   a pattern for a projection need not know how many output columns it has.
//!
//! - `Pattern::Any`: matches any subtree. Used as a wildcard for children the
//!   rule doesn't inspect. This is the most common child pattern.
//!
//! - `Pattern::Leaf`: matches only leaves (no children, like `Get` or a literal).
//!
//! Patterns look at operator kinds only; payload checks (join type, build side,
//! literal values) belong in the rule's `apply`.

use crate::expr::Expr;
use crate::operator::{LogicalOpKind, OpKind, Operator};

/// Pattern for matching expression trees.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match an operator with child patterns.
    Operator(OpMatcher, Vec<Pattern>),
    /// Match any subtree.
    Any,
    /// Match a leaf node (no children).
    Leaf,
}

/// Matcher for operator kinds (without data).
#[derive(Debug, Clone)]
pub enum OpMatcher {
    Kind(OpKind),
    AnyScalar,
    AnyLogical,
    AnyPhysical,
}

impl OpMatcher {
    pub fn matches(&self, op: &Operator) -> bool {
        match self {
            OpMatcher::Kind(kind) => op.kind() == *kind,
            OpMatcher::AnyScalar => op.is_scalar(),
            OpMatcher::AnyLogical => op.is_logical(),
            OpMatcher::AnyPhysical => op.is_physical(),
        }
    }
}

fn logical(kind: LogicalOpKind, children: Vec<Pattern>) -> Pattern {
    Pattern::Operator(OpMatcher::Kind(OpKind::Logical(kind)), children)
}

impl Pattern {
    /// Match a logical get.
    pub fn get() -> Self {
        logical(LogicalOpKind::Get, vec![])
    }

    /// Match a logical select (input, predicate).
    pub fn select() -> Self {
        logical(LogicalOpKind::Select, vec![Pattern::Any, Pattern::Any])
    }

    /// Match a logical project over any input.
    pub fn project() -> Self {
        logical(LogicalOpKind::Project, vec![Pattern::Any])
    }

    /// Match a logical join (outer, inner, predicate).
    pub fn join() -> Self {
        logical(LogicalOpKind::Join, vec![Pattern::Any, Pattern::Any, Pattern::Any])
    }

    /// Match a logical limit.
    pub fn limit() -> Self {
        logical(LogicalOpKind::Limit, vec![Pattern::Any])
    }

    /// Match a select on top of a project.
    pub fn select_project() -> Self {
        logical(LogicalOpKind::Select, vec![Pattern::project(), Pattern::Any])
    }

    /// Match any scalar subtree.
    pub fn any_scalar() -> Self {
        Pattern::Operator(OpMatcher::AnyScalar, vec![])
    }
}

/// Check if an expression matches a pattern.
pub fn matches(expr: &Expr, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Any => true,
        Pattern::Leaf => expr.is_leaf(),
        Pattern::Operator(matcher, child_patterns) => {
            if !matcher.matches(expr.op()) {
                return false;
            }
            if child_patterns.len() > expr.arity() {
                return false;
            }
            expr.children()
                .iter()
                .zip(child_patterns)
                .all(|(child, p)| matches(child, p))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExprBuilder;
    use crate::catalog::InMemoryMetadataProvider;
    use crate::md::builtin;
    use crate::operator::{CmpOp, JoinType};

    #[test]
    fn test_select_project_pattern() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let x = b.column(7, None, "x", builtin::INT4).unwrap();
        let get = b.get("public", "r", vec![a.clone()]).unwrap();
        let project = b.project(get.clone(), vec![(x.clone(), b.ident(&a).unwrap())]).unwrap();
        let pred = b.cmp(CmpOp::Gt, b.ident(&x).unwrap(), b.int4(3).unwrap()).unwrap();
        let select = b.select(project, pred.clone()).unwrap();

        assert!(matches(&select, &Pattern::select_project()));
        assert!(matches(&select, &Pattern::select()));
        assert!(!matches(&b.select(get.clone(), pred).unwrap(), &Pattern::select_project()));
        assert!(matches(&get, &Pattern::get()));
        assert!(matches(&get, &Pattern::Leaf));
    }

    #[test]
    fn test_kind_and_class_matchers() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let scan = || b.get("public", "r", vec![a.clone()]).unwrap();
        let join = b.join(JoinType::Inner, scan(), scan(), b.boolean(true).unwrap()).unwrap();

        assert!(matches(&join, &Pattern::join()));
        assert!(!matches(&join, &Pattern::select()));
        assert!(OpMatcher::AnyLogical.matches(join.op()));
        assert!(!OpMatcher::AnyScalar.matches(join.op()));
        assert!(matches(join.child(2).unwrap(), &Pattern::any_scalar()));
    }
}
