//! # Null-Propagation Classifier
//!
//! Constant folding and predicate simplification need to know, without
//! evaluating anything, whether an expression can be dropped or simplified once
//! some of its children are proven NULL. Each scalar operator answers that with
//! a [`NullPolicy`] looked up from a fixed per-kind table ([`policy_for`]).
//!
//! ## Static results
//!
//! Policies map the static results of the children to the static result of the
//! parent. A static result is one of four [`BoolEval`] values: definitely
//! `True`, definitely `False`, definitely `Null`, or `Any` (not known
//! statically). "Known NULL" is simply `BoolEval::Null`.
//!
//! ## Policy table
//!
//! | kind | policy |
//! |---|---|
//! | If, Coalesce | `NullIfAllChildrenNull` |
//! | Cmp (ordered, `=`, `<>`), Arith, Cast | `NullIfAnyChildNull` |
//! | Cmp (`IS DISTINCT FROM`), Exists | `NeverNull` |
//! | Func | `NullIfAnyChildNull` if strict, otherwise unknown |
//! | BoolOp, NullTest, Const, Ident | `Custom` |
//!
//! A conditional is `NullIfAllChildrenNull`: with a non-NULL condition it still
//! yields one of its branches, so only all-NULL children force a NULL result.

use crate::expr::Expr;
use crate::operator::{BoolOpKind, CmpOp, Datum, Operator, ScalarOp};
use crate::stack::maybe_grow;
use serde::Serialize;

/// Static three-valued result of a scalar expression, plus "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoolEval {
    True,
    False,
    Null,
    Any,
}

impl BoolEval {
    fn from_known_null(known_null: bool) -> Self {
        if known_null {
            BoolEval::Null
        } else {
            BoolEval::Any
        }
    }
}

/// How NULL children affect the parent's result.
#[derive(Debug, Clone, Copy)]
pub enum NullPolicy {
    /// The result is never NULL, whatever the children.
    NeverNull,
    /// NULL as soon as one child is NULL.
    NullIfAnyChildNull,
    /// NULL only when every child is NULL.
    NullIfAllChildrenNull,
    /// A dedicated function of the operator and its children's results.
    Custom(fn(&ScalarOp, &[BoolEval]) -> BoolEval),
}

impl NullPolicy {
    /// Static result of `op` given the static results of its children.
    pub fn evaluate(&self, op: &ScalarOp, children: &[BoolEval]) -> BoolEval {
        match self {
            NullPolicy::NeverNull => BoolEval::Any,
            NullPolicy::NullIfAnyChildNull => {
                if children.contains(&BoolEval::Null) {
                    BoolEval::Null
                } else {
                    BoolEval::Any
                }
            }
            NullPolicy::NullIfAllChildrenNull => {
                if !children.is_empty() && children.iter().all(|c| *c == BoolEval::Null) {
                    BoolEval::Null
                } else {
                    BoolEval::Any
                }
            }
            NullPolicy::Custom(f) => f(op, children),
        }
    }

    /// Classify from the set of children statically known to be NULL.
    pub fn classify(&self, op: &ScalarOp, known_null: &[bool]) -> BoolEval {
        let children: Vec<BoolEval> = known_null
            .iter()
            .copied()
            .map(BoolEval::from_known_null)
            .collect();
        self.evaluate(op, &children)
    }

    /// Is the result NULL, given which children are known NULL?
    pub fn is_statically_null(&self, op: &ScalarOp, known_null: &[bool]) -> bool {
        self.classify(op, known_null) == BoolEval::Null
    }
}

/// The per-kind policy table.
pub fn policy_for(op: &ScalarOp) -> NullPolicy {
    match op {
        ScalarOp::If(_) | ScalarOp::Coalesce(_) => NullPolicy::NullIfAllChildrenNull,
        ScalarOp::Cmp(cmp) if cmp.op() == CmpOp::IsDistinctFrom => NullPolicy::NeverNull,
        ScalarOp::Cmp(_) | ScalarOp::Arith(_) | ScalarOp::Cast(_) => NullPolicy::NullIfAnyChildNull,
        ScalarOp::Exists(_) => NullPolicy::NeverNull,
        ScalarOp::Func(func) if func.is_strict() => NullPolicy::NullIfAnyChildNull,
        ScalarOp::Func(_) | ScalarOp::Ident(_) => NullPolicy::Custom(unknown),
        ScalarOp::BoolOp(_) => NullPolicy::Custom(bool_op),
        ScalarOp::NullTest(_) => NullPolicy::Custom(null_test),
        ScalarOp::Const(_) => NullPolicy::Custom(constant),
    }
}

fn unknown(_: &ScalarOp, _: &[BoolEval]) -> BoolEval {
    BoolEval::Any
}

fn constant(op: &ScalarOp, _: &[BoolEval]) -> BoolEval {
    match op {
        ScalarOp::Const(c) => match c.value() {
            Datum::Null => BoolEval::Null,
            Datum::Bool(true) => BoolEval::True,
            Datum::Bool(false) => BoolEval::False,
            _ => BoolEval::Any,
        },
        _ => BoolEval::Any,
    }
}

fn null_test(op: &ScalarOp, children: &[BoolEval]) -> BoolEval {
    let negated = matches!(op, ScalarOp::NullTest(t) if t.negated());
    let is_null = match children.first() {
        Some(BoolEval::Null) => BoolEval::True,
        Some(BoolEval::True | BoolEval::False) => BoolEval::False,
        _ => BoolEval::Any,
    };
    if negated {
        not(is_null)
    } else {
        is_null
    }
}

fn bool_op(op: &ScalarOp, children: &[BoolEval]) -> BoolEval {
    let ScalarOp::BoolOp(b) = op else {
        return BoolEval::Any;
    };
    match b.op() {
        BoolOpKind::Not => children.first().copied().map_or(BoolEval::Any, not),
        // OR is AND with the roles of TRUE and FALSE exchanged.
        BoolOpKind::And => junction(children, BoolEval::False, BoolEval::True),
        BoolOpKind::Or => junction(children, BoolEval::True, BoolEval::False),
    }
}

fn not(e: BoolEval) -> BoolEval {
    match e {
        BoolEval::True => BoolEval::False,
        BoolEval::False => BoolEval::True,
        other => other,
    }
}

/// Three-valued AND (or OR) where `dominant` decides the result on its own and
/// `neutral` never changes it.
fn junction(children: &[BoolEval], dominant: BoolEval, neutral: BoolEval) -> BoolEval {
    if children.contains(&dominant) {
        return dominant;
    }
    if children.contains(&BoolEval::Any) {
        return BoolEval::Any;
    }
    if children.contains(&BoolEval::Null) {
        return BoolEval::Null;
    }
    neutral
}

impl Expr {
    /// Static result of the whole tree, folded bottom-up.
    ///
    /// Relational subtrees (the input of `EXISTS`) are `Any`.
    pub fn eval_bool(&self) -> BoolEval {
        let Operator::Scalar(op) = self.op() else {
            return BoolEval::Any;
        };
        let children: Vec<BoolEval> =
            maybe_grow(|| self.children().iter().map(Expr::eval_bool).collect());
        op.null_policy().evaluate(op, &children)
    }

    /// Is the expression NULL whatever the input row?
    pub fn is_statically_null(&self) -> bool {
        self.eval_bool() == BoolEval::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExprBuilder;
    use crate::catalog::InMemoryMetadataProvider;
    use crate::md::builtin;
    use crate::operator::ScalarIf;

    #[test]
    fn test_conditional_with_null_condition_only() {
        let p = InMemoryMetadataProvider::with_builtins();
        let op = ScalarOp::If(ScalarIf::new(&p, builtin::INT4, 0).unwrap());
        let policy = op.null_policy();
        assert!(matches!(policy, NullPolicy::NullIfAllChildrenNull));
        assert!(!policy.is_statically_null(&op, &[true, false, false]));
        assert!(policy.is_statically_null(&op, &[true, true, true]));
    }

    #[test]
    fn test_three_valued_and_or() {
        use BoolEval::*;
        assert_eq!(junction(&[True, Null], False, True), Null);
        assert_eq!(junction(&[Null, False], False, True), False);
        assert_eq!(junction(&[True, True], False, True), True);
        assert_eq!(junction(&[Any, Null], False, True), Any);
        assert_eq!(junction(&[Null, True], True, False), True);
        assert_eq!(junction(&[Null, False], True, False), Null);
    }

    #[test]
    fn test_eval_whole_tree() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();

        // a + NULL is NULL whatever a is.
        let plus_null = b
            .arith(
                crate::operator::ArithOp::Add,
                builtin::INT4,
                b.ident(&a).unwrap(),
                b.null(builtin::INT4).unwrap(),
            )
            .unwrap();
        assert!(plus_null.is_statically_null());

        // (a + NULL) IS NULL is TRUE, and NOT of it is FALSE.
        let is_null = b.is_null(plus_null.clone()).unwrap();
        assert_eq!(is_null.eval_bool(), BoolEval::True);
        assert_eq!(b.not(is_null).unwrap().eval_bool(), BoolEval::False);

        // coalesce(a + NULL, 1) may not be NULL.
        let coalesce = b
            .coalesce(builtin::INT4, vec![plus_null, b.int4(1).unwrap()])
            .unwrap();
        assert!(!coalesce.is_statically_null());
    }

    #[test]
    fn test_strict_and_lenient_functions() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let lower = b.func(builtin::LOWER, vec![b.null(builtin::TEXT).unwrap()]).unwrap();
        assert!(lower.is_statically_null());
        let null_text = || b.null(builtin::TEXT).unwrap();
        let concat = b.func(builtin::CONCAT, vec![null_text(), null_text()]).unwrap();
        assert_eq!(concat.eval_bool(), BoolEval::Any);
    }

    #[test]
    fn test_exists_is_never_null() {
        let p = InMemoryMetadataProvider::with_builtins();
        let b = ExprBuilder::new(&p);
        let a = b.column(1, Some("r"), "a", builtin::INT4).unwrap();
        let exists = b.exists(b.get("public", "r", vec![a]).unwrap()).unwrap();
        assert!(matches!(exists.op().null_policy(), Some(NullPolicy::NeverNull)));
        assert!(!exists.is_statically_null());
    }
}
