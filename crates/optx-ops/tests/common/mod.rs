//! Shared helpers for integration tests.

#![allow(dead_code)]

use optx_ops::builder::ExprBuilder;
use optx_ops::column::ColumnRef;
use optx_ops::md::builtin;
use optx_ops::operator::CmpOp;
use optx_ops::Expr;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The two-level conditional
///
/// ```text
/// case when a < b then 10 when a > b then 20 else 15 end
/// ```
pub fn case_tree(b: &ExprBuilder<'_>, a: &ColumnRef, c: &ColumnRef) -> Expr {
    let lt = b.cmp(CmpOp::Lt, b.ident(a).unwrap(), b.ident(c).unwrap()).unwrap();
    let gt = b.cmp(CmpOp::Gt, b.ident(a).unwrap(), b.ident(c).unwrap()).unwrap();
    let nested = b
        .scalar_if(builtin::INT4, gt, b.int4(20).unwrap(), b.int4(15).unwrap())
        .unwrap();
    b.scalar_if(builtin::INT4, lt, b.int4(10).unwrap(), nested).unwrap()
}
