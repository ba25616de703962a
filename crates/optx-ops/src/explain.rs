//! Indented plan dumps.
//!
//! ```text
//! +--ScalarIf (int4)
//!    |--ScalarCmp (<)
//!    |  |--ScalarIdent "r.a" (#1)
//!    |  +--ScalarIdent "r.b" (#2)
//!    |--ScalarConst (10)
//!    +--ScalarConst (20)
//! ```
//!
//! The last child of a node is drawn with `+--`, the others with `|--`.

use crate::expr::Expr;
use crate::stack::maybe_grow;
use std::fmt::{self, Write};

impl Expr {
    /// Multi-line tree dump, one operator per line.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_node(&mut out, self, "", true);
        out
    }
}

fn write_node(out: &mut String, expr: &Expr, prefix: &str, last: bool) -> fmt::Result {
    writeln!(out, "{}{}{}", prefix, if last { "+--" } else { "|--" }, expr.op())?;
    let child_prefix = format!("{}{}", prefix, if last { "   " } else { "|  " });
    let n = expr.arity();
    maybe_grow(|| {
        for (i, child) in expr.children().iter().enumerate() {
            write_node(out, child, &child_prefix, i + 1 == n)?;
        }
        Ok(())
    })
}
