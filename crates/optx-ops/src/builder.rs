//! # Expression Builder
//!
//! Convenience layer over [`Expr::with_depth_limit`] for the translator and for
//! rules. An `ExprBuilder` borrows a [`MetadataProvider`] and resolves every
//! type, collation and function identifier through it, so callers deal in
//! catalog ids and never touch handles directly.
//!
//! Every method returns `Result`: an unknown identifier, a wrong child count
//! or an over-deep tree surfaces as an [`OptError`](crate::error::OptError)
//! instead of producing a half-built node. Handles acquired for a node that is
//! then rejected are released when the error propagates.

use crate::catalog::{collation_for, MetadataProvider};
use crate::column::{ColumnId, ColumnRef};
use crate::config::ExprConfig;
use crate::error::Result;
use crate::expr::Expr;
use crate::md::{builtin, MdId, Oid, INVALID_OID};
use crate::operator::{
    ArithOp, BoolOpKind, CmpOp, Datum, JoinType, LogicalOp, Operator, ScalarArith, ScalarBoolOp,
    ScalarCast, ScalarCmp, ScalarCoalesce, ScalarConst, ScalarExists, ScalarFunc, ScalarIdent,
    ScalarIf, ScalarNullTest, ScalarOp, TableRef,
};

pub struct ExprBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    config: ExprConfig,
}

impl<'a> ExprBuilder<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            config: ExprConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExprConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &'a dyn MetadataProvider {
        self.provider
    }

    pub fn config(&self) -> &ExprConfig {
        &self.config
    }

    /// Build any node under the configured depth limit.
    pub fn node(&self, op: impl Into<Operator>, children: Vec<Expr>) -> Result<Expr> {
        Expr::with_depth_limit(op, children, self.config.effective_max_depth())
    }

    fn scalar(&self, op: ScalarOp, children: Vec<Expr>) -> Result<Expr> {
        self.node(op, children)
    }

    /// Collation a derived value takes from `source`. Without one the default
    /// collation applies; non-collatable result types drop it again when the
    /// payload resolves it.
    fn inherited_collation(source: Option<&Expr>) -> Oid {
        match source.map(|e| e.op().result_collation()) {
            Some(oid) if oid != INVALID_OID => oid,
            _ => builtin::DEFAULT_COLLATION,
        }
    }

    /// Bind a column, resolving its type. Collatable columns get the default
    /// collation.
    pub fn column(
        &self,
        id: u32,
        table: Option<&str>,
        name: &str,
        type_id: MdId,
    ) -> Result<ColumnRef> {
        self.column_with_collation(id, table, name, type_id, builtin::DEFAULT_COLLATION)
    }

    pub fn column_with_collation(
        &self,
        id: u32,
        table: Option<&str>,
        name: &str,
        type_id: MdId,
        collation: Oid,
    ) -> Result<ColumnRef> {
        let typ = self.provider.resolve_type(type_id)?;
        let collation = collation_for(self.provider, &typ, collation)?;
        Ok(ColumnRef::new(ColumnId(id), table, name, typ, collation))
    }

    // -- Scalars -----------------------------------------------------------

    pub fn ident(&self, column: &ColumnRef) -> Result<Expr> {
        self.scalar(ScalarOp::Ident(ScalarIdent::new(column.clone())), vec![])
    }

    pub fn constant(&self, value: Datum, type_id: MdId) -> Result<Expr> {
        let op = ScalarConst::new(self.provider, value, type_id)?;
        self.scalar(ScalarOp::Const(op), vec![])
    }

    pub fn int4(&self, value: i64) -> Result<Expr> {
        self.constant(Datum::Int64(value), builtin::INT4)
    }

    pub fn boolean(&self, value: bool) -> Result<Expr> {
        self.constant(Datum::Bool(value), builtin::BOOL)
    }

    pub fn text(&self, value: &str) -> Result<Expr> {
        self.constant(Datum::Text(value.to_string()), builtin::TEXT)
    }

    /// Typed NULL literal.
    pub fn null(&self, type_id: MdId) -> Result<Expr> {
        self.constant(Datum::Null, type_id)
    }

    /// Conditional `if cond then then_value else else_value`.
    ///
    /// The result collation is taken from the true branch.
    pub fn scalar_if(
        &self,
        type_id: MdId,
        cond: Expr,
        then_value: Expr,
        else_value: Expr,
    ) -> Result<Expr> {
        let collation = Self::inherited_collation(Some(&then_value));
        let op = ScalarIf::new(self.provider, type_id, collation)?;
        self.scalar(ScalarOp::If(op), vec![cond, then_value, else_value])
    }

    /// `CASE WHEN c1 THEN v1 WHEN c2 THEN v2 ... ELSE default END` as cascaded
    /// conditionals. With no `WHEN` arms the result is `default` itself.
    pub fn case(&self, type_id: MdId, arms: Vec<(Expr, Expr)>, default: Expr) -> Result<Expr> {
        arms.into_iter()
            .rev()
            .try_fold(default, |else_value, (cond, then_value)| {
                self.scalar_if(type_id, cond, then_value, else_value)
            })
    }

    pub fn cmp(&self, op: CmpOp, left: Expr, right: Expr) -> Result<Expr> {
        let op = ScalarCmp::new(self.provider, op)?;
        self.scalar(ScalarOp::Cmp(op), vec![left, right])
    }

    fn bool_op(&self, op: BoolOpKind, children: Vec<Expr>) -> Result<Expr> {
        let op = ScalarBoolOp::new(self.provider, op)?;
        self.scalar(ScalarOp::BoolOp(op), children)
    }

    pub fn and(&self, children: Vec<Expr>) -> Result<Expr> {
        self.bool_op(BoolOpKind::And, children)
    }

    pub fn or(&self, children: Vec<Expr>) -> Result<Expr> {
        self.bool_op(BoolOpKind::Or, children)
    }

    pub fn not(&self, child: Expr) -> Result<Expr> {
        self.bool_op(BoolOpKind::Not, vec![child])
    }

    pub fn arith(&self, op: ArithOp, type_id: MdId, left: Expr, right: Expr) -> Result<Expr> {
        let op = ScalarArith::new(self.provider, op, type_id)?;
        self.scalar(ScalarOp::Arith(op), vec![left, right])
    }

    pub fn is_null(&self, child: Expr) -> Result<Expr> {
        let op = ScalarNullTest::new(self.provider, false)?;
        self.scalar(ScalarOp::NullTest(op), vec![child])
    }

    pub fn is_not_null(&self, child: Expr) -> Result<Expr> {
        let op = ScalarNullTest::new(self.provider, true)?;
        self.scalar(ScalarOp::NullTest(op), vec![child])
    }

    /// `COALESCE(args...)`. The collation is taken from the first argument.
    pub fn coalesce(&self, type_id: MdId, args: Vec<Expr>) -> Result<Expr> {
        let collation = Self::inherited_collation(args.first());
        let op = ScalarCoalesce::new(self.provider, type_id, collation)?;
        self.scalar(ScalarOp::Coalesce(op), args)
    }

    /// Call a catalog function. The collation is taken from the first argument.
    pub fn func(&self, func_id: MdId, args: Vec<Expr>) -> Result<Expr> {
        let collation = Self::inherited_collation(args.first());
        let op = ScalarFunc::new(self.provider, func_id, collation)?;
        self.scalar(ScalarOp::Func(op), args)
    }

    pub fn cast(&self, type_id: MdId, child: Expr) -> Result<Expr> {
        let collation = Self::inherited_collation(Some(&child));
        let op = ScalarCast::new(self.provider, type_id, collation)?;
        self.scalar(ScalarOp::Cast(op), vec![child])
    }

    pub fn exists(&self, subquery: Expr) -> Result<Expr> {
        let op = ScalarExists::new(self.provider)?;
        self.scalar(ScalarOp::Exists(op), vec![subquery])
    }

    // -- Relational --------------------------------------------------------

    pub fn get(&self, schema: &str, table: &str, columns: Vec<ColumnRef>) -> Result<Expr> {
        let op = LogicalOp::Get {
            table: TableRef {
                schema: schema.to_string(),
                name: table.to_string(),
            },
            columns,
        };
        self.node(op, vec![])
    }

    pub fn select(&self, input: Expr, predicate: Expr) -> Result<Expr> {
        self.node(LogicalOp::Select, vec![input, predicate])
    }

    /// Project `input` to `(output column, defining scalar)` pairs.
    pub fn project(&self, input: Expr, outputs: Vec<(ColumnRef, Expr)>) -> Result<Expr> {
        let (outputs, exprs): (Vec<ColumnRef>, Vec<Expr>) = outputs.into_iter().unzip();
        let mut children = Vec::with_capacity(exprs.len() + 1);
        children.push(input);
        children.extend(exprs);
        self.node(LogicalOp::Project { outputs }, children)
    }

    pub fn join(
        &self,
        join_type: JoinType,
        outer: Expr,
        inner: Expr,
        predicate: Expr,
    ) -> Result<Expr> {
        self.node(LogicalOp::Join { join_type }, vec![outer, inner, predicate])
    }

    pub fn limit(&self, input: Expr, offset: u64, count: Option<u64>) -> Result<Expr> {
        self.node(LogicalOp::Limit { offset, count }, vec![input])
    }
}
