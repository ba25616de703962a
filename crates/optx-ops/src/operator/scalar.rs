//! Scalar operators.
//!
//! Each scalar kind has its own payload struct. Constructors resolve the result
//! type (and collation, where it applies) through a
//! [`MetadataProvider`](crate::catalog::MetadataProvider), so a payload can only
//! exist with a valid, counted type handle. Fields are private: once built, a
//! payload is frozen.

use super::{Arity, ChildOrder, Operator};
use crate::catalog::{collation_for, MetadataProvider};
use crate::column::ColumnRef;
use crate::error::Result;
use crate::md::{builtin, FunctionHandle, MdId, Oid, TypeHandle, INVALID_OID};
use crate::null::{self, NullPolicy};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;

/// Constant value carried by [`ScalarConst`].
///
/// `f64` is wrapped in `OrderedFloat` so literals take part in `Eq`/`Hash`,
/// which structural matching relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Datum {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    Text(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int64(v) => write!(f, "{}", v),
            Datum::Float64(v) => write!(f, "{}", v),
            Datum::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// NULL-safe inequality; never returns NULL.
    IsDistinctFrom,
}

impl CmpOp {
    /// Symmetric comparisons are canonicalized at construction.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, CmpOp::Eq | CmpOp::NotEq | CmpOp::IsDistinctFrom)
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "<>",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
            CmpOp::IsDistinctFrom => "IS DISTINCT FROM",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoolOpKind {
    And,
    Or,
    Not,
}

impl fmt::Display for BoolOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOpKind::And => write!(f, "AND"),
            BoolOpKind::Or => write!(f, "OR"),
            BoolOpKind::Not => write!(f, "NOT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn is_commutative(&self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Mul)
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        };
        f.write_str(s)
    }
}

/// Column reference. The result type is the column's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarIdent {
    column: ColumnRef,
}

impl ScalarIdent {
    pub fn new(column: ColumnRef) -> Self {
        Self { column }
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }
}

/// Literal value of a given type. A `Datum::Null` constant is a typed NULL.
///
/// Literals of a collatable type carry the default collation unless built with
/// [`ScalarConst::with_collation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarConst {
    value: Datum,
    result_type: TypeHandle,
    collation: Oid,
}

impl ScalarConst {
    pub fn new(provider: &dyn MetadataProvider, value: Datum, type_id: MdId) -> Result<Self> {
        Self::with_collation(provider, value, type_id, builtin::DEFAULT_COLLATION)
    }

    pub fn with_collation(
        provider: &dyn MetadataProvider,
        value: Datum,
        type_id: MdId,
        collation: Oid,
    ) -> Result<Self> {
        let result_type = provider.resolve_type(type_id)?;
        let collation = collation_for(provider, &result_type, collation)?;
        Ok(Self {
            value,
            result_type,
            collation,
        })
    }

    /// Typed NULL reusing an already resolved handle and collation.
    pub fn null_of(result_type: TypeHandle, collation: Oid) -> Self {
        Self {
            value: Datum::Null,
            result_type,
            collation,
        }
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }
}

/// Scalar conditional.
///
/// A SQL `CASE` is represented as cascaded conditionals. The three children
/// are, in order, the condition, the true value and the false value:
///
/// ```text
/// case when r.a < r.b then 10 when r.a > r.b then 20 else 15 end
///
/// If ----- r.a < r.b
///  |------ 10
///  |------ If ----- r.a > r.b
///           |------ 20
///           |------ 15
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarIf {
    result_type: TypeHandle,
    collation: Oid,
}

impl ScalarIf {
    pub fn new(provider: &dyn MetadataProvider, type_id: MdId, collation: Oid) -> Result<Self> {
        let result_type = provider.resolve_type(type_id)?;
        let collation = collation_for(provider, &result_type, collation)?;
        Ok(Self {
            result_type,
            collation,
        })
    }

    /// Is the result a boolean?
    pub fn is_bool(&self) -> bool {
        self.result_type.id == builtin::BOOL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarCmp {
    op: CmpOp,
    result_type: TypeHandle,
}

impl ScalarCmp {
    pub fn new(provider: &dyn MetadataProvider, op: CmpOp) -> Result<Self> {
        Ok(Self {
            op,
            result_type: provider.resolve_type(builtin::BOOL)?,
        })
    }

    pub fn op(&self) -> CmpOp {
        self.op
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarBoolOp {
    op: BoolOpKind,
    result_type: TypeHandle,
}

impl ScalarBoolOp {
    pub fn new(provider: &dyn MetadataProvider, op: BoolOpKind) -> Result<Self> {
        Ok(Self {
            op,
            result_type: provider.resolve_type(builtin::BOOL)?,
        })
    }

    pub fn op(&self) -> BoolOpKind {
        self.op
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarArith {
    op: ArithOp,
    result_type: TypeHandle,
}

impl ScalarArith {
    pub fn new(provider: &dyn MetadataProvider, op: ArithOp, type_id: MdId) -> Result<Self> {
        Ok(Self {
            op,
            result_type: provider.resolve_type(type_id)?,
        })
    }

    pub fn op(&self) -> ArithOp {
        self.op
    }
}

/// `IS NULL`, or `IS NOT NULL` when negated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarNullTest {
    negated: bool,
    result_type: TypeHandle,
}

impl ScalarNullTest {
    pub fn new(provider: &dyn MetadataProvider, negated: bool) -> Result<Self> {
        Ok(Self {
            negated,
            result_type: provider.resolve_type(builtin::BOOL)?,
        })
    }

    pub fn negated(&self) -> bool {
        self.negated
    }
}

/// First non-NULL child, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarCoalesce {
    result_type: TypeHandle,
    collation: Oid,
}

impl ScalarCoalesce {
    pub fn new(provider: &dyn MetadataProvider, type_id: MdId, collation: Oid) -> Result<Self> {
        let result_type = provider.resolve_type(type_id)?;
        let collation = collation_for(provider, &result_type, collation)?;
        Ok(Self {
            result_type,
            collation,
        })
    }
}

/// Call of a catalog function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarFunc {
    func: FunctionHandle,
    result_type: TypeHandle,
    collation: Oid,
}

impl ScalarFunc {
    pub fn new(provider: &dyn MetadataProvider, func_id: MdId, collation: Oid) -> Result<Self> {
        let func = provider.resolve_function(func_id)?;
        let result_type = provider.resolve_type(func.return_type)?;
        let collation = collation_for(provider, &result_type, collation)?;
        Ok(Self {
            func,
            result_type,
            collation,
        })
    }

    pub fn func(&self) -> &FunctionHandle {
        &self.func
    }

    pub fn is_strict(&self) -> bool {
        self.func.strict
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarCast {
    result_type: TypeHandle,
    collation: Oid,
}

impl ScalarCast {
    pub fn new(provider: &dyn MetadataProvider, type_id: MdId, collation: Oid) -> Result<Self> {
        let result_type = provider.resolve_type(type_id)?;
        let collation = collation_for(provider, &result_type, collation)?;
        Ok(Self {
            result_type,
            collation,
        })
    }
}

/// `EXISTS (subquery)`. The single child is relational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarExists {
    result_type: TypeHandle,
}

impl ScalarExists {
    pub fn new(provider: &dyn MetadataProvider) -> Result<Self> {
        Ok(Self {
            result_type: provider.resolve_type(builtin::BOOL)?,
        })
    }
}

/// Scalar operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarOp {
    Ident(ScalarIdent),
    Const(ScalarConst),
    If(ScalarIf),
    Cmp(ScalarCmp),
    BoolOp(ScalarBoolOp),
    Arith(ScalarArith),
    NullTest(ScalarNullTest),
    Coalesce(ScalarCoalesce),
    Func(ScalarFunc),
    Cast(ScalarCast),
    Exists(ScalarExists),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarOpKind {
    Ident,
    Const,
    If,
    Cmp,
    BoolOp,
    Arith,
    NullTest,
    Coalesce,
    Func,
    Cast,
    Exists,
}

impl ScalarOpKind {
    pub const ALL: [ScalarOpKind; 11] = [
        ScalarOpKind::Ident,
        ScalarOpKind::Const,
        ScalarOpKind::If,
        ScalarOpKind::Cmp,
        ScalarOpKind::BoolOp,
        ScalarOpKind::Arith,
        ScalarOpKind::NullTest,
        ScalarOpKind::Coalesce,
        ScalarOpKind::Func,
        ScalarOpKind::Cast,
        ScalarOpKind::Exists,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarOpKind::Ident => "ScalarIdent",
            ScalarOpKind::Const => "ScalarConst",
            ScalarOpKind::If => "ScalarIf",
            ScalarOpKind::Cmp => "ScalarCmp",
            ScalarOpKind::BoolOp => "ScalarBoolOp",
            ScalarOpKind::Arith => "ScalarArith",
            ScalarOpKind::NullTest => "ScalarNullTest",
            ScalarOpKind::Coalesce => "ScalarCoalesce",
            ScalarOpKind::Func => "ScalarFunc",
            ScalarOpKind::Cast => "ScalarCast",
            ScalarOpKind::Exists => "ScalarExists",
        }
    }
}

impl ScalarOp {
    pub fn kind(&self) -> ScalarOpKind {
        match self {
            ScalarOp::Ident(_) => ScalarOpKind::Ident,
            ScalarOp::Const(_) => ScalarOpKind::Const,
            ScalarOp::If(_) => ScalarOpKind::If,
            ScalarOp::Cmp(_) => ScalarOpKind::Cmp,
            ScalarOp::BoolOp(_) => ScalarOpKind::BoolOp,
            ScalarOp::Arith(_) => ScalarOpKind::Arith,
            ScalarOp::NullTest(_) => ScalarOpKind::NullTest,
            ScalarOp::Coalesce(_) => ScalarOpKind::Coalesce,
            ScalarOp::Func(_) => ScalarOpKind::Func,
            ScalarOp::Cast(_) => ScalarOpKind::Cast,
            ScalarOp::Exists(_) => ScalarOpKind::Exists,
        }
    }

    pub fn result_type(&self) -> &TypeHandle {
        match self {
            ScalarOp::Ident(op) => &op.column.typ,
            ScalarOp::Const(op) => &op.result_type,
            ScalarOp::If(op) => &op.result_type,
            ScalarOp::Cmp(op) => &op.result_type,
            ScalarOp::BoolOp(op) => &op.result_type,
            ScalarOp::Arith(op) => &op.result_type,
            ScalarOp::NullTest(op) => &op.result_type,
            ScalarOp::Coalesce(op) => &op.result_type,
            ScalarOp::Func(op) => &op.result_type,
            ScalarOp::Cast(op) => &op.result_type,
            ScalarOp::Exists(op) => &op.result_type,
        }
    }

    pub fn result_collation(&self) -> Oid {
        match self {
            ScalarOp::Ident(op) => op.column.collation,
            ScalarOp::Const(op) => op.collation,
            ScalarOp::If(op) => op.collation,
            ScalarOp::Coalesce(op) => op.collation,
            ScalarOp::Func(op) => op.collation,
            ScalarOp::Cast(op) => op.collation,
            _ => INVALID_OID,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            ScalarOp::Ident(_) | ScalarOp::Const(_) => Arity::Exact(0),
            ScalarOp::If(_) => Arity::Exact(3),
            ScalarOp::Cmp(_) | ScalarOp::Arith(_) => Arity::Exact(2),
            ScalarOp::BoolOp(op) => match op.op {
                BoolOpKind::Not => Arity::Exact(1),
                BoolOpKind::And | BoolOpKind::Or => Arity::AtLeast(2),
            },
            ScalarOp::NullTest(_) | ScalarOp::Cast(_) | ScalarOp::Exists(_) => Arity::Exact(1),
            ScalarOp::Coalesce(_) => Arity::AtLeast(1),
            ScalarOp::Func(op) => op.func.arg_count.map_or(Arity::Variadic, Arity::Exact),
        }
    }

    pub fn child_order(&self) -> ChildOrder {
        match self {
            ScalarOp::BoolOp(op) if op.op != BoolOpKind::Not => ChildOrder::Permutation,
            ScalarOp::Arith(op) if op.op.is_commutative() => ChildOrder::Permutation,
            ScalarOp::Cmp(op) if op.op.is_symmetric() => ChildOrder::Canonical,
            _ => ChildOrder::Positional,
        }
    }

    pub fn null_policy(&self) -> NullPolicy {
        null::policy_for(self)
    }
}

impl fmt::Display for ScalarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind().name();
        match self {
            ScalarOp::Ident(op) => write!(f, "{} \"{}\" ({})", name, op.column, op.column.id),
            ScalarOp::Const(op) => write!(f, "{} ({})", name, op.value),
            ScalarOp::Cmp(op) => write!(f, "{} ({})", name, op.op),
            ScalarOp::BoolOp(op) => write!(f, "{} ({})", name, op.op),
            ScalarOp::Arith(op) => write!(f, "{} ({})", name, op.op),
            ScalarOp::NullTest(op) if op.negated => write!(f, "{} (IS NOT NULL)", name),
            ScalarOp::NullTest(_) => write!(f, "{} (IS NULL)", name),
            ScalarOp::Func(op) => write!(f, "{} ({})", name, op.func.name),
            ScalarOp::If(_) | ScalarOp::Coalesce(_) | ScalarOp::Cast(_) => {
                write!(f, "{} ({})", name, self.result_type().name)
            }
            ScalarOp::Exists(_) => f.write_str(name),
        }
    }
}

macro_rules! impl_from_operator {
    ($($variant:ident => $payload:ty),* $(,)?) => {
        $(
            impl $payload {
                /// Convert from the generic operator. `None` if `op` is another kind.
                pub fn from_operator(op: &Operator) -> Option<&Self> {
                    match op {
                        Operator::Scalar(ScalarOp::$variant(inner)) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_operator! {
    Ident => ScalarIdent,
    Const => ScalarConst,
    If => ScalarIf,
    Cmp => ScalarCmp,
    BoolOp => ScalarBoolOp,
    Arith => ScalarArith,
    NullTest => ScalarNullTest,
    Coalesce => ScalarCoalesce,
    Func => ScalarFunc,
    Cast => ScalarCast,
    Exists => ScalarExists,
}
