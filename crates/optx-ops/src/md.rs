//! # Metadata Handles
//!
//! Operators never own catalog definitions. A scalar operator that produces a
//! typed value holds a [`MdHandle`] to the type descriptor, resolved from the
//! [`MetadataProvider`](crate::catalog::MetadataProvider) when the node is built.
//!
//! ## Lifecycle
//!
//! A handle is a shared-ownership pointer (`Arc`) to the descriptor plus a
//! pointer to the provider's [`HandleLedger`]. Creating a handle counts one
//! acquire; cloning it counts another; dropping it counts a release. The
//! descriptor itself is freed when its last handle goes away. Because the ledger
//! uses atomic counters, optimization tasks on different threads may acquire and
//! release handles to the same type without coordination, and tests can assert
//! that every acquire was matched by exactly one release.
//!
//! ## Identity
//!
//! Two handles are equal iff their identifiers are equal. Addresses are never
//! compared: the same type resolved twice yields two distinct allocations that
//! still compare and hash equal.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Collation object identifier.
pub type Oid = u32;

/// Sentinel meaning "no collation". Used for every non-collatable type.
pub const INVALID_OID: Oid = 0;

/// Opaque, stable catalog identifier for a type or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MdId(pub u64);

impl fmt::Display for MdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0.{}.1.0", self.0)
    }
}

/// The family of catalog object a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MdKind {
    Type,
    Collation,
    Function,
}

impl fmt::Display for MdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdKind::Type => write!(f, "type"),
            MdKind::Collation => write!(f, "collation"),
            MdKind::Function => write!(f, "function"),
        }
    }
}

/// Identifiers of the types, collations and functions every provider built with
/// [`with_builtins`](crate::catalog::InMemoryMetadataProvider::with_builtins) knows
/// about.
pub mod builtin {
    use super::{MdId, Oid};

    pub const BOOL: MdId = MdId(16);
    pub const INT8: MdId = MdId(20);
    pub const INT4: MdId = MdId(23);
    pub const TEXT: MdId = MdId(25);
    pub const FLOAT8: MdId = MdId(701);
    pub const NUMERIC: MdId = MdId(1700);

    pub const DEFAULT_COLLATION: Oid = 100;
    pub const C_COLLATION: Oid = 950;

    /// `abs(int4) -> int4`, strict.
    pub const ABS_INT4: MdId = MdId(1397);
    /// `lower(text) -> text`, strict.
    pub const LOWER: MdId = MdId(870);
    /// `concat(text, ...) -> text`, not strict: NULL arguments are skipped.
    pub const CONCAT: MdId = MdId(3058);
}

/// A catalog descriptor that can sit behind a [`MdHandle`].
pub trait MdDescriptor: fmt::Debug + Send + Sync + 'static {
    /// The identifier type used for equality, hashing and serialization.
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Serialize;

    const KIND: MdKind;

    fn id(&self) -> Self::Id;
}

/// A resolved scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub id: MdId,
    pub name: String,
    /// Whether values of this type carry a collation.
    pub collatable: bool,
}

impl MdDescriptor for TypeDescriptor {
    type Id = MdId;
    const KIND: MdKind = MdKind::Type;

    fn id(&self) -> MdId {
        self.id
    }
}

/// A resolved collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationDescriptor {
    pub oid: Oid,
    pub name: String,
}

impl MdDescriptor for CollationDescriptor {
    type Id = Oid;
    const KIND: MdKind = MdKind::Collation;

    fn id(&self) -> Oid {
        self.oid
    }
}

/// A resolved scalar function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub id: MdId,
    pub name: String,
    pub return_type: MdId,
    /// Strict functions return NULL whenever any argument is NULL.
    pub strict: bool,
    /// Fixed argument count, or `None` for variadic functions.
    pub arg_count: Option<usize>,
}

impl MdDescriptor for FunctionDescriptor {
    type Id = MdId;
    const KIND: MdKind = MdKind::Function;

    fn id(&self) -> MdId {
        self.id
    }
}

/// Acquire/release counters shared by all handles a provider hands out.
#[derive(Debug, Default)]
pub struct HandleLedger {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl HandleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::Acquire)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::Acquire)
    }

    /// Handles acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        // Read `released` first: a concurrent acquire/release pair between the
        // two loads can only make the result larger, never underflow.
        let released = self.released();
        self.acquired().saturating_sub(released)
    }
}

/// Counted reference to a catalog descriptor.
pub struct MdHandle<D: MdDescriptor> {
    desc: Arc<D>,
    ledger: Arc<HandleLedger>,
}

pub type TypeHandle = MdHandle<TypeDescriptor>;
pub type CollationHandle = MdHandle<CollationDescriptor>;
pub type FunctionHandle = MdHandle<FunctionDescriptor>;

impl<D: MdDescriptor> MdHandle<D> {
    /// Acquire a new handle, recording it in `ledger`.
    ///
    /// Providers call this when a lookup succeeds. A failed lookup must not call
    /// it at all, which is what keeps failed constructions leak-free.
    pub fn acquire(desc: Arc<D>, ledger: &Arc<HandleLedger>) -> Self {
        ledger.acquired.fetch_add(1, Ordering::AcqRel);
        Self {
            desc,
            ledger: Arc::clone(ledger),
        }
    }

    pub fn id(&self) -> D::Id {
        self.desc.id()
    }

    pub fn descriptor(&self) -> &D {
        &self.desc
    }
}

impl<D: MdDescriptor> Deref for MdHandle<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.desc
    }
}

/// Cloning re-acquires, so the copy is released independently of the source.
impl<D: MdDescriptor> Clone for MdHandle<D> {
    fn clone(&self) -> Self {
        Self::acquire(Arc::clone(&self.desc), &self.ledger)
    }
}

impl<D: MdDescriptor> Drop for MdHandle<D> {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::AcqRel);
    }
}

impl<D: MdDescriptor> PartialEq for MdHandle<D> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<D: MdDescriptor> Eq for MdHandle<D> {}

impl<D: MdDescriptor> Hash for MdHandle<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        D::KIND.hash(state);
        self.id().hash(state);
    }
}

impl<D: MdDescriptor> fmt::Debug for MdHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", D::KIND, self.id())
    }
}

/// Handles serialize as their identifier only.
impl<D: MdDescriptor> Serialize for MdHandle<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int4() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            id: builtin::INT4,
            name: "int4".into(),
            collatable: false,
        })
    }

    #[test]
    fn test_clone_and_drop_balance() {
        let ledger = Arc::new(HandleLedger::new());
        let h = MdHandle::acquire(int4(), &ledger);
        let h2 = h.clone();
        assert_eq!(ledger.acquired(), 2);
        assert_eq!(ledger.outstanding(), 2);
        drop(h);
        drop(h2);
        assert_eq!(ledger.released(), 2);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_equality_is_by_identifier() {
        let ledger = Arc::new(HandleLedger::new());
        // Two separate allocations of the same type.
        let a = MdHandle::acquire(int4(), &ledger);
        let b = MdHandle::acquire(int4(), &ledger);
        assert_eq!(a, b);

        let text = MdHandle::acquire(
            Arc::new(TypeDescriptor {
                id: builtin::TEXT,
                name: "text".into(),
                collatable: true,
            }),
            &ledger,
        );
        assert_ne!(a, text);
    }

    #[test]
    fn test_serializes_as_identifier() {
        let ledger = Arc::new(HandleLedger::new());
        let h = MdHandle::acquire(int4(), &ledger);
        assert_eq!(serde_json::to_string(&h).unwrap(), "23");
    }
}
