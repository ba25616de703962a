//! # Metadata Provider Interface
//!
//! The metadata provider resolves the opaque identifiers found in a bound query
//! (type ids, collation oids, function ids) to catalog descriptors. Handles
//! obtained from a provider are the only legal way to populate an operator's
//! result type or collation.
//!
//! ## Trait Design
//!
//! The `MetadataProvider` trait is deliberately narrow and object safe
//! (`dyn MetadataProvider`) so that different backends can serve metadata. In
//! production it is backed by the coordinator's catalog. For testing and
//! development, [`InMemoryMetadataProvider`] keeps descriptors in hash maps and
//! can be populated programmatically.
//!
//! ## Lookups
//!
//! - `resolve_type`: the type for a result value. Fails with
//!   `UnknownMetadataIdentifier` if the id is unknown.
//! - `resolve_collation`: a collation by oid.
//! - `resolve_function`: a scalar function, including its strictness.
//!
//! Every successful lookup acquires exactly one handle in the provider's
//! [`HandleLedger`]. A failed lookup acquires nothing.

use crate::error::{OptError, Result};
use crate::md::{
    builtin, CollationDescriptor, CollationHandle, FunctionDescriptor, FunctionHandle,
    HandleLedger, MdDescriptor, MdHandle, MdId, Oid, TypeDescriptor, TypeHandle,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves catalog identifiers into counted metadata handles.
pub trait MetadataProvider: Send + Sync {
    fn resolve_type(&self, id: MdId) -> Result<TypeHandle>;
    fn resolve_collation(&self, oid: Oid) -> Result<CollationHandle>;
    fn resolve_function(&self, id: MdId) -> Result<FunctionHandle>;
}

/// In-memory metadata provider for testing and development.
///
/// Descriptors are stored behind `Arc` so every resolution hands out a new
/// counted handle to the same allocation.
#[derive(Debug, Default)]
pub struct InMemoryMetadataProvider {
    types: HashMap<MdId, Arc<TypeDescriptor>>,
    collations: HashMap<Oid, Arc<CollationDescriptor>>,
    functions: HashMap<MdId, Arc<FunctionDescriptor>>,
    ledger: Arc<HandleLedger>,
}

impl InMemoryMetadataProvider {
    /// An empty provider: every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider pre-populated with the identifiers in [`builtin`].
    pub fn with_builtins() -> Self {
        let mut provider = Self::new();
        for (id, name, collatable) in [
            (builtin::BOOL, "bool", false),
            (builtin::INT8, "int8", false),
            (builtin::INT4, "int4", false),
            (builtin::TEXT, "text", true),
            (builtin::FLOAT8, "float8", false),
            (builtin::NUMERIC, "numeric", false),
        ] {
            provider.add_type(TypeDescriptor {
                id,
                name: name.into(),
                collatable,
            });
        }
        provider.add_collation(CollationDescriptor {
            oid: builtin::DEFAULT_COLLATION,
            name: "default".into(),
        });
        provider.add_collation(CollationDescriptor {
            oid: builtin::C_COLLATION,
            name: "C".into(),
        });
        provider.add_function(FunctionDescriptor {
            id: builtin::ABS_INT4,
            name: "abs".into(),
            return_type: builtin::INT4,
            strict: true,
            arg_count: Some(1),
        });
        provider.add_function(FunctionDescriptor {
            id: builtin::LOWER,
            name: "lower".into(),
            return_type: builtin::TEXT,
            strict: true,
            arg_count: Some(1),
        });
        provider.add_function(FunctionDescriptor {
            id: builtin::CONCAT,
            name: "concat".into(),
            return_type: builtin::TEXT,
            strict: false,
            arg_count: None,
        });
        provider
    }

    pub fn add_type(&mut self, desc: TypeDescriptor) {
        self.types.insert(desc.id, Arc::new(desc));
    }

    pub fn add_collation(&mut self, desc: CollationDescriptor) {
        self.collations.insert(desc.oid, Arc::new(desc));
    }

    pub fn add_function(&mut self, desc: FunctionDescriptor) {
        self.functions.insert(desc.id, Arc::new(desc));
    }

    /// The ledger counting every handle this provider has handed out.
    pub fn ledger(&self) -> &Arc<HandleLedger> {
        &self.ledger
    }

    pub fn outstanding_handles(&self) -> usize {
        self.ledger.outstanding()
    }

    fn lookup<K, D>(&self, map: &HashMap<K, Arc<D>>, key: K) -> Result<MdHandle<D>>
    where
        K: std::hash::Hash + Eq + std::fmt::Display,
        D: MdDescriptor,
    {
        match map.get(&key) {
            Some(desc) => Ok(MdHandle::acquire(Arc::clone(desc), &self.ledger)),
            None => {
                debug!("Metadata lookup failed: {} {}", D::KIND, key);
                Err(OptError::UnknownMetadataIdentifier {
                    kind: D::KIND,
                    id: key.to_string(),
                })
            }
        }
    }
}

impl MetadataProvider for InMemoryMetadataProvider {
    fn resolve_type(&self, id: MdId) -> Result<TypeHandle> {
        self.lookup(&self.types, id)
    }

    fn resolve_collation(&self, oid: Oid) -> Result<CollationHandle> {
        self.lookup(&self.collations, oid)
    }

    fn resolve_function(&self, id: MdId) -> Result<FunctionHandle> {
        self.lookup(&self.functions, id)
    }
}

/// Resolve the collation for a value of type `typ`.
///
/// Non-collatable types, and collatable types given [`INVALID_OID`](crate::md::INVALID_OID),
/// get the "no collation" sentinel. Otherwise the oid must resolve.
pub fn collation_for(provider: &dyn MetadataProvider, typ: &TypeHandle, oid: Oid) -> Result<Oid> {
    if !typ.collatable || oid == crate::md::INVALID_OID {
        return Ok(crate::md::INVALID_OID);
    }
    provider.resolve_collation(oid).map(|c| c.id())
}
