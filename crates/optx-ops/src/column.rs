//! # Columns and Column Maps
//!
//! The binder resolves every column reference in a query to a stable
//! [`ColumnId`]. Operators refer to columns through [`ColumnRef`], which pairs
//! the id with its type handle, its collation and diagnostic names. The id, the
//! type and the collation take part in equality and hashing; names are for plan
//! dumps.
//!
//! A [`ColumnMap`] is the input of the column-remapping copier. It lives for the
//! duration of one copy call and maps source column ids to destination columns.

use crate::error::{OptError, Result};
use crate::md::{Oid, TypeHandle};
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identifier assigned to a column by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a bound column.
#[derive(Clone, Serialize)]
pub struct ColumnRef {
    pub id: ColumnId,
    pub table: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub typ: TypeHandle,
    /// [`INVALID_OID`](crate::md::INVALID_OID) unless `typ` is collatable.
    pub collation: Oid,
}

impl ColumnRef {
    /// The collation must already be resolved against `typ`, see
    /// [`collation_for`](crate::catalog::collation_for).
    pub fn new(
        id: ColumnId,
        table: Option<&str>,
        name: impl Into<String>,
        typ: TypeHandle,
        collation: Oid,
    ) -> Self {
        Self {
            id,
            table: table.map(Into::into),
            name: name.into(),
            typ,
            collation,
        }
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.typ == other.typ && self.collation == other.collation
    }
}

impl Eq for ColumnRef {}

impl Hash for ColumnRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.typ.hash(state);
        self.collation.hash(state);
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self, self.id)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref t) = self.table {
            write!(f, "{}.{}", t, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Partial mapping from source columns to destination columns.
///
/// Each entry keeps the source column as well as the target, so that an
/// injective map can be inverted.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    entries: BTreeMap<ColumnId, (ColumnRef, ColumnRef)>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `source` to `target`, returning the previous target, if any.
    pub fn insert(&mut self, source: ColumnRef, target: ColumnRef) -> Option<ColumnRef> {
        self.entries
            .insert(source.id, (source, target))
            .map(|(_, previous)| previous)
    }

    pub fn target(&self, id: ColumnId) -> Option<&ColumnRef> {
        self.entries.get(&id).map(|(_, target)| target)
    }

    pub fn contains(&self, id: ColumnId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(source, target)` pairs in source-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnRef, &ColumnRef)> {
        self.entries.values().map(|(s, t)| (s, t))
    }

    /// The map equivalent to applying `self` and then `then`.
    ///
    /// For non-strict remapping, copying with the result in one pass produces
    /// the same tree as copying with `self` and then with `then`.
    pub fn compose(&self, then: &ColumnMap) -> ColumnMap {
        let mut entries = BTreeMap::new();
        for (id, (source, target)) in &self.entries {
            let next = then.target(target.id).unwrap_or(target).clone();
            entries.insert(*id, (source.clone(), next));
        }
        for (id, entry) in &then.entries {
            if let btree_map::Entry::Vacant(slot) = entries.entry(*id) {
                slot.insert(entry.clone());
            }
        }
        ColumnMap { entries }
    }

    /// Swap sources and targets. Fails if two sources share a target.
    pub fn inverse(&self) -> Result<ColumnMap> {
        let mut entries = BTreeMap::new();
        for (source, target) in self.entries.values() {
            if entries
                .insert(target.id, (target.clone(), source.clone()))
                .is_some()
            {
                return Err(OptError::NonInjectiveColumnMap { column: target.id });
            }
        }
        Ok(ColumnMap { entries })
    }
}

impl FromIterator<(ColumnRef, ColumnRef)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (ColumnRef, ColumnRef)>>(iter: I) -> Self {
        let mut map = ColumnMap::new();
        for (source, target) in iter {
            map.insert(source, target);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryMetadataProvider, MetadataProvider};
    use crate::md::{builtin, INVALID_OID};

    fn col(provider: &InMemoryMetadataProvider, id: u32, table: &str, name: &str) -> ColumnRef {
        ColumnRef::new(
            ColumnId(id),
            Some(table),
            name,
            provider.resolve_type(builtin::INT4).unwrap(),
            INVALID_OID,
        )
    }

    #[test]
    fn test_compose_follows_chains() {
        let p = InMemoryMetadataProvider::with_builtins();
        let (a, b) = (col(&p, 1, "r", "a"), col(&p, 2, "s", "a"));
        let (c, d) = (col(&p, 3, "t", "a"), col(&p, 4, "u", "d"));

        let m1: ColumnMap = [(a.clone(), b.clone())].into_iter().collect();
        let m2: ColumnMap = [(b.clone(), c.clone()), (d.clone(), a.clone())].into_iter().collect();
        let composed = m1.compose(&m2);

        assert_eq!(composed.target(a.id), Some(&c));
        // Entries only in the second map survive.
        assert_eq!(composed.target(d.id), Some(&a));
        // `b` is in the second map's domain but not the first's.
        assert_eq!(composed.target(b.id), Some(&c));
    }

    #[test]
    fn test_inverse_rejects_collisions() {
        let p = InMemoryMetadataProvider::with_builtins();
        let (a, b) = (col(&p, 1, "r", "a"), col(&p, 2, "r", "b"));
        let c = col(&p, 3, "s", "a");

        let injective: ColumnMap = [(a.clone(), c.clone())].into_iter().collect();
        let inv = injective.inverse().unwrap();
        assert_eq!(inv.target(c.id), Some(&a));

        let colliding: ColumnMap = [(a, c.clone()), (b, c.clone())].into_iter().collect();
        assert_eq!(
            colliding.inverse().unwrap_err(),
            OptError::NonInjectiveColumnMap { column: c.id }
        );
    }
}
