//! Persistent collections with structural sharing.
//!
//! These are thin wrappers around the `im` crate's persistent data structures,
//! specialised to the normalized entity layout: an ordered id list, an
//! id-keyed table, and an ordered map built from the two.
//!
//! Cloning any of them is O(1), and `ptr_eq` answers "is this the very same
//! collection" without walking it. Snapshots rely on both properties.

use std::fmt;
use std::iter::FromIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Ordered sequence of entity ids.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdList(im::Vector<EntityId>);

impl IdList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Returns the number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets an id by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EntityId> {
        self.0.get(index)
    }

    /// Returns the first id.
    #[must_use]
    pub fn first(&self) -> Option<&EntityId> {
        self.0.front()
    }

    /// Returns the last id.
    #[must_use]
    pub fn last(&self) -> Option<&EntityId> {
        self.0.back()
    }

    /// Returns the position of `id`. This is a linear scan.
    #[must_use]
    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.0.index_of(id)
    }

    /// Returns a new list with `id` appended.
    #[must_use]
    pub fn push_back(&self, id: EntityId) -> Self {
        let mut new = self.0.clone();
        new.push_back(id);
        Self(new)
    }

    /// Returns a new list keeping only the ids for which `keep` returns true.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&EntityId) -> bool) -> Self {
        let mut new = self.0.clone();
        new.retain(|id| keep(id));
        Self(new)
    }

    /// Returns an iterator over the ids in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EntityId> + ExactSizeIterator {
        self.0.iter()
    }

    /// Returns true if both lists share the same underlying storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<EntityId> for IdList {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self(im::Vector::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a IdList {
    type Item = &'a EntityId;
    type IntoIter = im::vector::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Persistent map from entity id to value.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityTable<V: Clone>(im::HashMap<EntityId, V>);

impl<V: Clone> Default for EntityTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> EntityTable<V> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self(im::HashMap::new())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a value by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&V> {
        self.0.get(id)
    }

    /// Returns true if the table contains `id`.
    #[must_use]
    pub fn contains_key(&self, id: &EntityId) -> bool {
        self.0.contains_key(id)
    }

    /// Returns a new table with the entry inserted (or overwritten).
    #[must_use]
    pub fn insert(&self, id: EntityId, value: V) -> Self {
        let mut new = self.0.clone();
        new.insert(id, value);
        Self(new)
    }

    /// Returns a new table with `id` removed.
    #[must_use]
    pub fn remove(&self, id: &EntityId) -> Self {
        let mut new = self.0.clone();
        new.remove(id);
        Self(new)
    }

    /// Returns an iterator over id-value pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &V)> {
        self.0.iter()
    }

    /// Returns an iterator over the ids in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &EntityId> {
        self.0.keys()
    }

    /// Returns an iterator over the values in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }

    /// Returns true if both tables share the same underlying storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for EntityTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Clone + PartialEq> PartialEq for EntityTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl<V: Clone + Eq> Eq for EntityTable<V> {}

impl<V: Clone> FromIterator<(EntityId, V)> for EntityTable<V> {
    fn from_iter<I: IntoIterator<Item = (EntityId, V)>>(iter: I) -> Self {
        Self(im::HashMap::from_iter(iter))
    }
}

/// Id-keyed map that remembers insertion order.
///
/// This is the "as object" shape of a derived view: lookups by id, iteration
/// in the order the ids were inserted. Equality is order-sensitive.
#[derive(Clone)]
pub struct OrderedMap<V: Clone> {
    order: IdList,
    table: EntityTable<V>,
}

impl<V: Clone> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> OrderedMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: IdList::new(),
            table: EntityTable::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Gets a value by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&V> {
        self.table.get(id)
    }

    /// Returns true if the map contains `id`.
    #[must_use]
    pub fn contains_key(&self, id: &EntityId) -> bool {
        self.table.contains_key(id)
    }

    /// Inserts an entry. A new id goes to the end; an existing id keeps its
    /// position and takes the new value.
    pub fn insert(&mut self, id: EntityId, value: V) {
        if !self.table.contains_key(&id) {
            self.order = self.order.push_back(id.clone());
        }
        self.table = self.table.insert(id, value);
    }

    /// Returns the ids in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &EntityId> {
        self.order.iter()
    }

    /// Returns the values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|id| self.table.get(id))
    }

    /// Returns id-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &V)> {
        self.order
            .iter()
            .filter_map(|id| self.table.get(id).map(|v| (id, v)))
    }

    /// Collects the values in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<V> {
        self.values().cloned().collect()
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for OrderedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: Clone + PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.table == other.table
    }
}

impl<V: Clone + Eq> Eq for OrderedMap<V> {}

impl<V: Clone> FromIterator<(EntityId, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (EntityId, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (id, value) in iter {
            map.insert(id, value);
        }
        map
    }
}
