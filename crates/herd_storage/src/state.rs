//! Normalized collection state with immutable snapshots.
//!
//! An [`EntitiesState`] is one snapshot of a collection: an ordered id list,
//! an id-keyed entity table, the active selection, and a few scalar flags.
//! Clone is O(1) due to structural sharing; every mutation of the store
//! produces a new snapshot and leaves the old one untouched.

use std::collections::HashMap;
use std::fmt;

use herd_foundation::equality::collections_equal;
use herd_foundation::{Entity, EntityId, EntityTable, IdList};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Active selection
// =============================================================================

/// The currently active entity, entities, or nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Active {
    /// No active entity.
    #[default]
    None,
    /// A single active entity.
    One(EntityId),
    /// Several active entities, in selection order.
    Many(Vec<EntityId>),
}

impl Active {
    /// Returns true if nothing is active.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true if at least one id is active.
    #[must_use]
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Returns the active ids in order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        match self {
            Self::None => &[],
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }

    /// Returns the first active id.
    #[must_use]
    pub fn primary(&self) -> Option<&EntityId> {
        self.ids().first()
    }

    /// Returns true if `id` is active.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids().contains(id)
    }

    /// Drops ids for which `keep` is false. A selection left empty becomes
    /// [`Active::None`].
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&EntityId) -> bool) -> Self {
        match self {
            Self::None => Self::None,
            Self::One(id) if keep(id) => Self::One(id.clone()),
            Self::One(_) => Self::None,
            Self::Many(ids) => {
                let kept: Vec<EntityId> = ids.iter().filter(|id| keep(id)).cloned().collect();
                if kept.is_empty() {
                    Self::None
                } else {
                    Self::Many(kept)
                }
            }
        }
    }
}

macro_rules! active_from_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Active {
                fn from(id: $ty) -> Self {
                    Self::One(EntityId::from(id))
                }
            }
        )*
    };
}

active_from_id!(EntityId, &EntityId, i32, i64, u32, &str, String);

impl<T: Into<EntityId>> From<Vec<T>> for Active {
    fn from(ids: Vec<T>) -> Self {
        Self::Many(ids.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<EntityId>, const N: usize> From<[T; N]> for Active {
    fn from(ids: [T; N]) -> Self {
        Self::Many(ids.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Opaque store-level metadata, such as the store's name.
///
/// Informational only; nothing in the collection invariants depends on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metadata(im::OrdMap<String, String>);

impl Metadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns metadata with `key` set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the `name` entry.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// =============================================================================
// Store actions
// =============================================================================

/// The operation that produced a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StoreAction {
    /// Initial state of a new store.
    Init,
    /// Wholesale replacement of the collection.
    Set,
    /// Entities appended or overwritten.
    Add,
    /// Entities patched.
    Update,
    /// Some entities removed.
    Remove,
    /// Collection cleared back to its initial state.
    Reset,
    /// Active selection changed.
    SetActive,
    /// Loading flag changed.
    SetLoading,
    /// Error payload changed.
    SetError,
    /// Metadata edited.
    UpdateMetadata,
}

impl StoreAction {
    /// Returns the action's name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Set => "set",
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Reset => "reset",
            Self::SetActive => "set_active",
            Self::SetLoading => "set_loading",
            Self::SetError => "set_error",
            Self::UpdateMetadata => "update_metadata",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// EntitiesState
// =============================================================================

/// Immutable snapshot of a normalized entity collection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntitiesState<E: Clone> {
    pub(crate) ids: IdList,
    pub(crate) entities: EntityTable<E>,
    pub(crate) active: Active,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) metadata: Metadata,
    pub(crate) action: StoreAction,
}

impl<E: Entity> Default for EntitiesState<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntitiesState<E> {
    /// Creates an empty, loading state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdList::new(),
            entities: EntityTable::new(),
            active: Active::None,
            loading: true,
            error: None,
            metadata: Metadata::new(),
            action: StoreAction::Init,
        }
    }

    /// Returns this state with its collection replaced by `entities`.
    ///
    /// Duplicate ids keep the position of their first occurrence and the
    /// value of their last. The active selection is pruned to surviving ids.
    #[must_use]
    pub fn with_entities(self, entities: impl IntoIterator<Item = E>) -> Self {
        let (ids, entities) = normalize(entities);
        let active = self.active.retain(|id| entities.contains_key(id));
        Self {
            ids,
            entities,
            active,
            ..self
        }
    }

    /// Returns this state with `active` adopted, keeping only present ids.
    #[must_use]
    pub fn with_active(self, active: impl Into<Active>) -> Self {
        let active = active.into().retain(|id| self.entities.contains_key(id));
        Self { active, ..self }
    }

    /// Returns this state with the loading flag set.
    #[must_use]
    pub fn with_loading(self, loading: bool) -> Self {
        Self { loading, ..self }
    }

    /// Returns this state with an error payload.
    #[must_use]
    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self
        }
    }

    /// Returns this state with the given metadata.
    #[must_use]
    pub fn with_metadata(self, metadata: Metadata) -> Self {
        Self { metadata, ..self }
    }

    /// Returns the ids in collection order.
    #[must_use]
    pub fn ids(&self) -> &IdList {
        &self.ids
    }

    /// Returns the id-keyed entity table.
    #[must_use]
    pub fn entities(&self) -> &EntityTable<E> {
        &self.entities
    }

    /// Returns the active selection.
    #[must_use]
    pub fn active(&self) -> &Active {
        &self.active
    }

    /// Returns the loading flag.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Returns the error payload.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the action that produced this snapshot.
    #[must_use]
    pub fn action(&self) -> StoreAction {
        self.action
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Gets an entity by id.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.entities.get(id)
    }

    /// Returns true if the collection contains `id`.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Iterates entities in collection order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &E> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Returns true if both snapshots hold the same collection (ids and
    /// entities), ignoring every other field.
    #[must_use]
    pub fn same_collection(&self, other: &Self) -> bool {
        collections_equal((&self.ids, &self.entities), (&other.ids, &other.entities))
    }

    /// Checks the collection invariants: `ids` has no duplicates and maps
    /// one-to-one onto the entity table (each entity stored under its own
    /// id), and `active` references only present ids.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.ids.len() != self.entities.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(self.ids.len());
        let ids_ok = self.ids.iter().all(|id| {
            seen.insert(id)
                && self
                    .entities
                    .get(id)
                    .is_some_and(|entity| &entity.id() == id)
        });
        ids_ok && self.active.ids().iter().all(|id| self.contains(id))
    }
}

/// Splits entities into an ordered id list and a table, deduplicating ids
/// (first position, last value).
pub(crate) fn normalize<E: Entity>(entities: impl IntoIterator<Item = E>) -> (IdList, EntityTable<E>) {
    let mut order = Vec::new();
    let mut latest: HashMap<EntityId, E> = HashMap::new();
    for entity in entities {
        let id = entity.id();
        if latest.insert(id.clone(), entity).is_none() {
            order.push(id);
        }
    }
    (order.into_iter().collect(), latest.into_iter().collect())
}
