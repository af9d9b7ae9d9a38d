//! Mutation inputs: which entities an operation touches, and what it adds.

use std::fmt;
use std::rc::Rc;

use herd_foundation::{Entity, EntityId};

use crate::state::EntitiesState;

/// Selects the entities an `update` or `remove` applies to.
pub enum Target<E> {
    /// Every entity in the collection.
    All,
    /// One id.
    Id(EntityId),
    /// Several ids, applied in the given order.
    Ids(Vec<EntityId>),
    /// Every entity matching a predicate, in collection order.
    Predicate(Rc<dyn Fn(&E) -> bool>),
}

impl<E: Entity> Target<E> {
    /// Targets every entity matching `predicate`.
    pub fn matching(predicate: impl Fn(&E) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(predicate))
    }

    /// Resolves to the present ids this target selects. Unknown and repeated
    /// ids are dropped.
    #[must_use]
    pub fn resolve(&self, state: &EntitiesState<E>) -> Vec<EntityId> {
        match self {
            Self::All => state.ids().iter().cloned().collect(),
            Self::Id(id) if state.contains(id) => vec![id.clone()],
            Self::Id(_) => Vec::new(),
            Self::Ids(ids) => {
                let mut resolved: Vec<EntityId> = Vec::with_capacity(ids.len());
                for id in ids {
                    if state.contains(id) && !resolved.contains(id) {
                        resolved.push(id.clone());
                    }
                }
                resolved
            }
            Self::Predicate(predicate) => state
                .ids()
                .iter()
                .filter(|id| state.get(id).is_some_and(|entity| predicate(entity)))
                .cloned()
                .collect(),
        }
    }
}

impl<E> Clone for Target<E> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Id(id) => Self::Id(id.clone()),
            Self::Ids(ids) => Self::Ids(ids.clone()),
            Self::Predicate(p) => Self::Predicate(p.clone()),
        }
    }
}

impl<E> fmt::Debug for Target<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Ids(ids) => f.debug_tuple("Ids").field(ids).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

macro_rules! target_from_id {
    ($($ty:ty),*) => {
        $(
            impl<E> From<$ty> for Target<E> {
                fn from(id: $ty) -> Self {
                    Self::Id(EntityId::from(id))
                }
            }
        )*
    };
}

target_from_id!(EntityId, &EntityId, i32, i64, u32, &str, String);

impl<E, T: Into<EntityId>> From<Vec<T>> for Target<E> {
    fn from(ids: Vec<T>) -> Self {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }
}

impl<E, T: Into<EntityId>, const N: usize> From<[T; N]> for Target<E> {
    fn from(ids: [T; N]) -> Self {
        Self::Ids(ids.into_iter().map(Into::into).collect())
    }
}

impl<E, T: Into<EntityId> + Clone> From<&[T]> for Target<E> {
    fn from(ids: &[T]) -> Self {
        Self::Ids(ids.iter().cloned().map(Into::into).collect())
    }
}

/// Anything `add` and `set` accept: one entity or a batch.
pub trait IntoEntities<E> {
    /// Converts into an ordered batch.
    fn into_entities(self) -> Vec<E>;
}

impl<E: Entity> IntoEntities<E> for E {
    fn into_entities(self) -> Vec<E> {
        vec![self]
    }
}

impl<E: Entity> IntoEntities<E> for Vec<E> {
    fn into_entities(self) -> Vec<E> {
        self
    }
}

impl<E: Entity, const N: usize> IntoEntities<E> for [E; N] {
    fn into_entities(self) -> Vec<E> {
        self.into()
    }
}

impl<E: Entity> IntoEntities<E> for &[E] {
    fn into_entities(self) -> Vec<E> {
        self.to_vec()
    }
}
