//! Entity identifiers and the [`Entity`] trait.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of one entity within a collection.
///
/// Ids are either integers or strings and stay stable for the lifetime of
/// the entity they name. Integer ids order before string ids.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum EntityId {
    /// Numeric id.
    Int(i64),
    /// String id.
    Str(Arc<str>),
}

impl EntityId {
    /// Returns the numeric id, if this is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// Returns the string id, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "EntityId({n})"),
            Self::Str(s) => write!(f, "EntityId({s:?})"),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! int_ids {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EntityId {
                fn from(n: $ty) -> Self {
                    Self::Int(i64::from(n))
                }
            }
        )*
    };
}

int_ids!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_ids {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for EntityId {
                type Error = Error;

                fn try_from(n: $ty) -> Result<Self, Self::Error> {
                    i64::try_from(n)
                        .map(Self::Int)
                        .map_err(|_| Error::new(ErrorKind::IdOutOfRange(n.to_string())))
                }
            }
        )*
    };
}

wide_int_ids!(u64, usize);

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}

/// A uniquely identified record stored in a collection.
///
/// Entities are plain values: the store clones them into new snapshots and
/// compares them structurally to decide whether a derived view changed.
/// `id()` must be stable; the store rejects updates that change it.
pub trait Entity: Clone + PartialEq + 'static {
    /// Returns the identifier of this entity.
    fn id(&self) -> EntityId;
}
