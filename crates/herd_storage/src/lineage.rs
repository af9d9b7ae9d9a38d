//! Pristine/dirty lineage of a store's collection.

use herd_foundation::Entity;

use crate::state::{EntitiesState, StoreAction};

/// Tracks whether the collection was replaced or edited since the last reset.
///
/// The baseline is the store's first snapshot and again every snapshot
/// produced by a reset. A published `set` marks the lineage dirty until the
/// next reset.
pub(crate) struct Lineage<E: Entity> {
    baseline: EntitiesState<E>,
    set_seen: bool,
}

impl<E: Entity> Lineage<E> {
    pub(crate) fn new(initial: &EntitiesState<E>) -> Self {
        Self {
            baseline: initial.clone(),
            set_seen: false,
        }
    }

    /// Folds a published snapshot into the lineage.
    pub(crate) fn record(&mut self, published: &EntitiesState<E>) {
        match published.action() {
            StoreAction::Reset => {
                self.baseline = published.clone();
                self.set_seen = false;
            }
            StoreAction::Set => self.set_seen = true,
            _ => {}
        }
    }

    pub(crate) fn is_dirty(&self, current: &EntitiesState<E>) -> bool {
        self.set_seen || !self.baseline.same_collection(current)
    }
}
