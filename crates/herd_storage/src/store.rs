//! The entity store: one authoritative snapshot and its mutation API.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use herd_foundation::{Entity, EntityId, Observable, StateSubject};
use tracing::{debug, trace, warn};

use crate::config::StoreConfig;
use crate::hook::StoreHook;
use crate::lineage::Lineage;
use crate::state::{Active, EntitiesState, Metadata, StoreAction, normalize};
use crate::target::{IntoEntities, Target};

/// Options for [`EntityStore::set_with`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Replaces the active selection instead of preserving it.
    pub active: Option<Active>,
}

impl SetOptions {
    /// Sets the active selection to adopt.
    #[must_use]
    pub fn with_active(mut self, active: impl Into<Active>) -> Self {
        self.active = Some(active.into());
        self
    }
}

/// Owns a normalized entity collection and publishes every change.
///
/// Mutation methods take `&self`, so queries borrowing the store can live
/// alongside writers. Every method that changes the snapshot publishes it
/// synchronously before returning; methods return whether they published.
pub struct EntityStore<E: Entity> {
    config: StoreConfig,
    subject: StateSubject<EntitiesState<E>>,
    hooks: RefCell<Vec<Rc<dyn StoreHook<E>>>>,
    lineage: RefCell<Lineage<E>>,
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl<E: Entity> EntityStore<E> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let initial = EntitiesState::new()
            .with_loading(config.loading_on_init)
            .with_metadata(config.initial_metadata());
        Self::with_state(config, initial)
    }

    /// Creates a store seeded with `state`.
    #[must_use]
    pub fn with_state(config: StoreConfig, state: EntitiesState<E>) -> Self {
        let state = EntitiesState {
            action: StoreAction::Init,
            ..state
        };
        Self {
            config,
            lineage: RefCell::new(Lineage::new(&state)),
            subject: StateSubject::new(state),
            hooks: RefCell::new(Vec::new()),
        }
    }

    /// Returns the store name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the latest snapshot.
    #[must_use]
    pub fn value(&self) -> EntitiesState<E> {
        self.subject.value()
    }

    /// Reads the latest snapshot without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&EntitiesState<E>) -> R) -> R {
        self.subject.with_value(f)
    }

    /// Returns the raw state stream. Subscribers receive the current snapshot
    /// immediately.
    #[must_use]
    pub fn observe(&self) -> Observable<EntitiesState<E>> {
        self.subject.observable()
    }

    /// Returns true if the collection was replaced by `set` since the last
    /// reset, or differs from the snapshot that reset produced.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let lineage = self.lineage.borrow();
        self.subject.with_value(|state| lineage.is_dirty(state))
    }

    /// Negation of [`is_dirty`](Self::is_dirty).
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    /// Registers a hook.
    pub fn add_hook(&self, hook: Rc<dyn StoreHook<E>>) {
        self.hooks.borrow_mut().push(hook);
    }

    // =========================================================================
    // Collection mutations
    // =========================================================================

    /// Replaces the collection, preserving `active` (pruned) and `error`.
    pub fn set(&self, entities: impl IntoIterator<Item = E>) -> bool {
        self.set_with(entities, SetOptions::default())
    }

    /// Replaces the collection. Always publishes.
    pub fn set_with(&self, entities: impl IntoIterator<Item = E>, options: SetOptions) -> bool {
        self.commit(StoreAction::Set, |state| {
            let (ids, entities) = normalize(entities);
            let active = options
                .active
                .unwrap_or_else(|| state.active.clone())
                .retain(|id| entities.contains_key(id));
            Some(EntitiesState {
                ids,
                entities,
                active,
                loading: false,
                ..state.clone()
            })
        })
    }

    /// Replaces the collection with the values of an id-keyed map.
    ///
    /// Keys are ignored; each entity's own id is used. Ordered maps keep
    /// their iteration order.
    pub fn set_map<K>(&self, entities: impl IntoIterator<Item = (K, E)>) -> bool {
        self.set(entities.into_iter().map(|(_, entity)| entity))
    }

    /// Appends new entities and overwrites existing ones in place.
    pub fn add(&self, entities: impl IntoEntities<E>) -> bool {
        let batch = entities.into_entities();
        self.commit(StoreAction::Add, |state| {
            if batch.is_empty() {
                return None;
            }
            let mut ids = state.ids.clone();
            let mut table = state.entities.clone();
            for entity in batch {
                let id = entity.id();
                if !table.contains_key(&id) {
                    ids = ids.push_back(id.clone());
                }
                table = table.insert(id, entity);
            }
            Some(EntitiesState {
                ids,
                entities: table,
                ..state.clone()
            })
        })
    }

    /// Applies `patch` to a copy of each targeted entity.
    ///
    /// Unknown ids are skipped. A patch that changes an entity's id is
    /// rejected for that entity.
    pub fn update(&self, target: impl Into<Target<E>>, mut patch: impl FnMut(&mut E)) -> bool {
        let target = target.into();
        let store = self.name();
        self.commit(StoreAction::Update, |state| {
            let mut table = state.entities.clone();
            let mut touched = 0_usize;
            for id in target.resolve(state) {
                let Some(current) = state.get(&id) else {
                    continue;
                };
                let mut next = current.clone();
                patch(&mut next);
                let patched_id = next.id();
                if patched_id != id {
                    warn!(store, %id, %patched_id, "rejected patch that changes the entity id");
                    continue;
                }
                table = table.insert(id, next);
                touched += 1;
            }
            (touched > 0).then(|| EntitiesState {
                entities: table,
                ..state.clone()
            })
        })
    }

    /// Removes targeted entities. `Target::All` resets the collection.
    pub fn remove(&self, target: impl Into<Target<E>>) -> bool {
        let target = target.into();
        if matches!(target, Target::All) {
            return self.remove_all();
        }
        self.commit(StoreAction::Remove, |state| {
            let doomed: HashSet<EntityId> = target.resolve(state).into_iter().collect();
            if doomed.is_empty() {
                return None;
            }
            let ids = state.ids.retain(|id| !doomed.contains(id));
            let entities = doomed
                .iter()
                .fold(state.entities.clone(), |table, id| table.remove(id));
            let active = state.active.retain(|id| !doomed.contains(id));
            Some(EntitiesState {
                ids,
                entities,
                active,
                ..state.clone()
            })
        })
    }

    /// Clears the collection back to its initial state. Always publishes.
    pub fn remove_all(&self) -> bool {
        let loading = self.config.loading_on_init;
        self.commit(StoreAction::Reset, |state| {
            Some(EntitiesState {
                active: Active::None,
                error: None,
                loading,
                ..EntitiesState::new().with_metadata(state.metadata.clone())
            })
        })
    }

    // =========================================================================
    // Active selection
    // =========================================================================

    /// Replaces the active selection. Ids not in the collection are not
    /// adopted; a single unknown id leaves the selection unchanged.
    pub fn set_active(&self, active: impl Into<Active>) -> bool {
        let requested = active.into();
        let store = self.name();
        self.commit(StoreAction::SetActive, |state| {
            let next = match &requested {
                Active::None => Active::None,
                Active::One(id) if state.contains(id) => Active::One(id.clone()),
                Active::One(id) => {
                    debug!(store, %id, "ignored unknown active id");
                    return None;
                }
                Active::Many(ids) => {
                    let known = present_unique(state, ids);
                    if known.is_empty() && !ids.is_empty() {
                        debug!(store, requested = ids.len(), "ignored unknown active ids");
                        return None;
                    }
                    if known.is_empty() {
                        Active::None
                    } else {
                        Active::Many(known)
                    }
                }
            };
            (next != state.active).then(|| EntitiesState {
                active: next,
                ..state.clone()
            })
        })
    }

    /// Adds present ids to the active selection.
    pub fn add_active<T: Into<EntityId>>(&self, ids: impl IntoIterator<Item = T>) -> bool {
        let ids: Vec<EntityId> = ids.into_iter().map(Into::into).collect();
        self.commit(StoreAction::SetActive, |state| {
            let mut merged = state.active.ids().to_vec();
            for id in present_unique(state, &ids) {
                if !merged.contains(&id) {
                    merged.push(id);
                }
            }
            if merged.len() == state.active.ids().len() {
                return None;
            }
            Some(EntitiesState {
                active: Active::Many(merged),
                ..state.clone()
            })
        })
    }

    /// Removes ids from the active selection.
    pub fn remove_active<T: Into<EntityId>>(&self, ids: impl IntoIterator<Item = T>) -> bool {
        let ids: Vec<EntityId> = ids.into_iter().map(Into::into).collect();
        self.commit(StoreAction::SetActive, |state| {
            let active = state.active.retain(|id| !ids.contains(id));
            (active != state.active).then(|| EntitiesState {
                active,
                ..state.clone()
            })
        })
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// Sets the loading flag.
    pub fn set_loading(&self, loading: bool) -> bool {
        self.commit(StoreAction::SetLoading, |state| {
            (state.loading != loading).then(|| EntitiesState {
                loading,
                ..state.clone()
            })
        })
    }

    /// Sets the error payload to the rendered message of `error`.
    pub fn set_error(&self, error: impl fmt::Display) -> bool {
        let error = Some(error.to_string());
        self.commit(StoreAction::SetError, |state| {
            (state.error != error).then(|| EntitiesState {
                error,
                ..state.clone()
            })
        })
    }

    /// Clears the error payload.
    pub fn clear_error(&self) -> bool {
        self.commit(StoreAction::SetError, |state| {
            state.error.is_some().then(|| EntitiesState {
                error: None,
                ..state.clone()
            })
        })
    }

    /// Edits the metadata.
    pub fn update_metadata(&self, edit: impl FnOnce(&mut Metadata)) -> bool {
        self.commit(StoreAction::UpdateMetadata, |state| {
            let mut metadata = state.metadata.clone();
            edit(&mut metadata);
            (metadata != state.metadata).then(|| EntitiesState {
                metadata,
                ..state.clone()
            })
        })
    }

    // =========================================================================
    // Publication
    // =========================================================================

    /// Runs one mutation: hooks before, compute, publish if changed, hooks
    /// after. `compute` returns `None` for a no-op.
    fn commit(
        &self,
        action: StoreAction,
        compute: impl FnOnce(&EntitiesState<E>) -> Option<EntitiesState<E>>,
    ) -> bool {
        let hooks: Vec<Rc<dyn StoreHook<E>>> = self.hooks.borrow().clone();
        let current = self.subject.value();
        for hook in &hooks {
            hook.before(action, &current);
        }

        let (result, published) = match compute(&current) {
            Some(next) => {
                let next = EntitiesState { action, ..next };
                debug!(store = self.name(), %action, count = next.len(), "published snapshot");
                self.lineage.borrow_mut().record(&next);
                self.subject.next(next.clone());
                (next, true)
            }
            None => {
                trace!(store = self.name(), %action, "no-op mutation");
                (current, false)
            }
        };

        for hook in &hooks {
            hook.after(action, &result, published);
        }
        published
    }
}

/// Present ids from `ids`, first occurrence only, in the given order.
fn present_unique<E: Entity>(state: &EntitiesState<E>, ids: &[EntityId]) -> Vec<EntityId> {
    let mut known: Vec<EntityId> = Vec::with_capacity(ids.len());
    for id in ids {
        if state.contains(id) && !known.contains(id) {
            known.push(id.clone());
        }
    }
    known
}

impl<E: Entity + fmt::Debug> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("name", &self.config.name)
            .field("state", &self.value())
            .field("hooks", &self.hooks.borrow().len())
            .finish()
    }
}
