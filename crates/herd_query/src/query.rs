//! Derived, change-suppressed views over an entity store.

use std::fmt;
use std::rc::Rc;

use herd_foundation::{
    Entity, EntityId, Error, ErrorContext, Observable, OrderedMap, Result, TurnQueue,
};
use herd_storage::{Active, EntitiesState, EntityStore};
use tracing::{debug, trace};

use crate::options::SelectOptions;

/// Query engine over one [`EntityStore`].
///
/// `select*` methods return [`Observable`]s that replay the current derived
/// value on subscribe and then re-emit only when it changes. `get*` methods
/// read the latest snapshot synchronously. Each subscription keeps its own
/// "last emitted" marker, so views on the same store are independent.
pub struct QueryEntity<'s, E: Entity> {
    store: &'s EntityStore<E>,
    turns: TurnQueue,
}

impl<'s, E: Entity> QueryEntity<'s, E> {
    /// Creates a query engine with its own turn queue.
    #[must_use]
    pub fn new(store: &'s EntityStore<E>) -> Self {
        Self::with_turns(store, TurnQueue::new())
    }

    /// Creates a query engine that batches `select_many` on `turns`.
    #[must_use]
    pub fn with_turns(store: &'s EntityStore<E>, turns: TurnQueue) -> Self {
        Self { store, turns }
    }

    /// Returns the store this engine reads.
    #[must_use]
    pub fn store(&self) -> &'s EntityStore<E> {
        self.store
    }

    /// Returns the turn queue `select_many` flushes on.
    #[must_use]
    pub fn turns(&self) -> &TurnQueue {
        &self.turns
    }

    // =========================================================================
    // Generic selection
    // =========================================================================

    /// Projects each snapshot and emits when the projection changes.
    #[must_use]
    pub fn select<R>(&self, projector: impl Fn(&EntitiesState<E>) -> R + 'static) -> Observable<R>
    where
        R: Clone + PartialEq + 'static,
    {
        self.store.observe().map(projector).distinct_until_changed()
    }

    /// Like [`select`](Self::select), but skips snapshots whose collection is
    /// unchanged before projecting.
    fn select_collection<R>(
        &self,
        projector: impl Fn(&EntitiesState<E>) -> R + 'static,
    ) -> Observable<R>
    where
        R: Clone + PartialEq + 'static,
    {
        self.store
            .observe()
            .distinct_by(EntitiesState::same_collection)
            .map(projector)
            .distinct_until_changed()
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Emits the entities in collection order, shaped by `options`.
    #[must_use]
    pub fn select_all(&self, options: &SelectOptions<E>) -> Observable<Vec<E>> {
        let options = options.clone();
        self.select_collection(move |state| options.apply(state))
    }

    /// Emits the entities keyed by id, shaped by `options`.
    #[must_use]
    pub fn select_all_as_object(&self, options: &SelectOptions<E>) -> Observable<OrderedMap<E>> {
        let options = options.clone();
        self.select_collection(move |state| keyed(options.apply(state)))
    }

    /// Returns the entities in collection order, shaped by `options`.
    #[must_use]
    pub fn get_all(&self, options: &SelectOptions<E>) -> Vec<E> {
        self.store.with_value(|state| options.apply(state))
    }

    /// Returns the entities keyed by id, shaped by `options`.
    #[must_use]
    pub fn get_all_as_object(&self, options: &SelectOptions<E>) -> OrderedMap<E> {
        keyed(self.get_all(options))
    }

    /// Emits the requested entities in the requested order, once per turn.
    ///
    /// Delivery is deferred until [`turns`](Self::turns) is drained; all
    /// changes within one turn collapse into a single emission.
    #[must_use]
    pub fn select_many<T: Into<EntityId>>(
        &self,
        ids: impl IntoIterator<Item = T>,
        options: &SelectOptions<E>,
    ) -> Observable<Vec<Option<E>>> {
        self.select_many_as_object(ids, options)
            .map(|picked: &OrderedMap<Option<E>>| picked.to_vec())
            .distinct_until_changed()
    }

    /// Keyed form of [`select_many`](Self::select_many).
    #[must_use]
    pub fn select_many_as_object<T: Into<EntityId>>(
        &self,
        ids: impl IntoIterator<Item = T>,
        options: &SelectOptions<E>,
    ) -> Observable<OrderedMap<Option<E>>> {
        let ids: Vec<EntityId> = ids.into_iter().map(Into::into).collect();
        let options = options.clone();
        let store = self.store.name().to_string();
        self.store
            .observe()
            .distinct_by(EntitiesState::same_collection)
            .map(move |state| options.pick(state, &ids).into_iter().collect::<OrderedMap<_>>())
            .audit(Rc::new(self.turns.clone()))
            .inspect(move |picked: &OrderedMap<Option<E>>| {
                trace!(store = %store, count = picked.len(), "select_many flushed");
            })
            .distinct_until_changed()
    }

    // =========================================================================
    // Single entities
    // =========================================================================

    /// Emits the entity with `id`, or `None` while it is absent.
    #[must_use]
    pub fn select_entity(&self, id: impl Into<EntityId>) -> Observable<Option<E>> {
        let id = id.into();
        self.select(move |state| state.get(&id).cloned())
    }

    /// Emits a projection of the entity with `id`. Changes to fields outside
    /// the projection do not re-emit.
    #[must_use]
    pub fn select_entity_with<R>(
        &self,
        id: impl Into<EntityId>,
        projector: impl Fn(&E) -> R + 'static,
    ) -> Observable<Option<R>>
    where
        R: Clone + PartialEq + 'static,
    {
        let id = id.into();
        self.select(move |state| state.get(&id).map(&projector))
    }

    /// Returns the entity with `id`.
    #[must_use]
    pub fn get_entity(&self, id: impl Into<EntityId>) -> Option<E> {
        let id = id.into();
        self.store.with_value(|state| state.get(&id).cloned())
    }

    /// Emits the entity at the head of the collection.
    #[must_use]
    pub fn select_first(&self) -> Observable<Option<E>> {
        self.select(|state| state.iter().next().cloned())
    }

    /// Emits the entity at the tail of the collection.
    #[must_use]
    pub fn select_last(&self) -> Observable<Option<E>> {
        self.select(|state| state.iter().next_back().cloned())
    }

    /// Returns true if the collection contains `id`.
    #[must_use]
    pub fn has_entity(&self, id: impl Into<EntityId>) -> bool {
        let id = id.into();
        self.store.with_value(|state| state.contains(&id))
    }

    /// Returns true if any entity matches `predicate`.
    #[must_use]
    pub fn has_entity_where(&self, predicate: impl Fn(&E) -> bool) -> bool {
        self.store.with_value(|state| state.iter().any(|entity| predicate(entity)))
    }

    // =========================================================================
    // Active selection
    // =========================================================================

    /// Emits the active entity (the first one, if several are active).
    ///
    /// # Errors
    ///
    /// Returns `NoActiveEntity` if nothing is active when called.
    pub fn select_active(&self) -> Result<Observable<Option<E>>> {
        self.ensure_active("select_active")?;
        Ok(self.select(|state| active_entity(state).cloned()))
    }

    /// Emits a projection of the active entity.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveEntity` if nothing is active when called.
    pub fn select_active_with<R>(
        &self,
        projector: impl Fn(&E) -> R + 'static,
    ) -> Result<Observable<Option<R>>>
    where
        R: Clone + PartialEq + 'static,
    {
        self.ensure_active("select_active_with")?;
        Ok(self.select(move |state| active_entity(state).map(&projector)))
    }

    /// Returns the active entity.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveEntity` if nothing is active.
    pub fn get_active(&self) -> Result<E> {
        self.store
            .with_value(|state| active_entity(state).cloned())
            .ok_or_else(|| self.no_active("get_active"))
    }

    /// Emits every active entity in selection order.
    #[must_use]
    pub fn select_active_many(&self) -> Observable<Vec<E>> {
        self.select(active_entities)
    }

    /// Returns every active entity in selection order.
    #[must_use]
    pub fn get_active_many(&self) -> Vec<E> {
        self.store.with_value(active_entities)
    }

    /// Emits the raw active selection.
    #[must_use]
    pub fn select_active_id(&self) -> Observable<Active> {
        self.select(|state| state.active().clone())
    }

    /// Returns the raw active selection.
    #[must_use]
    pub fn get_active_id(&self) -> Active {
        self.store.with_value(|state| state.active().clone())
    }

    fn ensure_active(&self, operation: &str) -> Result<()> {
        if self.store.with_value(|state| state.active().is_none()) {
            return Err(self.no_active(operation));
        }
        Ok(())
    }

    fn no_active(&self, operation: &str) -> Error {
        debug!(store = self.store.name(), operation, "no active entity");
        Error::no_active_entity().with_context(
            ErrorContext::new()
                .with_store(self.store.name())
                .with_operation(operation),
        )
    }

    // =========================================================================
    // Counts and scalars
    // =========================================================================

    /// Emits the number of entities.
    #[must_use]
    pub fn select_count(&self) -> Observable<usize> {
        self.select(EntitiesState::len)
    }

    /// Emits the number of entities matching `predicate`.
    #[must_use]
    pub fn select_count_where(&self, predicate: impl Fn(&E) -> bool + 'static) -> Observable<usize> {
        self.select_collection(move |state| state.iter().filter(|entity| predicate(entity)).count())
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.store.with_value(EntitiesState::len)
    }

    /// Returns the number of entities matching `predicate`.
    #[must_use]
    pub fn get_count_where(&self, predicate: impl Fn(&E) -> bool) -> usize {
        self.store
            .with_value(|state| state.iter().filter(|entity| predicate(entity)).count())
    }

    /// Emits the loading flag.
    #[must_use]
    pub fn select_loading(&self) -> Observable<bool> {
        self.select(EntitiesState::loading)
    }

    /// Returns the loading flag.
    #[must_use]
    pub fn get_loading(&self) -> bool {
        self.store.with_value(EntitiesState::loading)
    }

    /// Emits the error payload.
    #[must_use]
    pub fn select_error(&self) -> Observable<Option<String>> {
        self.select(|state| state.error().map(str::to_string))
    }

    /// Returns the error payload.
    #[must_use]
    pub fn get_error(&self) -> Option<String> {
        self.store.with_value(|state| state.error().map(str::to_string))
    }

    // =========================================================================
    // Snapshot and lineage
    // =========================================================================

    /// Returns the latest snapshot.
    #[must_use]
    pub fn get_snapshot(&self) -> EntitiesState<E> {
        self.store.value()
    }

    /// Returns true if the collection was replaced by `set` since the last
    /// reset, or differs from the snapshot that reset produced.
    ///
    /// The lineage belongs to the store, so every engine on it agrees.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Negation of [`is_dirty`](Self::is_dirty).
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }
}

impl<E: Entity> fmt::Debug for QueryEntity<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEntity")
            .field("store", &self.store.name())
            .field("turns", &self.turns)
            .finish()
    }
}

fn active_entity<E: Entity>(state: &EntitiesState<E>) -> Option<&E> {
    state.active().primary().and_then(|id| state.get(id))
}

fn active_entities<E: Entity>(state: &EntitiesState<E>) -> Vec<E> {
    state
        .active()
        .ids()
        .iter()
        .filter_map(|id| state.get(id))
        .cloned()
        .collect()
}

fn keyed<E: Entity>(entities: Vec<E>) -> OrderedMap<E> {
    entities.into_iter().map(|entity| (entity.id(), entity)).collect()
}
