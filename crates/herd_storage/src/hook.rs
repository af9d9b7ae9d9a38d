//! Observation points around store mutations.

use herd_foundation::Entity;

use crate::state::{EntitiesState, StoreAction};

/// Called around every mutating store operation.
///
/// `before` sees the snapshot the operation starts from. `after` sees the
/// snapshot it produced (or the unchanged one, with `published` false).
/// Both run exactly once per operation, including no-ops. Hooks observe;
/// they cannot veto or rewrite a mutation.
pub trait StoreHook<E: Entity> {
    /// Runs before the operation.
    fn before(&self, action: StoreAction, state: &EntitiesState<E>) {
        let _ = (action, state);
    }

    /// Runs after the operation.
    fn after(&self, action: StoreAction, state: &EntitiesState<E>, published: bool) {
        let _ = (action, state, published);
    }
}
