//! View options for collection selectors.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use herd_foundation::{Entity, EntityId};
use herd_storage::EntitiesState;

type Predicate<E> = Rc<dyn Fn(&E) -> bool>;
type Comparator<E> = Rc<dyn Fn(&E, &E) -> Ordering>;

/// Filtering, ordering and limiting for `select_all`, `get_all` and
/// `select_many`.
///
/// All fields default to "no effect" except `filter_undefined`, which
/// defaults to `true`. Options are cloned into a selector when it is built,
/// so later edits never affect an existing view.
pub struct SelectOptions<E> {
    filters: Vec<Predicate<E>>,
    sort: Option<Comparator<E>>,
    limit: Option<usize>,
    filter_undefined: bool,
}

impl<E> Clone for SelectOptions<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
            filter_undefined: self.filter_undefined,
        }
    }
}

impl<E> Default for SelectOptions<E> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: None,
            limit: None,
            filter_undefined: true,
        }
    }
}

impl<E> fmt::Debug for SelectOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectOptions")
            .field("filters", &self.filters.len())
            .field("sorted", &self.sort.is_some())
            .field("limit", &self.limit)
            .field("filter_undefined", &self.filter_undefined)
            .finish()
    }
}

impl<E: Entity> SelectOptions<E> {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only entities matching `predicate`. Repeated calls AND together.
    #[must_use]
    pub fn filter_by(mut self, predicate: impl Fn(&E) -> bool + 'static) -> Self {
        self.filters.push(Rc::new(predicate));
        self
    }

    /// Orders results with `compare` (stable).
    #[must_use]
    pub fn sort_by(mut self, compare: impl Fn(&E, &E) -> Ordering + 'static) -> Self {
        self.sort = Some(Rc::new(compare));
        self
    }

    /// Orders results by `key` (stable).
    #[must_use]
    pub fn sort_by_key<K: Ord + 'static>(self, key: impl Fn(&E) -> K + 'static) -> Self {
        self.sort_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Keeps at most `limit` results.
    #[must_use]
    pub fn limit_to(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `select_many` drops ids that are not in the collection.
    #[must_use]
    pub fn filter_undefined(mut self, filter: bool) -> Self {
        self.filter_undefined = filter;
        self
    }

    /// Returns the limit.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true if missing ids are dropped.
    #[must_use]
    pub fn filters_undefined(&self) -> bool {
        self.filter_undefined
    }

    /// Returns true if `entity` passes every filter.
    #[must_use]
    pub fn matches(&self, entity: &E) -> bool {
        self.filters.iter().all(|predicate| predicate(entity))
    }

    /// Filters, sorts, then limits `state`'s entities in collection order.
    #[must_use]
    pub fn apply(&self, state: &EntitiesState<E>) -> Vec<E> {
        let matching = state.iter().filter(|entity| self.matches(entity));
        let mut result: Vec<E> = match (&self.sort, self.limit) {
            (None, Some(limit)) => matching.take(limit).cloned().collect(),
            _ => matching.cloned().collect(),
        };
        if let Some(compare) = &self.sort {
            result.sort_by(|a, b| compare(a, b));
            if let Some(limit) = self.limit {
                result.truncate(limit);
            }
        }
        result
    }

    /// Resolves requested ids in the given order.
    ///
    /// Present entities must pass the filters and count toward the limit.
    /// Missing ids become `None` slots unless `filter_undefined` is set.
    #[must_use]
    pub fn pick(&self, state: &EntitiesState<E>, ids: &[EntityId]) -> Vec<(EntityId, Option<E>)> {
        let mut picked = Vec::with_capacity(ids.len());
        let mut present = 0_usize;
        for id in ids {
            match state.get(id) {
                Some(entity) if self.matches(entity) => {
                    if self.limit.is_some_and(|limit| present >= limit) {
                        continue;
                    }
                    present += 1;
                    picked.push((id.clone(), Some(entity.clone())));
                }
                Some(_) => {}
                None if !self.filter_undefined => picked.push((id.clone(), None)),
                None => {}
            }
        }
        picked
    }
}
