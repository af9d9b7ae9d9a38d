//! Structural equality and change suppression for derived views.
//!
//! Snapshots are immutable, so two collections that share storage are equal
//! without looking inside. Everything else falls back to deep `PartialEq`.

use crate::collections::{EntityTable, IdList};

/// Returns true if two normalized collections hold the same ids in the same
/// order with equal values.
///
/// Shared storage short-circuits to `true` before any deep comparison.
#[must_use]
pub fn collections_equal<V: Clone + PartialEq>(
    (ids_a, table_a): (&IdList, &EntityTable<V>),
    (ids_b, table_b): (&IdList, &EntityTable<V>),
) -> bool {
    if ids_a.ptr_eq(ids_b) && table_a.ptr_eq(table_b) {
        return true;
    }
    ids_a == ids_b && table_a == table_b
}

/// Item-by-item equality for derived arrays.
#[must_use]
pub fn slices_equal<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// The "last emitted" marker of one derived view.
///
/// Each subscription owns its own `Distinct`, so two views over the same
/// store suppress independently.
#[derive(Debug)]
pub struct Distinct<T, F = fn(&T, &T) -> bool> {
    last: Option<T>,
    eq: F,
}

impl<T: PartialEq> Default for Distinct<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> Distinct<T> {
    /// Creates a marker that compares with `PartialEq`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: None,
            eq: |a, b| a == b,
        }
    }
}

impl<T, F: Fn(&T, &T) -> bool> Distinct<T, F> {
    /// Creates a marker with a custom equality.
    #[must_use]
    pub fn with_eq(eq: F) -> Self {
        Self { last: None, eq }
    }

    /// Returns true if `candidate` differs from the last emitted value, and
    /// records it as the new last value in that case.
    ///
    /// The first candidate always counts as a change.
    pub fn changed(&mut self, candidate: &T) -> bool
    where
        T: Clone,
    {
        if self.last.as_ref().is_some_and(|last| (self.eq)(last, candidate)) {
            return false;
        }
        self.last = Some(candidate.clone());
        true
    }

    /// Returns the last emitted value.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Forgets the last emitted value.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
