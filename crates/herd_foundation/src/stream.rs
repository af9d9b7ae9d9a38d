//! Push-based streams with replay-to-new-subscriber semantics.
//!
//! - [`StateSubject`] holds the current value and broadcasts every new one.
//! - [`Observable`] is a cold, composable view over a subject (or any other
//!   source) with the operators the query layer needs.
//! - [`Subscription`] is the cancellation handle.
//!
//! Everything is single-threaded and synchronous. No `RefCell` borrow is
//! held while an observer runs, so observers may subscribe, unsubscribe or
//! publish re-entrantly.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::equality::Distinct;
use crate::schedule::Scheduler;

/// Callback receiving stream values.
pub type Observer<T> = Rc<dyn Fn(&T)>;

// =============================================================================
// Subscription
// =============================================================================

struct SubscriptionInner {
    closed: Cell<bool>,
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Handle to an active subscription.
///
/// Clones refer to the same subscription. Dropping a handle does **not**
/// unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Clone)]
pub struct Subscription {
    inner: Rc<SubscriptionInner>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` once when unsubscribed.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(SubscriptionInner {
                closed: Cell::new(false),
                teardown: RefCell::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// Stops delivery. Idempotent.
    pub fn unsubscribe(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        let teardown = self.inner.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Returns true once unsubscribed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// =============================================================================
// Observable
// =============================================================================

/// A cold stream: each subscription runs the source anew.
pub struct Observable<T> {
    source: Rc<dyn Fn(Observer<T>) -> Subscription>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Observable")
    }
}

impl<T: 'static> Observable<T> {
    /// Creates an observable from a subscribe function.
    pub fn new(source: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    /// Subscribes `observer`. Values emitted after `unsubscribe` are dropped.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let closed = Rc::new(Cell::new(false));
        let gate = closed.clone();
        let gated: Observer<T> = Rc::new(move |value: &T| {
            if !gate.get() {
                observer(value);
            }
        });
        let upstream = self.attach(gated);
        Subscription::new(move || {
            closed.set(true);
            upstream.unsubscribe();
        })
    }

    fn attach(&self, observer: Observer<T>) -> Subscription {
        (self.source)(observer)
    }

    /// Maps each value through `f`.
    #[must_use]
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Observable<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::new(move |observer: Observer<U>| {
            let f = f.clone();
            source.attach(Rc::new(move |value: &T| observer(&f(value))))
        })
    }

    /// Forwards only values matching `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Observable::new(move |observer: Observer<T>| {
            let predicate = predicate.clone();
            source.attach(Rc::new(move |value: &T| {
                if predicate(value) {
                    observer(value);
                }
            }))
        })
    }

    /// Runs `f` on each value before forwarding it unchanged.
    #[must_use]
    pub fn inspect(&self, f: impl Fn(&T) + 'static) -> Observable<T> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::new(move |observer: Observer<T>| {
            let f = f.clone();
            source.attach(Rc::new(move |value: &T| {
                f(value);
                observer(value);
            }))
        })
    }

    /// Suppresses values equal (per `eq`) to the previous emission of the
    /// same subscription.
    #[must_use]
    pub fn distinct_by(&self, eq: impl Fn(&T, &T) -> bool + 'static) -> Observable<T>
    where
        T: Clone,
    {
        let source = self.clone();
        let eq = Rc::new(eq);
        Observable::new(move |observer: Observer<T>| {
            let eq = eq.clone();
            let marker = RefCell::new(Distinct::with_eq(move |a: &T, b: &T| eq(a, b)));
            source.attach(Rc::new(move |value: &T| {
                let changed = marker.borrow_mut().changed(value);
                if changed {
                    observer(value);
                }
            }))
        })
    }

    /// Suppresses values structurally equal to the previous emission.
    #[must_use]
    pub fn distinct_until_changed(&self) -> Observable<T>
    where
        T: Clone + PartialEq,
    {
        self.distinct_by(|a, b| a == b)
    }

    /// Holds the latest value and emits it once when `scheduler` next runs.
    ///
    /// All values arriving within one turn collapse into a single emission of
    /// the last of them. Unsubscribing discards a pending emission.
    #[must_use]
    pub fn audit(&self, scheduler: Rc<dyn Scheduler>) -> Observable<T>
    where
        T: Clone,
    {
        let source = self.clone();
        Observable::new(move |observer: Observer<T>| {
            let state = Rc::new(AuditState {
                latest: RefCell::new(None),
                scheduled: Cell::new(false),
                closed: Cell::new(false),
            });

            let pending = state.clone();
            let scheduler = scheduler.clone();
            let upstream = source.attach(Rc::new(move |value: &T| {
                *pending.latest.borrow_mut() = Some(value.clone());
                if pending.scheduled.replace(true) {
                    return;
                }
                let flush = pending.clone();
                let observer = observer.clone();
                scheduler.schedule(Box::new(move || {
                    flush.scheduled.set(false);
                    if flush.closed.get() {
                        return;
                    }
                    let latest = flush.latest.borrow_mut().take();
                    if let Some(value) = latest {
                        observer(&value);
                    }
                }));
            }));

            Subscription::new(move || {
                state.closed.set(true);
                state.latest.borrow_mut().take();
                upstream.unsubscribe();
            })
        })
    }
}

struct AuditState<T> {
    latest: RefCell<Option<T>>,
    scheduled: Cell<bool>,
    closed: Cell<bool>,
}

// =============================================================================
// StateSubject
// =============================================================================

struct Slot<T> {
    id: u64,
    live: Rc<Cell<bool>>,
    observer: Observer<T>,
}

struct SubjectInner<T> {
    value: T,
    observers: Vec<Slot<T>>,
    next_id: u64,
}

/// Current-value broadcaster.
///
/// New subscribers receive the current value immediately, then every value
/// passed to [`StateSubject::next`], synchronously and in subscription order.
pub struct StateSubject<T> {
    inner: Rc<RefCell<SubjectInner<T>>>,
}

impl<T: Clone + 'static> StateSubject<T> {
    /// Creates a subject holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubjectInner {
                value: initial,
                observers: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Returns a clone of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Reads the current value without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Stores `value` and delivers it to every live observer.
    ///
    /// Observers unsubscribed by an earlier observer during this delivery
    /// are skipped.
    pub fn next(&self, value: T) {
        let targets: Vec<(Rc<Cell<bool>>, Observer<T>)> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner
                .observers
                .iter()
                .map(|slot| (slot.live.clone(), slot.observer.clone()))
                .collect()
        };
        for (live, observer) in targets {
            if live.get() {
                observer(&value);
            }
        }
    }

    /// Returns the number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Returns an observable over this subject.
    #[must_use]
    pub fn observable(&self) -> Observable<T> {
        let inner = self.inner.clone();
        Observable::new(move |observer: Observer<T>| {
            let live = Rc::new(Cell::new(true));
            let (id, current) = {
                let mut state = inner.borrow_mut();
                let id = state.next_id;
                state.next_id += 1;
                state.observers.push(Slot {
                    id,
                    live: live.clone(),
                    observer: observer.clone(),
                });
                (id, state.value.clone())
            };

            let weak = Rc::downgrade(&inner);
            let subscription = Subscription::new(move || {
                live.set(false);
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().observers.retain(|slot| slot.id != id);
                }
            });

            observer(&current);
            subscription
        })
    }

    /// Subscribes directly to the subject.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        self.observable().subscribe(observer)
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for StateSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateSubject")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
