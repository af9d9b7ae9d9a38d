//! Deferred execution at the end of the current turn.
//!
//! A turn is the synchronous work a host performs before it yields. Tasks
//! scheduled during the turn run, in order, when the host drains the queue.
//! Tasks may schedule further tasks; those run in the same drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a task later.
pub trait Scheduler {
    /// Queues `task` to run at the end of the current turn.
    fn schedule(&self, task: Task);
}

/// FIFO end-of-turn task queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TurnQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TurnQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs queued tasks until the queue is empty, including tasks queued
    /// while draining. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs: tasks schedule more tasks.
            let task = self.tasks.borrow_mut().pop_front();
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }
}

impl Scheduler for TurnQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TurnQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
