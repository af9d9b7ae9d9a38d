//! Core types, persistent collections, and reactive primitives for Herd.
//!
//! This crate provides:
//! - [`EntityId`] and the [`Entity`] trait
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`IdList`], [`EntityTable`], [`OrderedMap`])
//! - [`Distinct`] and structural equality helpers for change suppression
//! - [`StateSubject`], [`Observable`], [`Subscription`] - Synchronous streams
//! - [`TurnQueue`] - End-of-turn deferred execution

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
mod entity;
pub mod equality;
mod error;
pub mod schedule;
pub mod stream;

pub use collections::{EntityTable, IdList, OrderedMap};
pub use entity::{Entity, EntityId};
pub use equality::Distinct;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use schedule::{Scheduler, Task, TurnQueue};
pub use stream::{Observable, Observer, StateSubject, Subscription};
