//! Query engine for Herd.
//!
//! This crate provides:
//! - [`QueryEntity`] - Derived, change-suppressed views and synchronous getters
//! - [`SelectOptions`] - Filtering, ordering and limiting for collection views
//!
//! A `QueryEntity` borrows its store. Views are [`Observable`]s that replay
//! the current derived value and then re-emit only on change.
//!
//! [`Observable`]: herd_foundation::Observable

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod options;
mod query;

pub use options::SelectOptions;
pub use query::QueryEntity;
