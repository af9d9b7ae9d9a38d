//! Entity store for Herd.
//!
//! This crate provides:
//! - [`EntitiesState`] - Immutable snapshot of a normalized collection
//! - [`EntityStore`] - The authoritative snapshot and its mutation API
//! - [`Target`] and [`IntoEntities`] - Mutation inputs
//! - [`StoreHook`] - Before/after observation of mutations
//! - [`StoreConfig`] - Name, initial loading flag, metadata

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
mod hook;
mod lineage;
pub mod state;
mod store;
mod target;

pub use config::StoreConfig;
pub use hook::StoreHook;
pub use state::{Active, EntitiesState, Metadata, StoreAction};
pub use store::{EntityStore, SetOptions};
pub use target::{IntoEntities, Target};
