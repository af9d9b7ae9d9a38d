//! Herd - Normalized entity collections with reactive queries
//!
//! This crate re-exports all layers of the Herd system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: herd_query       — Selectors, view options
//! Layer 1: herd_storage     — EntitiesState snapshots, EntityStore mutations, lineage, hooks
//! Layer 0: herd_foundation  — EntityId, Error, persistent collections, streams
//! ```

pub use herd_foundation as foundation;
pub use herd_query as query;
pub use herd_storage as storage;
