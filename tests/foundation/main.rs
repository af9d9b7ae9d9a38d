//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: EntityId, Error, persistent collections, streams
//! and the turn queue.

mod collections;
mod errors;
