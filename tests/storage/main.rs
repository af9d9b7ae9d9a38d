//! Integration tests for Layer 1: Storage
//!
//! Tests the mutation API, snapshot invariants, and store hooks.

mod invariants;
