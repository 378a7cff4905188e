//! In-memory task collection.
//!
//! # Responsibility
//! - Own task identity assignment, checksums and timestamps.
//! - Provide ordered CRUD and the fingerprint lookup used by reconciliation.
//! - Provide read-side filtering, sorting and statistics.
//!
//! # Invariants
//! - Default iteration order is insertion order.
//! - No storage I/O happens here; persistence is an explicit caller step.

pub mod query;
pub mod task_store;
