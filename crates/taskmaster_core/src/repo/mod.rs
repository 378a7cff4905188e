//! Snapshot persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the storage collaborator the service persists snapshots through.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Loaded payloads go through the same validation as snapshot import.
//! - Repositories never touch an in-memory `TaskStore` directly.

pub mod snapshot_repo;
