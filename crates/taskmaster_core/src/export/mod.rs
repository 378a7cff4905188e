//! Store serialization.
//!
//! # Responsibility
//! - Lossless JSON snapshot export/import of the whole store.
//! - Lossy, human-oriented checklist rendering of a task subset.
//!
//! # Invariants
//! - A failed snapshot import never mutates the target store.
//! - Checklist output is deterministic for the same input and export date.

pub mod checklist;
pub mod snapshot;
