//! Task domain model shared by parser, store, reconciliation and export.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep status/category closed so every consumer matches exhaustively.
//!
//! # Invariants
//! - Every persisted task is identified by a stable `TaskId`.
//! - `checksum` is always derived from `title`, never set independently.

pub mod task;
