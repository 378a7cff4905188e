//! Core use-case services.
//!
//! # Responsibility
//! - Compose parser, reconciliation, store and export into use-case APIs.
//! - Keep CLI/host layers decoupled from storage details.

pub mod task_service;
