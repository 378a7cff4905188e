//! Text-to-candidate extraction.
//!
//! # Responsibility
//! - Normalize titles into duplicate-matching fingerprints.
//! - Infer categories from title and section text.
//! - Scan checklist-style documents into ordered task candidates.
//!
//! # Invariants
//! - Every function here is pure and never fails; unrecognized input is
//!   skipped, not reported.

pub mod category;
pub mod document;
pub mod fingerprint;
