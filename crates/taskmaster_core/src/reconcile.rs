//! Reconciliation of freshly parsed candidates against a task store.
//!
//! # Responsibility
//! - Decide per candidate whether to insert, merge or count a duplicate.
//! - Apply the merge policy for conflicting fields.
//!
//! # Invariants
//! - Duplicates require equal fingerprint AND equal source.
//! - Candidates are applied in input order; each one is fully applied
//!   before the next lookup runs.
//! - Notes only ever grow; existing note text is never replaced.
//! - Every candidate is counted exactly once.

use crate::model::task::{Task, TaskCandidate, TaskPatch};
use crate::parser::fingerprint::fingerprint;
use crate::store::task_store::TaskStore;
use log::info;

/// Per-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    /// Human-readable one-line report for a processed document.
    pub fn describe(&self, source_name: &str) -> String {
        format!(
            "Processed {source_name}: {} added, {} updated, {} duplicates skipped",
            self.inserted, self.updated, self.unchanged
        )
    }
}

impl std::ops::AddAssign for ReconcileSummary {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
    }
}

/// Merges `candidates` into `store` and reports what happened.
pub fn reconcile(
    candidates: impl IntoIterator<Item = TaskCandidate>,
    store: &mut TaskStore,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    for candidate in candidates {
        let key = fingerprint(&candidate.title);
        match store.position_by_fingerprint_and_source(&key, &candidate.source) {
            None => {
                store.insert(candidate);
                summary.inserted += 1;
            }
            Some(index) => {
                let patch = merge_patch(&store.tasks()[index], &candidate);
                if patch.is_empty() {
                    summary.unchanged += 1;
                } else {
                    store.update_at(index, patch);
                    summary.updated += 1;
                }
            }
        }
    }

    info!(
        "event=reconcile module=reconcile status=ok inserted={} updated={} unchanged={}",
        summary.inserted, summary.updated, summary.unchanged
    );
    summary
}

/// Computes the fields a duplicate candidate changes on `existing`.
///
/// Returns an empty patch when the candidate carries nothing new.
pub fn merge_patch(existing: &Task, candidate: &TaskCandidate) -> TaskPatch {
    let mut patch = TaskPatch::default();
    if existing.status != candidate.status {
        patch.status = Some(candidate.status);
    }
    if !candidate.notes.is_empty() && candidate.notes != existing.notes {
        patch.notes = Some(append_notes(
            &existing.notes,
            &candidate.notes,
            &candidate.source,
        ));
    }
    patch
}

/// Appends `incoming` to `existing` behind a provenance marker line.
pub fn append_notes(existing: &str, incoming: &str, source: &str) -> String {
    if existing.is_empty() {
        return incoming.to_string();
    }
    format!("{existing}\n\n--- Updated from {source} ---\n{incoming}")
}
